//! Linear peridynamic solid.
//!
//! Ordinary state-based elasticity: the scalar force state of bond `ξ` at
//! node `i` is
//!
//! ```text
//! t = (3 K θ / m) |ξ| + (15 μ / m) (e - θ |ξ| / 3)
//! ```
//!
//! with `e = |Y| - |ξ|` the bond extension, `m` the weighted volume and `θ`
//! the dilatation. The weighted volume is a reference-configuration
//! quantity and stateless; dilatation and nodal damage are written at
//! `N+1` each step.

use std::sync::Arc;

use peri_core::FieldTemporal::{Stateful, Stateless};
use peri_material::{
    ConstitutiveVariables, DamageModel, MaterialContext, MaterialError, MaterialModel,
};
use tracing::{info, warn};

use crate::config::{ConfigError, MaterialKind, MaterialParams};
use crate::kernels::{self, apply_pair_force, survival};
use crate::variables::{DAMAGE, DILATATION, WEIGHTED_VOLUME};

/// Linear peridynamic solid with an optional damage model.
///
/// Scalar variables, in order: weighted volume (stateless), dilatation
/// and damage (both stateful).
///
/// # Examples
///
/// ```
/// use peri_materials::{ElasticMaterial, MaterialKind, MaterialParams};
/// use peri_material::MaterialModel;
///
/// let params = MaterialParams::new(130.0e9, 78.0e9, 0.003, 7800.0);
/// let steel = ElasticMaterial::new(&params).unwrap();
/// assert_eq!(steel.name(), "Elastic");
/// assert_eq!(steel.scalar_variable_name(1), Ok("dilatation"));
/// ```
pub struct ElasticMaterial {
    bulk_modulus: f64,
    shear_modulus: f64,
    horizon: f64,
    density: f64,
    vars: ConstitutiveVariables,
    damage: Option<Arc<dyn DamageModel>>,
}

impl ElasticMaterial {
    /// Construct from validated parameters.
    pub fn new(params: &MaterialParams) -> Result<Self, ConfigError> {
        params.validate(MaterialKind::Elastic)?;
        let mut vars = ConstitutiveVariables::new();
        vars.add_scalar(Stateless, WEIGHTED_VOLUME);
        vars.add_scalar(Stateful, DILATATION);
        vars.add_scalar(Stateful, DAMAGE);
        info!(
            material = "Elastic",
            bulk_modulus = params.bulk_modulus,
            shear_modulus = params.shear_modulus,
            horizon = params.horizon,
            density = params.density,
            "constructed material"
        );
        Ok(Self {
            bulk_modulus: params.bulk_modulus,
            shear_modulus: params.shear_modulus,
            horizon: params.horizon,
            density: params.density,
            vars,
            damage: None,
        })
    }

    /// Attach a damage model attenuating bond forces.
    pub fn with_damage_model(mut self, damage: Arc<dyn DamageModel>) -> Self {
        self.damage = Some(damage);
        self
    }

    /// Bulk modulus `K`.
    pub fn bulk_modulus(&self) -> f64 {
        self.bulk_modulus
    }

    /// Shear modulus `μ`.
    pub fn shear_modulus(&self) -> f64 {
        self.shear_modulus
    }
}

impl MaterialModel for ElasticMaterial {
    fn name(&self) -> &str {
        "Elastic"
    }

    fn density(&self) -> f64 {
        self.density
    }

    fn horizon(&self) -> f64 {
        self.horizon
    }

    fn variables(&self) -> &ConstitutiveVariables {
        &self.vars
    }

    fn damage_model(&self) -> Option<&dyn DamageModel> {
        self.damage.as_deref()
    }

    fn initialize(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)?;
        let [m, theta, damage] = kernels::views::<3>(&mut ctx.buffers.scalar, "scalar")?;
        let isolated = kernels::weighted_volume(&ctx.kinematics, &ctx.topology, m.current_mut())?;
        if isolated > 0 {
            warn!(
                material = self.name(),
                nodes = isolated,
                "owned nodes with zero weighted volume"
            );
        }
        theta.current_mut().fill(0.0);
        damage.current_mut().fill(0.0);
        Ok(())
    }

    fn update_constitutive_data(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)?;
        update_dilatation_and_damage(self.damage.as_deref(), ctx)
    }

    fn compute_force(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)?;
        let kin = ctx.kinematics;
        let [m, theta, _] = kernels::views::<3>(&mut ctx.buffers.scalar, "scalar")?;
        let (m, theta) = (m.current(), theta.current());
        let bond_damage: &[f64] = ctx.buffers.bond_damage;
        let force = &mut *ctx.buffers.force;
        let damage = self.damage.as_deref();
        let (k, mu) = (self.bulk_modulus, self.shear_modulus);

        kernels::for_each_node(&kin, &ctx.topology, |i, bonds| {
            let mi = m[i];
            if mi <= 0.0 {
                return Ok(());
            }
            let th = theta[i];
            let alpha = 15.0 * mu / mi;
            for b in bonds {
                if b.deformed_length == 0.0 {
                    continue;
                }
                let ed = b.extension() - th * b.reference_length / 3.0;
                let t = 3.0 * k * th / mi * b.reference_length + alpha * ed;
                apply_pair_force(force, kin.cell_volume, b, survival(damage, bond_damage, b) * t);
            }
            Ok(())
        })
    }
}

/// Advance bond damage, then recompute dilatation and nodal damage at
/// `N+1`.
///
/// Shared by every law that keeps weighted volume, dilatation and damage
/// as its first three scalar variables.
pub(crate) fn update_dilatation_and_damage(
    damage: Option<&dyn DamageModel>,
    ctx: &mut MaterialContext<'_>,
) -> Result<(), MaterialError> {
    if let Some(model) = damage {
        model.update_bond_damage(&ctx.kinematics, &ctx.topology, ctx.buffers.bond_damage)?;
    }
    let [m, theta, nodal] = kernels::views::<3>(&mut ctx.buffers.scalar, "scalar")?;
    let (kin, topo) = (&ctx.kinematics, &ctx.topology);
    let bond_damage: &[f64] = ctx.buffers.bond_damage;
    kernels::dilatation(kin, topo, damage, bond_damage, m.current(), theta.current_mut())?;
    kernels::nodal_damage(kin, topo, bond_damage, nodal.current_mut())
}
