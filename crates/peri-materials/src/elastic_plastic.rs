//! Ordinary state-based elastic-perfectly-plastic solid.
//!
//! The isotropic part of the force state is elastic. The deviatoric part
//! is returned to the yield surface `‖t_d‖² / 2 = ψ0` with
//!
//! ```text
//! ψ0 = 25 σy² / (8 π δ⁵)
//! ```
//!
//! and the plastic flow is recorded as a per-bond deviatoric plastic
//! extension. The plastic multiplier `lambda` and the plastic extension are
//! stateful: `compute_force` reads them at `N` and writes them at `N+1`, so
//! it may be called any number of times per step. The driver promotes
//! `N+1` to `N` with `DataManager::update_state` once the step is accepted.

use std::f64::consts::PI;
use std::sync::Arc;

use peri_core::FieldTemporal::{Stateful, Stateless};
use peri_material::{
    ConstitutiveVariables, DamageModel, MaterialContext, MaterialError, MaterialModel,
};
use tracing::{info, warn};

use crate::config::{ConfigError, MaterialKind, MaterialParams};
use crate::elastic::update_dilatation_and_damage;
use crate::kernels::{self, apply_pair_force, survival, Bond};
use crate::variables::{DAMAGE, DEVIATORIC_PLASTIC_EXTENSION, DILATATION, LAMBDA, WEIGHTED_VOLUME};

/// Elastic-perfectly-plastic peridynamic solid.
///
/// Scalar variables, in order: weighted volume (stateless), then
/// dilatation, damage, and `lambda` (stateful). One stateful bond
/// variable: the deviatoric plastic extension.
pub struct ElasticPlasticMaterial {
    bulk_modulus: f64,
    shear_modulus: f64,
    horizon: f64,
    density: f64,
    yield_stress: f64,
    vars: ConstitutiveVariables,
    damage: Option<Arc<dyn DamageModel>>,
}

impl ElasticPlasticMaterial {
    /// Construct from validated parameters; `yield_stress` is required.
    pub fn new(params: &MaterialParams) -> Result<Self, ConfigError> {
        params.validate(MaterialKind::ElasticPlastic)?;
        let yield_stress = params.yield_stress.ok_or(ConfigError::MissingParameter {
            name: "yield_stress",
            material: MaterialKind::ElasticPlastic.name(),
        })?;
        let mut vars = ConstitutiveVariables::new();
        vars.add_scalar(Stateless, WEIGHTED_VOLUME);
        vars.add_scalar(Stateful, DILATATION);
        vars.add_scalar(Stateful, DAMAGE);
        vars.add_scalar(Stateful, LAMBDA);
        vars.add_bond(Stateful, DEVIATORIC_PLASTIC_EXTENSION);
        info!(
            material = "Elastic Plastic",
            bulk_modulus = params.bulk_modulus,
            shear_modulus = params.shear_modulus,
            horizon = params.horizon,
            density = params.density,
            yield_stress,
            "constructed material"
        );
        Ok(Self {
            bulk_modulus: params.bulk_modulus,
            shear_modulus: params.shear_modulus,
            horizon: params.horizon,
            density: params.density,
            yield_stress,
            vars,
            damage: None,
        })
    }

    /// Attach a damage model attenuating bond forces.
    pub fn with_damage_model(mut self, damage: Arc<dyn DamageModel>) -> Self {
        self.damage = Some(damage);
        self
    }

    /// Yield stress `σy`.
    pub fn yield_stress(&self) -> f64 {
        self.yield_stress
    }

    /// Yield value `ψ0 = 25 σy² / (8 π δ⁵)` of the deviatoric force norm.
    pub fn yield_value(&self) -> f64 {
        25.0 * self.yield_stress * self.yield_stress / (8.0 * PI * self.horizon.powi(5))
    }
}

impl MaterialModel for ElasticPlasticMaterial {
    fn name(&self) -> &str {
        "Elastic Plastic"
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
        let [m, theta, damage, lambda] = kernels::views::<4>(&mut ctx.buffers.scalar, "scalar")?;
        let isolated = kernels::weighted_volume(&ctx.kinematics, &ctx.topology, m.current_mut())?;
        if isolated > 0 {
            warn!(
                material = self.name(),
                nodes = isolated,
                "owned nodes with zero weighted volume"
            );
        }
        for view in [theta, damage, lambda] {
            view.current_mut().fill(0.0);
        }
        let [edp] = kernels::views::<1>(&mut ctx.buffers.bond, "bond")?;
        edp.current_mut().fill(0.0);
        Ok(())
    }

    fn update_constitutive_data(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)?;
        update_dilatation_and_damage(self.damage.as_deref(), ctx)
    }

    fn compute_force(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)?;
        let kin = ctx.kinematics;
        let [m, theta, _, lambda] = kernels::views::<4>(&mut ctx.buffers.scalar, "scalar")?;
        let (m, theta) = (m.current(), theta.current());
        let (lambda_n, lambda_np1) = kernels::stateful(lambda, LAMBDA)?;
        let [edp] = kernels::views::<1>(&mut ctx.buffers.bond, "bond")?;
        let (edp_n, edp_np1) = kernels::stateful(edp, DEVIATORIC_PLASTIC_EXTENSION)?;
        let bond_damage: &[f64] = ctx.buffers.bond_damage;
        let force = &mut *ctx.buffers.force;
        let damage = self.damage.as_deref();
        let (k, mu) = (self.bulk_modulus, self.shear_modulus);
        let psi0 = self.yield_value();
        let yield_norm = (2.0 * psi0).sqrt();

        kernels::for_each_node(&kin, &ctx.topology, |i, bonds| {
            let mi = m[i];
            if mi <= 0.0 {
                lambda_np1[i] = lambda_n[i];
                for b in bonds {
                    edp_np1[b.slot] = edp_n[b.slot];
                }
                return Ok(());
            }
            let th = theta[i];
            let alpha = 15.0 * mu / mi;
            let trial = |b: &Bond| {
                alpha * (b.extension() - th * b.reference_length / 3.0 - edp_n[b.slot])
            };

            let norm_sq: f64 = bonds
                .iter()
                .map(|b| {
                    let td = trial(b);
                    td * td * kin.cell_volume[b.neighbor]
                })
                .sum();
            let (scale, delta_lambda) = if norm_sq / 2.0 > psi0 {
                let norm = norm_sq.sqrt();
                (yield_norm / norm, (norm / yield_norm - 1.0) / alpha)
            } else {
                (1.0, 0.0)
            };
            lambda_np1[i] = lambda_n[i] + delta_lambda;

            for b in bonds {
                let td = scale * trial(b);
                edp_np1[b.slot] = edp_n[b.slot] + delta_lambda * td;
                if b.deformed_length == 0.0 {
                    continue;
                }
                let ti = 3.0 * k * th / mi * b.reference_length;
                let s = survival(damage, bond_damage, b);
                apply_pair_force(force, kin.cell_volume, b, s * (ti + td));
            }
            Ok(())
        })
    }
}
