//! Material contract exercised against test-utils bodies and mock damage.

use peri_core::FieldTemporal;
use peri_material::{
    BondGeometry, ConstitutiveVariables, DamageModel, MaterialContext, MaterialError,
    MaterialModel,
};
use peri_test_utils::fixtures::{BreakAll, ConstantSurvival, CountingDamage};
use peri_test_utils::Body;

/// Linear pair spring `f = k (|Y| - |ξ|)` scaled by the damage model.
struct PairSpring<D> {
    vars: ConstitutiveVariables,
    stiffness: f64,
    damage: D,
}

impl<D: DamageModel> PairSpring<D> {
    fn new(stiffness: f64, damage: D) -> Self {
        Self {
            vars: ConstitutiveVariables::new(),
            stiffness,
            damage,
        }
    }
}

impl<D: DamageModel> MaterialModel for PairSpring<D> {
    fn name(&self) -> &str {
        "pair_spring"
    }

    fn density(&self) -> f64 {
        1.0
    }

    fn horizon(&self) -> f64 {
        1.0
    }

    fn variables(&self) -> &ConstitutiveVariables {
        &self.vars
    }

    fn damage_model(&self) -> Option<&dyn DamageModel> {
        Some(&self.damage)
    }

    fn initialize(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)
    }

    fn update_constitutive_data(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)?;
        self.damage
            .update_bond_damage(&ctx.kinematics, &ctx.topology, ctx.buffers.bond_damage)
    }

    fn compute_force(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)?;
        let kin = ctx.kinematics;
        for (_, i, nbs, first) in ctx.topology.iter() {
            for (b, &j) in nbs.iter().enumerate() {
                let (xi, yi) = (kin.reference_position(i), kin.current_position(i));
                let (xj, yj) = (kin.reference_position(j), kin.current_position(j));
                let len = |a: [f64; 3], b: [f64; 3]| {
                    ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2)).sqrt()
                };
                let geometry = BondGeometry {
                    reference_length: len(xi, xj),
                    deformed_length: len(yi, yj),
                };
                let s = self
                    .damage
                    .survival_factor(ctx.buffers.bond_damage[first + b], &geometry);
                let t = s * self.stiffness * (geometry.deformed_length - geometry.reference_length);
                for c in 0..3 {
                    ctx.buffers.force[3 * i + c] += t * (yj[c] - yi[c]) / geometry.deformed_length;
                }
            }
        }
        Ok(())
    }
}

fn stretched_pair() -> Body {
    let mut body = Body::two_node(1.0, 1.0);
    body.displacement[3] = 0.1;
    body
}

#[test]
fn intact_pair_pulls_together() {
    let material = PairSpring::new(10.0, ConstantSurvival::new(1.0));
    let mut body = stretched_pair();
    material.compute_force(&mut body.ctx()).unwrap();
    let f0 = body.force_on(0);
    let f1 = body.force_on(1);
    assert!((f0[0] - 1.0).abs() < 1e-12);
    assert!((f1[0] + 1.0).abs() < 1e-12);
}

#[test]
fn survival_factor_scales_force() {
    let material = PairSpring::new(10.0, ConstantSurvival::new(0.25));
    let mut body = stretched_pair();
    material.compute_force(&mut body.ctx()).unwrap();
    assert!((body.force_on(0)[0] - 0.25).abs() < 1e-12);
}

#[test]
fn broken_bonds_carry_no_force() {
    let material = PairSpring::new(10.0, BreakAll);
    let mut body = stretched_pair();
    material.update_constitutive_data(&mut body.ctx()).unwrap();
    assert_eq!(body.bond_damage, vec![1.0, 1.0]);
    material.compute_force(&mut body.ctx()).unwrap();
    assert_eq!(body.net_force(), [0.0; 3]);
    assert_eq!(body.force_on(0), [0.0; 3]);
}

#[test]
fn damage_model_updated_once_per_call() {
    let material = PairSpring::new(1.0, CountingDamage::new());
    let mut body = stretched_pair();
    for _ in 0..3 {
        material.update_constitutive_data(&mut body.ctx()).unwrap();
    }
    assert_eq!(material.damage.updates(), 3);
    assert_eq!(material.damage_model().map(|d| d.name()), Some("counting"));
}

#[test]
fn mis_sized_body_is_reported_not_panicked() {
    let material = PairSpring::new(1.0, ConstantSurvival::new(1.0));
    let mut body = stretched_pair();
    body.bond_damage.push(0.0);
    let err = material.compute_force(&mut body.ctx()).unwrap_err();
    assert_eq!(
        err,
        MaterialError::BufferSize {
            buffer: "bond_damage",
            expected: 2,
            actual: 3,
        }
    );
    assert_eq!(body.net_force(), [0.0; 3]);
}

/// Counts calls to `update_constitutive_data` in a stateful scalar.
struct StepCounter {
    vars: ConstitutiveVariables,
}

impl StepCounter {
    fn new() -> Self {
        let mut vars = ConstitutiveVariables::new();
        vars.add_scalar(FieldTemporal::Stateful, "calls");
        Self { vars }
    }
}

impl MaterialModel for StepCounter {
    fn name(&self) -> &str {
        "step_counter"
    }

    fn density(&self) -> f64 {
        1.0
    }

    fn horizon(&self) -> f64 {
        1.0
    }

    fn variables(&self) -> &ConstitutiveVariables {
        &self.vars
    }

    fn initialize(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)
    }

    fn update_constitutive_data(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)?;
        if let Some((n, np1)) = ctx.buffers.scalar[0].split_mut() {
            for (new, old) in np1.iter_mut().zip(n) {
                *new = old + 1.0;
            }
        }
        Ok(())
    }

    fn compute_force(&self, ctx: &mut MaterialContext<'_>) -> Result<(), MaterialError> {
        ctx.validate(&self.vars)
    }
}

#[test]
fn retried_step_starts_from_last_accepted_state() {
    let material = StepCounter::new();
    let mut body = Body::two_node(1.0, 1.0).with_variables(material.variables());

    material.update_constitutive_data(&mut body.ctx()).unwrap();
    material.update_constitutive_data(&mut body.ctx()).unwrap();
    assert_eq!(body.current("calls"), &[1.0, 1.0]);
    assert_eq!(body.previous("calls"), &[0.0, 0.0]);

    body.commit();
    material.update_constitutive_data(&mut body.ctx()).unwrap();
    assert_eq!(body.current("calls"), &[2.0, 2.0]);
}

#[test]
fn stateless_view_for_stateful_variable_is_rejected() {
    let material = StepCounter::new();
    let mut relabelled = ConstitutiveVariables::new();
    relabelled.add_scalar(FieldTemporal::Stateless, "calls");
    let mut body = Body::two_node(1.0, 1.0).with_variables(&relabelled);

    let err = material.update_constitutive_data(&mut body.ctx()).unwrap_err();
    assert_eq!(
        err,
        MaterialError::TemporalMismatch {
            name: "calls".into(),
            expected: FieldTemporal::Stateful,
        }
    );
}
