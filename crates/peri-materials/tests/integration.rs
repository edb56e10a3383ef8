//! End-to-end material behaviour on test-utils bodies.

use std::sync::Arc;

use indexmap::IndexMap;
use peri_core::{Distribution, FieldLength, FieldSpec, FieldStep, FieldTemporal};
use peri_material::{
    Buffers, Kinematics, MaterialContext, MaterialError, MaterialModel, NeighborList, Topology,
};
use peri_materials::variables::{
    DAMAGE, DEVIATORIC_PLASTIC_EXTENSION, DILATATION, LAMBDA, WEIGHTED_VOLUME,
};
use peri_materials::{
    CriticalStretchDamage, ElasticMaterial, ElasticPlasticMaterial, MaterialConfig, MaterialParams,
};
use peri_state::DataManager;
use peri_test_utils::Body;
use proptest::prelude::*;

const SPACING: f64 = 0.001;
const VOLUME: f64 = 1.0e-9;

fn steel_map() -> IndexMap<String, f64> {
    [
        ("bulk_modulus", 100.0e9),
        ("shear_modulus", 60.0e9),
        ("horizon", 0.003),
        ("density", 7800.0),
        ("yield_stress", 3.0e8),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn steel() -> MaterialParams {
    MaterialParams::new(100.0e9, 60.0e9, 0.003, 7800.0).with_yield_stress(3.0e8)
}

/// Run one full step: initialize, update, force.
fn evaluate(material: &dyn MaterialModel, body: &mut Body) {
    material.initialize(&mut body.ctx()).unwrap();
    material.update_constitutive_data(&mut body.ctx()).unwrap();
    material.compute_force(&mut body.ctx()).unwrap();
}

/// Node 0 bonded to node 1 on x and node 2 on y; nodes 1 and 2 bonded back.
fn corner() -> Body {
    Body::new(
        vec![0.0, 0.0, 0.0, SPACING, 0.0, 0.0, 0.0, SPACING, 0.0],
        vec![VOLUME; 3],
        NeighborList::from_lists(vec![vec![1, 2], vec![0], vec![0]]),
    )
}

fn force_density() -> FieldSpec {
    FieldSpec::vector3d(FieldTemporal::Stateful, "force_density")
}

fn bond_damage() -> FieldSpec {
    FieldSpec::bond(FieldTemporal::Stateless, "bond_damage")
}

/// A manager holding `material`'s variables plus force and bond damage,
/// laid out over `body`'s nodes and bonds.
fn manager_for(material: &dyn MaterialModel, body: &Body) -> DataManager {
    let n = body.num_nodes();
    let mut dm = DataManager::new();
    dm.set_scalar_map(Arc::new(Distribution::serial(n, 1))).unwrap();
    dm.set_vector3d_map(Arc::new(Distribution::serial(n, 3))).unwrap();
    let ids = (0..n as u64).collect();
    dm.set_bond_map(Arc::new(body.neighbors.bond_distribution(ids).unwrap()));
    let mut specs = material.field_specs();
    specs.extend([force_density(), bond_damage()]);
    dm.allocate_data(specs).unwrap();
    dm
}

/// Run `op` with every buffer borrowed from `dm` and `body` supplying only
/// the geometry and kinematics.
fn run_on_manager(
    material: &dyn MaterialModel,
    dm: &mut DataManager,
    body: &Body,
    op: impl FnOnce(&mut MaterialContext<'_>) -> Result<(), MaterialError>,
) -> Result<(), MaterialError> {
    let mut specs = material.field_specs();
    specs.extend([force_density(), bond_damage()]);
    let mut views = dm.field_views(&specs).unwrap();
    let bond_damage = views.pop().unwrap().into_current();
    let force = views.pop().unwrap().into_current();
    let buffers = Buffers::from_views(views, material.variables(), bond_damage, force)?;
    let mut ctx = MaterialContext::new(
        Kinematics {
            reference: &body.reference,
            displacement: &body.displacement,
            velocity: &body.velocity,
            cell_volume: &body.cell_volume,
            dt: body.dt,
        },
        Topology {
            owned_ids: &body.owned_ids,
            neighbors: &body.neighbors,
        },
        buffers,
    );
    op(&mut ctx)
}

fn relative_net_force(body: &Body) -> f64 {
    let scale: f64 = body.force.iter().map(|f| f.abs()).sum();
    let net = body.net_force();
    if scale == 0.0 {
        0.0
    } else {
        net.iter().map(|f| f.abs()).sum::<f64>() / scale
    }
}

#[test]
fn two_node_pair_forces_are_equal_and_opposite() {
    let material = MaterialConfig::from_map("Elastic Plastic", &steel_map())
        .unwrap()
        .build()
        .unwrap();
    let mut body = Body::two_node(SPACING, VOLUME).with_variables(material.variables());
    body.displacement[3] = 1.0e-6;

    evaluate(material.as_ref(), &mut body);

    let f0 = body.force_on(0);
    let f1 = body.force_on(1);
    assert!(f0[0] > 0.0, "stretched bond pulls node 0 towards node 1");
    for c in 0..3 {
        assert_eq!(f0[c], -f1[c]);
    }
    assert_eq!(f0[1], 0.0);
    assert_eq!(f0[2], 0.0);
}

#[test]
fn two_node_force_matches_closed_form() {
    let material = ElasticMaterial::new(&steel()).unwrap();
    let mut body = Body::two_node(SPACING, VOLUME).with_variables(material.variables());
    let d = 1.0e-6;
    body.displacement[3] = d;

    evaluate(&material, &mut body);

    // m = ℓ²V, θ = 3 d / ℓ, purely isotropic: t = 3 K θ ℓ / m, applied from both ends.
    let m = SPACING * SPACING * VOLUME;
    let theta = 3.0 * d / SPACING;
    let t = 3.0 * 100.0e9 * theta * SPACING / m;
    let expected = 2.0 * t * VOLUME;
    assert!((body.force_on(0)[0] / expected - 1.0).abs() < 1e-9);
    assert!((body.current_at(DILATATION, 0) - theta).abs() < 1e-12);
}

#[test]
fn compute_force_accumulates_into_prefilled_buffer() {
    let material = ElasticMaterial::new(&steel()).unwrap();
    let mut reference =
        Body::cubic_lattice(3, SPACING, 1.5 * SPACING).with_variables(material.variables());
    reference.displace(|x| [1.0e-3 * x[0], -2.0e-4 * x[1], 5.0e-4 * x[0]]);
    evaluate(&material, &mut reference);
    let single = reference.force.clone();

    let mut body = reference.clone();
    body.force.fill(7.0);
    material.compute_force(&mut body.ctx()).unwrap();
    material.compute_force(&mut body.ctx()).unwrap();

    for (got, f) in body.force.iter().zip(&single) {
        let expected = 7.0 + 2.0 * f;
        assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }
}

#[test]
fn elastic_and_plastic_agree_below_yield() {
    let elastic = ElasticMaterial::new(&steel()).unwrap();
    let plastic = ElasticPlasticMaterial::new(&steel()).unwrap();

    let mut a = corner().with_variables(elastic.variables());
    let mut b = corner().with_variables(plastic.variables());
    a.displacement[3] = 1.0e-9;
    b.displacement[3] = 1.0e-9;
    evaluate(&elastic, &mut a);
    evaluate(&plastic, &mut b);

    for (fa, fb) in a.force.iter().zip(&b.force) {
        assert!((fa - fb).abs() <= 1e-9 * fa.abs().max(1e-30));
    }
    assert_eq!(b.current_at(LAMBDA, 0), 0.0);
}

#[test]
fn plastic_flow_caps_deviatoric_force() {
    let elastic = ElasticMaterial::new(&steel()).unwrap();
    let plastic = ElasticPlasticMaterial::new(&steel()).unwrap();

    let mut a = corner().with_variables(elastic.variables());
    let mut b = corner().with_variables(plastic.variables());
    a.displacement[3] = 1.0e-5;
    b.displacement[3] = 1.0e-5;
    evaluate(&elastic, &mut a);
    evaluate(&plastic, &mut b);

    let fa = a.force_on(0)[0];
    let fb = b.force_on(0)[0];
    assert!(fb > 0.0);
    assert!(fb < fa, "plastic {fb} should be below elastic {fa}");
    assert!(relative_net_force(&b) < 1e-12);

    assert!(b.current_at(LAMBDA, 0) > 0.0);
    assert_eq!(b.previous(LAMBDA)[0], 0.0);
    let edp = b.current(DEVIATORIC_PLASTIC_EXTENSION);
    assert!(edp[0] > 0.0, "stretched x bond flows in extension");
    assert!(edp[1] < 0.0, "unstretched y bond flows in compression");

    let (lambda, edp) = (b.current(LAMBDA).to_vec(), edp.to_vec());
    b.commit();
    assert_eq!(b.previous(LAMBDA), lambda.as_slice());
    assert_eq!(b.previous(DEVIATORIC_PLASTIC_EXTENSION), edp.as_slice());
}

#[test]
fn repeated_force_evaluation_reads_last_accepted_step() {
    let plastic = ElasticPlasticMaterial::new(&steel()).unwrap();
    let mut body = corner().with_variables(plastic.variables());
    body.displacement[3] = 1.0e-5;
    evaluate(&plastic, &mut body);
    let lambda = body.current_at(LAMBDA, 0);
    let force = body.force_on(0);

    body.force.fill(0.0);
    plastic.compute_force(&mut body.ctx()).unwrap();
    assert_eq!(body.current_at(LAMBDA, 0), lambda);
    assert_eq!(body.force_on(0), force);
}

#[test]
fn plastic_extension_persists_after_commit() {
    let plastic = ElasticPlasticMaterial::new(&steel()).unwrap();
    let mut body = corner().with_variables(plastic.variables());
    body.displacement[3] = 1.0e-5;
    evaluate(&plastic, &mut body);
    body.commit();

    // Unload: the permanent set leaves a residual force.
    body.displacement[3] = 0.0;
    body.force.fill(0.0);
    plastic.update_constitutive_data(&mut body.ctx()).unwrap();
    plastic.compute_force(&mut body.ctx()).unwrap();
    assert!(body.force_on(0)[0] != 0.0);
}

#[test]
fn driver_steps_material_through_data_manager_storage() {
    let plastic = ElasticPlasticMaterial::new(&steel()).unwrap();
    let mut body = corner();
    body.displacement[3] = 1.0e-5;
    let mut dm = manager_for(&plastic, &body);

    run_on_manager(&plastic, &mut dm, &body, |ctx| plastic.initialize(ctx)).unwrap();
    run_on_manager(&plastic, &mut dm, &body, |ctx| plastic.update_constitutive_data(ctx))
        .unwrap();
    run_on_manager(&plastic, &mut dm, &body, |ctx| plastic.compute_force(ctx)).unwrap();

    let specs = plastic.field_specs();
    let spec = |name: &str| specs.iter().find(|s| s.name() == name).unwrap();
    let lambda = spec(LAMBDA);
    let edp = spec(DEVIATORIC_PLASTIC_EXTENSION);
    let lambda_np1 = dm.get_data(lambda, FieldStep::Np1).unwrap().to_vec();
    assert!(lambda_np1[0] > 0.0);
    assert_eq!(dm.get_data(lambda, FieldStep::N).unwrap(), &[0.0; 3]);
    assert!(dm.get_data(edp, FieldStep::Np1).unwrap()[0] > 0.0);
    assert!(dm.get_data(spec(WEIGHTED_VOLUME), FieldStep::None).unwrap()[0] > 0.0);

    // Same forces as a body holding its own storage.
    let mut reference = corner().with_variables(plastic.variables());
    reference.displacement[3] = 1.0e-5;
    evaluate(&plastic, &mut reference);
    let force = dm.get_data(&force_density(), FieldStep::Np1).unwrap();
    assert_eq!(force, reference.force.as_slice());

    dm.update_state();
    assert_eq!(dm.get_data(lambda, FieldStep::N).unwrap(), lambda_np1.as_slice());

    // Unloaded step starting from the promoted plastic state.
    body.displacement[3] = 0.0;
    dm.get_data_mut(&force_density(), FieldStep::Np1).unwrap().fill(0.0);
    run_on_manager(&plastic, &mut dm, &body, |ctx| plastic.update_constitutive_data(ctx))
        .unwrap();
    run_on_manager(&plastic, &mut dm, &body, |ctx| plastic.compute_force(ctx)).unwrap();
    assert!(dm.get_data(&force_density(), FieldStep::Np1).unwrap()[0] != 0.0);
}

#[test]
fn critical_stretch_breaks_bonds_and_drops_force() {
    let mut map = steel_map();
    map.insert("critical_stretch".into(), 0.005);
    let material = MaterialConfig::from_map("Elastic", &map).unwrap().build().unwrap();

    let mut body = Body::two_node(SPACING, VOLUME).with_variables(material.variables());
    body.displacement[3] = 0.01 * SPACING;
    evaluate(material.as_ref(), &mut body);

    assert_eq!(body.bond_damage, vec![1.0, 1.0]);
    assert_eq!(body.current_at(DAMAGE, 0), 1.0);
    assert_eq!(body.force, vec![0.0; 6]);
}

#[test]
fn damage_model_can_be_shared_between_materials() {
    let damage = Arc::new(CriticalStretchDamage::new(0.5).unwrap());
    let a = ElasticMaterial::new(&steel()).unwrap().with_damage_model(damage.clone());
    let b = ElasticPlasticMaterial::new(&steel()).unwrap().with_damage_model(damage);
    assert_eq!(a.damage_model().map(|d| d.name()), b.damage_model().map(|d| d.name()));
}

#[test]
fn data_manager_storage_fits_material_variables() {
    let material = ElasticPlasticMaterial::new(&steel()).unwrap();
    let body = Body::cubic_lattice(2, SPACING, 2.0 * SPACING);
    let dm = manager_for(&material, &body);
    let (nodes, bonds) = (body.num_nodes(), body.neighbors.num_bonds());

    for spec in material.field_specs() {
        let expected = match spec.length() {
            FieldLength::Bond => bonds,
            _ => nodes,
        };
        if spec.is_stateful() {
            assert_eq!(dm.get_data(&spec, FieldStep::N).unwrap().len(), expected);
            assert_eq!(dm.get_data(&spec, FieldStep::Np1).unwrap().len(), expected);
        } else {
            assert_eq!(dm.get_data(&spec, FieldStep::None).unwrap().len(), expected);
        }
    }

    // One N/N+1 pair per stateful variable, plus the driver's force.
    let stateful = dm.state(FieldStep::N).unwrap().field_specs().count();
    assert_eq!(stateful, 5);
    let stateless: Vec<_> = dm
        .state(FieldStep::None)
        .unwrap()
        .field_specs()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(stateless, vec![WEIGHTED_VOLUME, "bond_damage"]);
}

proptest! {
    #[test]
    fn lattice_forces_balance(
        grad in prop::array::uniform9(-1.0e-3f64..1.0e-3),
    ) {
        let material = ElasticMaterial::new(&steel()).unwrap();
        let mut body =
            Body::cubic_lattice(3, SPACING, 1.8 * SPACING).with_variables(material.variables());
        body.displace(|x| {
            [
                grad[0] * x[0] + grad[1] * x[1] + grad[2] * x[2],
                grad[3] * x[0] + grad[4] * x[1] + grad[5] * x[2],
                grad[6] * x[0] + grad[7] * x[1] + grad[8] * x[2],
            ]
        });
        evaluate(&material, &mut body);
        prop_assert!(relative_net_force(&body) < 1e-9);
    }

    #[test]
    fn pair_forces_are_antisymmetric(dx in -1.0e-5f64..1.0e-5, dy in -1.0e-5f64..1.0e-5) {
        let material = ElasticPlasticMaterial::new(&steel()).unwrap();
        let mut body = Body::two_node(SPACING, VOLUME).with_variables(material.variables());
        body.displacement[3] = dx;
        body.displacement[4] = dy;
        evaluate(&material, &mut body);
        let (f0, f1) = (body.force_on(0), body.force_on(1));
        for c in 0..3 {
            prop_assert_eq!(f0[c], -f1[c]);
        }
    }
}
