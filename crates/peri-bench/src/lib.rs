//! Benchmark profiles for the Peri peridynamics core.
//!
//! - [`steel`]: reference material parameters.
//! - [`reference_body`]: `n³` lattice under a small affine deformation.
//! - [`reference_field_specs`] / [`reference_data_manager`]: the field set
//!   and storage a driver would allocate for that body.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use peri_core::{Distribution, FieldSpec, FieldTemporal};
use peri_material::MaterialModel;
use peri_materials::MaterialParams;
use peri_state::{DataError, DataManager};
use peri_test_utils::Body;

/// Lattice spacing of the reference bodies.
pub const SPACING: f64 = 0.001;

/// Horizon as a multiple of the lattice spacing.
pub const HORIZON_FACTOR: f64 = 3.015;

/// Steel-like elastic-plastic parameters with the reference horizon.
pub fn steel() -> MaterialParams {
    MaterialParams::new(130.0e9, 78.0e9, HORIZON_FACTOR * SPACING, 7800.0).with_yield_stress(3.0e8)
}

/// `n × n × n` lattice sized for `material`, stretched 0.1% along x and
/// sheared 0.05% in xy.
pub fn reference_body(n: usize, material: &dyn MaterialModel) -> Body {
    let mut body =
        Body::cubic_lattice(n, SPACING, material.horizon()).with_variables(material.variables());
    body.displace(|x| [1.0e-3 * x[0] + 5.0e-4 * x[1], 0.0, 0.0]);
    body
}

/// Kinematic fields plus `material`'s internal variables.
pub fn reference_field_specs(material: &dyn MaterialModel) -> Vec<FieldSpec> {
    let mut specs = vec![
        FieldSpec::scalar(FieldTemporal::Stateless, "volume"),
        FieldSpec::vector3d(FieldTemporal::Stateless, "model_coordinates"),
        FieldSpec::vector3d(FieldTemporal::Stateful, "coordinates"),
        FieldSpec::vector3d(FieldTemporal::Stateful, "displacement"),
        FieldSpec::vector3d(FieldTemporal::Stateful, "velocity"),
        FieldSpec::vector3d(FieldTemporal::Stateful, "force_density"),
        FieldSpec::bond(FieldTemporal::Stateful, "bond_damage"),
    ];
    specs.extend(material.field_specs());
    specs
}

/// A data manager with all three distributions set for `body`, not yet
/// allocated.
pub fn reference_data_manager(body: &Body) -> Result<DataManager, DataError> {
    let n = body.num_nodes();
    let mut dm = DataManager::new();
    dm.set_scalar_map(Arc::new(Distribution::serial(n, 1)))?;
    dm.set_vector3d_map(Arc::new(Distribution::serial(n, 3)))?;
    let bonds = body.neighbors.bond_distribution((0..n as u64).collect())?;
    dm.set_bond_map(Arc::new(bonds));
    Ok(dm)
}
