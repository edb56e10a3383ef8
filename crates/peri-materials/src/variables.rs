//! Names of the constitutive variables kept by the reference materials.
//!
//! Output routines label columns with these; drivers register the fields
//! through [`MaterialModel::field_specs`](peri_material::MaterialModel::field_specs).

/// Scalar: reference weighted volume `m`.
pub const WEIGHTED_VOLUME: &str = "weighted_volume";
/// Scalar: dilatation `θ`.
pub const DILATATION: &str = "dilatation";
/// Scalar: volume-weighted fraction of broken bonds.
pub const DAMAGE: &str = "damage";
/// Scalar: accumulated plastic multiplier.
pub const LAMBDA: &str = "lambda";
/// Bond: deviatoric plastic extension.
pub const DEVIATORIC_PLASTIC_EXTENSION: &str = "deviatoric_plastic_extension";
