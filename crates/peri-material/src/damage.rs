//! The [`DamageModel`] collaborator interface.
//!
//! A damage model owns the evolution of the per-bond damage state and
//! turns it into a survival factor that materials multiply into each bond
//! force. Materials hold an optional `Arc<dyn DamageModel>`; without one,
//! every bond survives with factor `1.0`.

use crate::context::{Kinematics, Topology};
use crate::error::MaterialError;

/// Reference and deformed length of one bond.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BondGeometry {
    /// Length `|ξ|` in the reference configuration.
    pub reference_length: f64,
    /// Length `|η + ξ|` in the current configuration.
    pub deformed_length: f64,
}

impl BondGeometry {
    /// Engineering stretch `(|Y| - |ξ|) / |ξ|`.
    ///
    /// Returns `0.0` for a degenerate reference length.
    pub fn stretch(&self) -> f64 {
        if self.reference_length > 0.0 {
            (self.deformed_length - self.reference_length) / self.reference_length
        } else {
            0.0
        }
    }
}

/// Per-bond damage evolution consulted by material models.
///
/// # Contract
///
/// - `survival_factor` returns a value in `[0, 1]`; `1.0` is an intact bond.
/// - `update_bond_damage` writes only the damage slots of bonds owned by
///   `topology`, in bond-slot order, and never lowers a slot's damage.
pub trait DamageModel: Send + Sync {
    /// Human-readable name for logs and error reports.
    fn name(&self) -> &str;

    /// Scale factor applied to the force of a bond with damage state
    /// `bond_damage`.
    ///
    /// Default: `1 - bond_damage`, clamped to `[0, 1]`.
    fn survival_factor(&self, bond_damage: f64, geometry: &BondGeometry) -> f64 {
        let _ = geometry;
        (1.0 - bond_damage).clamp(0.0, 1.0)
    }

    /// Advance the damage state of every owned bond from the current
    /// kinematics.
    fn update_bond_damage(
        &self,
        kinematics: &Kinematics<'_>,
        topology: &Topology<'_>,
        bond_damage: &mut [f64],
    ) -> Result<(), MaterialError>;
}
