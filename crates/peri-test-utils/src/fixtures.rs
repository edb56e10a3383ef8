//! Mock damage models.
//!
//! - [`ConstantSurvival`]: every bond survives with the same factor.
//! - [`BreakAll`]: marks every owned bond broken on update.
//! - [`CountingDamage`]: intact bonds, counts update calls.

use std::sync::atomic::{AtomicUsize, Ordering};

use peri_material::{BondGeometry, DamageModel, Kinematics, MaterialError, Topology};

/// Returns a fixed survival factor regardless of bond state.
pub struct ConstantSurvival {
    pub factor: f64,
}

impl ConstantSurvival {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl DamageModel for ConstantSurvival {
    fn name(&self) -> &str {
        "constant_survival"
    }

    fn survival_factor(&self, _bond_damage: f64, _geometry: &BondGeometry) -> f64 {
        self.factor
    }

    fn update_bond_damage(
        &self,
        _kinematics: &Kinematics<'_>,
        _topology: &Topology<'_>,
        _bond_damage: &mut [f64],
    ) -> Result<(), MaterialError> {
        Ok(())
    }
}

/// Breaks every bond the first time it is updated.
pub struct BreakAll;

impl DamageModel for BreakAll {
    fn name(&self) -> &str {
        "break_all"
    }

    fn update_bond_damage(
        &self,
        _kinematics: &Kinematics<'_>,
        topology: &Topology<'_>,
        bond_damage: &mut [f64],
    ) -> Result<(), MaterialError> {
        let bonds = topology.neighbors.num_bonds().min(bond_damage.len());
        bond_damage[..bonds].fill(1.0);
        Ok(())
    }
}

/// Leaves bonds intact and records how often it was updated.
#[derive(Default)]
pub struct CountingDamage {
    updates: AtomicUsize,
}

impl CountingDamage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }
}

impl DamageModel for CountingDamage {
    fn name(&self) -> &str {
        "counting"
    }

    fn update_bond_damage(
        &self,
        _kinematics: &Kinematics<'_>,
        _topology: &Topology<'_>,
        _bond_damage: &mut [f64],
    ) -> Result<(), MaterialError> {
        self.updates.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
