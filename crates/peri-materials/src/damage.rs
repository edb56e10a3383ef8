//! Critical-stretch bond breakage.

use peri_material::{DamageModel, Kinematics, MaterialError, Topology};
use tracing::warn;

use crate::config::{positive, ConfigError, CRITICAL_STRETCH};
use crate::kernels;

/// Breaks a bond irreversibly once its stretch exceeds a threshold.
///
/// A broken bond has damage `1.0` and survival factor `0.0` from then on.
#[derive(Clone, Debug)]
pub struct CriticalStretchDamage {
    critical_stretch: f64,
}

impl CriticalStretchDamage {
    /// Damage model breaking bonds stretched beyond `critical_stretch`,
    /// which must be finite and positive.
    pub fn new(critical_stretch: f64) -> Result<Self, ConfigError> {
        positive(CRITICAL_STRETCH, critical_stretch)?;
        Ok(Self { critical_stretch })
    }

    /// The stretch threshold.
    pub fn critical_stretch(&self) -> f64 {
        self.critical_stretch
    }
}

impl DamageModel for CriticalStretchDamage {
    fn name(&self) -> &str {
        "Critical Stretch"
    }

    fn update_bond_damage(
        &self,
        kinematics: &Kinematics<'_>,
        topology: &Topology<'_>,
        bond_damage: &mut [f64],
    ) -> Result<(), MaterialError> {
        let mut broken = 0usize;
        kernels::for_each_node(kinematics, topology, |_, bonds| {
            for b in bonds {
                let slot = &mut bond_damage[b.slot];
                if *slot < 1.0 && b.geometry().stretch() > self.critical_stretch {
                    *slot = 1.0;
                    broken += 1;
                }
            }
            Ok(())
        })?;
        if broken > 0 {
            warn!(
                model = self.name(),
                bonds = broken,
                critical_stretch = self.critical_stretch,
                "bonds broken"
            );
        }
        Ok(())
    }
}
