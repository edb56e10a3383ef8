//! Partitioning of field specs by shape and temporal class.

use peri_core::{FieldLength, FieldSpec, FieldTemporal};

use crate::error::DataError;

/// The six classification lists of a registry.
///
/// Every classified spec lands in exactly one list, and each list keeps
/// the registration order of its members.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldClassification {
    /// Stateless scalar-per-node fields.
    pub stateless_scalar: Vec<FieldSpec>,
    /// Stateless three-component-per-node fields.
    pub stateless_vector3d: Vec<FieldSpec>,
    /// Stateless per-bond fields.
    pub stateless_bond: Vec<FieldSpec>,
    /// Stateful scalar-per-node fields.
    pub stateful_scalar: Vec<FieldSpec>,
    /// Stateful three-component-per-node fields.
    pub stateful_vector3d: Vec<FieldSpec>,
    /// Stateful per-bond fields.
    pub stateful_bond: Vec<FieldSpec>,
}

impl FieldClassification {
    /// Partition `specs` by `(length, temporal)`.
    ///
    /// Fails with [`DataError::InvalidSpec`] on the first spec whose shape is
    /// not scalar, vector3D, or bond. Nothing is returned on failure.
    pub fn classify(specs: &[FieldSpec]) -> Result<Self, DataError> {
        let mut out = Self::default();
        for spec in specs {
            let stateful = spec.temporal() == FieldTemporal::Stateful;
            let list = match (spec.length(), stateful) {
                (FieldLength::Scalar, false) => &mut out.stateless_scalar,
                (FieldLength::Scalar, true) => &mut out.stateful_scalar,
                (FieldLength::Vector { dims: 3 }, false) => &mut out.stateless_vector3d,
                (FieldLength::Vector { dims: 3 }, true) => &mut out.stateful_vector3d,
                (FieldLength::Bond, false) => &mut out.stateless_bond,
                (FieldLength::Bond, true) => &mut out.stateful_bond,
                (length @ FieldLength::Vector { .. }, _) => {
                    return Err(DataError::InvalidSpec {
                        name: spec.name().to_string(),
                        length,
                    });
                }
            };
            list.push(spec.clone());
        }
        Ok(out)
    }

    /// Whether any scalar field (of either temporal class) is present.
    pub fn needs_scalar(&self) -> bool {
        !self.stateless_scalar.is_empty() || !self.stateful_scalar.is_empty()
    }

    /// Whether any vector3D field is present.
    pub fn needs_vector3d(&self) -> bool {
        !self.stateless_vector3d.is_empty() || !self.stateful_vector3d.is_empty()
    }

    /// Whether any bond field is present.
    pub fn needs_bond(&self) -> bool {
        !self.stateless_bond.is_empty() || !self.stateful_bond.is_empty()
    }

    /// Whether the stateless state is created: some stateless scalar or
    /// vector3D field is present. Stateless bond fields join it but never
    /// create it.
    pub fn needs_state_none(&self) -> bool {
        !self.stateless_scalar.is_empty() || !self.stateless_vector3d.is_empty()
    }

    /// Whether the `N`/`N+1` pair is created: some stateful scalar or
    /// vector3D field is present. Stateful bond fields join the pair but
    /// never create it.
    pub fn needs_stateful_pair(&self) -> bool {
        !self.stateful_scalar.is_empty() || !self.stateful_vector3d.is_empty()
    }

    /// The first bond field whose temporal class has no node field to
    /// create a state for it.
    pub fn unhosted_bond(&self) -> Option<&FieldSpec> {
        let stateless = self.stateless_bond.first().filter(|_| !self.needs_state_none());
        let stateful = self.stateful_bond.first().filter(|_| !self.needs_stateful_pair());
        stateless.or(stateful)
    }

    /// Total number of classified specs.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no spec was classified.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All classified specs, list by list.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.stateless_scalar
            .iter()
            .chain(&self.stateless_vector3d)
            .chain(&self.stateless_bond)
            .chain(&self.stateful_scalar)
            .chain(&self.stateful_vector3d)
            .chain(&self.stateful_bond)
    }
}
