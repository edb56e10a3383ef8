//! Registry of a material's constitutive (internal) variables.
//!
//! Each material composes one [`ConstitutiveVariables`] describing which
//! scalar, vector, and bond variables it keeps and whether each one carries
//! history between steps. Indices are assigned in registration order and
//! never change for the life of the registry, so output routines can label
//! columns by position.

use std::fmt;

use peri_core::{FieldSpec, FieldTemporal};

use crate::error::MaterialError;

/// Family of a constitutive variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// One value per node.
    Scalar,
    /// Three values per node.
    Vector,
    /// One value per bond.
    Bond,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Vector => write!(f, "vector"),
            Self::Bond => write!(f, "bond"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Variable {
    name: String,
    temporal: FieldTemporal,
}

/// Ordered scalar, vector, and bond constitutive variables.
///
/// A [`FieldTemporal::Stateless`] variable is recomputed from scratch each
/// step. A [`FieldTemporal::Stateful`] one is read at step `N` and written
/// at step `N+1`, and the driver promotes `N+1` to `N` once the step has
/// converged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstitutiveVariables {
    scalar: Vec<Variable>,
    vector: Vec<Variable>,
    bond: Vec<Variable>,
}

impl ConstitutiveVariables {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variable and return its index within its family.
    pub fn add(
        &mut self,
        kind: VariableKind,
        temporal: FieldTemporal,
        name: impl Into<String>,
    ) -> usize {
        let list = self.list_mut(kind);
        list.push(Variable {
            name: name.into(),
            temporal,
        });
        list.len() - 1
    }

    /// Register a scalar variable.
    pub fn add_scalar(&mut self, temporal: FieldTemporal, name: impl Into<String>) -> usize {
        self.add(VariableKind::Scalar, temporal, name)
    }

    /// Register a vector variable.
    pub fn add_vector(&mut self, temporal: FieldTemporal, name: impl Into<String>) -> usize {
        self.add(VariableKind::Vector, temporal, name)
    }

    /// Register a bond variable.
    pub fn add_bond(&mut self, temporal: FieldTemporal, name: impl Into<String>) -> usize {
        self.add(VariableKind::Bond, temporal, name)
    }

    /// Number of variables of `kind`.
    pub fn count(&self, kind: VariableKind) -> usize {
        self.list(kind).len()
    }

    /// Name of the variable of `kind` at `pos`.
    pub fn name(&self, kind: VariableKind, pos: usize) -> Result<&str, MaterialError> {
        self.get(kind, pos).map(|v| v.name.as_str())
    }

    /// Temporal class of the variable of `kind` at `pos`.
    pub fn temporal(&self, kind: VariableKind, pos: usize) -> Result<FieldTemporal, MaterialError> {
        self.get(kind, pos).map(|v| v.temporal)
    }

    /// Index of the variable of `kind` called `name`.
    pub fn index_of(&self, kind: VariableKind, name: &str) -> Option<usize> {
        self.list(kind).iter().position(|v| v.name == name)
    }

    /// Field specs a driver registers to store these variables.
    ///
    /// Scalars map to scalar fields, vectors to vector3D fields, and bond
    /// variables to bond fields, each with its registered temporal class.
    /// Order is all scalars, then vectors, then bonds, in registration
    /// order; the views handed back to the material follow the same order.
    pub fn field_specs(&self) -> Vec<FieldSpec> {
        let spec = |kind: VariableKind| {
            move |v: &Variable| match kind {
                VariableKind::Scalar => FieldSpec::scalar(v.temporal, v.name.clone()),
                VariableKind::Vector => FieldSpec::vector3d(v.temporal, v.name.clone()),
                VariableKind::Bond => FieldSpec::bond(v.temporal, v.name.clone()),
            }
        };
        self.scalar
            .iter()
            .map(spec(VariableKind::Scalar))
            .chain(self.vector.iter().map(spec(VariableKind::Vector)))
            .chain(self.bond.iter().map(spec(VariableKind::Bond)))
            .collect()
    }

    fn get(&self, kind: VariableKind, pos: usize) -> Result<&Variable, MaterialError> {
        let list = self.list(kind);
        list.get(pos).ok_or(MaterialError::IndexOutOfRange {
            kind,
            pos,
            count: list.len(),
        })
    }

    fn list(&self, kind: VariableKind) -> &Vec<Variable> {
        match kind {
            VariableKind::Scalar => &self.scalar,
            VariableKind::Vector => &self.vector,
            VariableKind::Bond => &self.bond,
        }
    }

    fn list_mut(&mut self, kind: VariableKind) -> &mut Vec<Variable> {
        match kind {
            VariableKind::Scalar => &mut self.scalar,
            VariableKind::Vector => &mut self.vector,
            VariableKind::Bond => &mut self.bond,
        }
    }
}
