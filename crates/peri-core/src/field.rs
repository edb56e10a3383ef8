//! Field descriptors: [`FieldSpec`], its shape and temporal classes, and
//! the [`FieldStep`] selector used to address double-buffered storage.

use std::fmt;

use crate::error::FieldError;

/// Shape class of a field: how many storage slots it needs per element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldLength {
    /// One value per node.
    Scalar,
    /// A fixed-size vector per node.
    ///
    /// Only `dims == 3` is storable; other widths are rejected when the
    /// field is classified for allocation.
    Vector {
        /// Number of components per node.
        dims: u32,
    },
    /// One value per bond. The number of bonds per node varies.
    Bond,
}

impl FieldLength {
    /// The three-component node vector, the only vector width with storage.
    pub const VECTOR3D: Self = Self::Vector { dims: 3 };

    /// Storage slots per node for node-shaped fields.
    ///
    /// Returns `None` for bond fields, whose multiplicity is set per node
    /// by the bond distribution.
    pub fn components(&self) -> Option<u32> {
        match self {
            Self::Scalar => Some(1),
            Self::Vector { dims } => Some(*dims),
            Self::Bond => None,
        }
    }
}

impl fmt::Display for FieldLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Vector { dims: 3 } => write!(f, "vector3d"),
            Self::Vector { dims } => write!(f, "vector{dims}d"),
            Self::Bond => write!(f, "bond"),
        }
    }
}

/// Temporal architecture of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldTemporal {
    /// A single buffer, overwritten in place each step.
    Stateless,
    /// Two buffers: the converged step `N` and the step being computed `N+1`.
    Stateful,
}

impl fmt::Display for FieldTemporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stateless => write!(f, "stateless"),
            Self::Stateful => write!(f, "stateful"),
        }
    }
}

/// Which time snapshot of a field to address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldStep {
    /// The single buffer of a stateless field.
    None,
    /// The last converged step of a stateful field.
    N,
    /// The step being computed for a stateful field.
    Np1,
}

impl FieldStep {
    /// Integer code used by drivers and binding layers.
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::N => 1,
            Self::Np1 => 2,
        }
    }
}

impl TryFrom<i32> for FieldStep {
    type Error = FieldError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::N),
            2 => Ok(Self::Np1),
            _ => Err(FieldError::InvalidStep { code }),
        }
    }
}

impl fmt::Display for FieldStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "STEP_NONE"),
            Self::N => write!(f, "STEP_N"),
            Self::Np1 => write!(f, "STEP_NP1"),
        }
    }
}

/// Immutable descriptor of one physical field.
///
/// Shape and temporal class are fixed at construction. Specs are compared
/// and hashed by value, so they can key storage maps directly. Names are
/// expected to be unique within a registry, but that is not enforced here.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    length: FieldLength,
    temporal: FieldTemporal,
    name: String,
    units: Option<String>,
}

impl FieldSpec {
    /// Create a new field spec.
    pub fn new(length: FieldLength, temporal: FieldTemporal, name: impl Into<String>) -> Self {
        Self {
            length,
            temporal,
            name: name.into(),
            units: None,
        }
    }

    /// Scalar-per-node field.
    pub fn scalar(temporal: FieldTemporal, name: impl Into<String>) -> Self {
        Self::new(FieldLength::Scalar, temporal, name)
    }

    /// Three-component-per-node field.
    pub fn vector3d(temporal: FieldTemporal, name: impl Into<String>) -> Self {
        Self::new(FieldLength::VECTOR3D, temporal, name)
    }

    /// Scalar-per-bond field.
    pub fn bond(temporal: FieldTemporal, name: impl Into<String>) -> Self {
        Self::new(FieldLength::Bond, temporal, name)
    }

    /// Attach a unit annotation (e.g. `"m/s"`). Diagnostics only.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Shape class.
    pub fn length(&self) -> FieldLength {
        self.length
    }

    /// Temporal architecture.
    pub fn temporal(&self) -> FieldTemporal {
        self.temporal
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional unit annotation.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Whether the field keeps separate `N` and `N+1` buffers.
    pub fn is_stateful(&self) -> bool {
        self.temporal == FieldTemporal::Stateful
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({} {})", self.name, self.temporal, self.length)
    }
}
