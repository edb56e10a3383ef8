//! Data manager error types.

use std::error::Error;
use std::fmt;

use peri_core::{FieldError, FieldLength, FieldStep, FieldTemporal};

/// Errors from field classification, allocation, and retrieval.
///
/// All of these are setup mistakes: none is expected during a correctly
/// configured run, and none is recoverable at this layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataError {
    /// A field's shape is outside the storable set.
    InvalidSpec {
        /// Name of the offending field.
        name: String,
        /// Its declared shape.
        length: FieldLength,
    },
    /// Fields of a shape were registered but no descriptor was set for it.
    MissingDistribution {
        /// The shape whose descriptor is absent.
        length: FieldLength,
    },
    /// A descriptor handed to a `set_*_map` call does not fit its shape.
    InvalidDistribution {
        /// The shape the descriptor was offered for.
        length: FieldLength,
        /// Description of the mismatch.
        reason: String,
    },
    /// A core field type failed to construct.
    Field(FieldError),
    /// A raw step code outside `{NONE, N, NP1}`.
    InvalidStep {
        /// The rejected code.
        code: i32,
    },
    /// Bond fields of a temporal class were registered without any scalar
    /// or vector3D field of that class, so no state exists to hold them.
    UnhostedBondField {
        /// Name of the first such bond field.
        name: String,
        /// Its temporal class.
        temporal: FieldTemporal,
    },
    /// The same spec was requested twice in one borrow of the storage.
    DuplicateField {
        /// Name of the repeated field.
        name: String,
    },
    /// `allocate_data` was called on a manager that is already allocated.
    AlreadyAllocated,
    /// No state exists for the requested step (nothing of that temporal
    /// class was registered, or `allocate_data` has not run).
    StateNotAllocated {
        /// The requested step.
        step: FieldStep,
    },
    /// The field has no buffer in the requested step's state.
    UnknownField {
        /// Name of the requested field.
        name: String,
        /// The requested step.
        step: FieldStep,
    },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpec { name, length } => {
                write!(f, "invalid field spec '{name}': unsupported shape {length}")
            }
            Self::MissingDistribution { length } => {
                write!(
                    f,
                    "attempting to allocate {length} data with no {length} distribution set"
                )
            }
            Self::InvalidDistribution { length, reason } => {
                write!(f, "invalid {length} distribution: {reason}")
            }
            Self::Field(e) => write!(f, "field: {e}"),
            Self::InvalidStep { code } => write!(f, "invalid field step code {code}"),
            Self::UnhostedBondField { name, temporal } => write!(
                f,
                "bond field '{name}' is {temporal} but no {temporal} scalar or vector3d field \
                 was registered to create its state"
            ),
            Self::DuplicateField { name } => {
                write!(f, "field '{name}' requested more than once")
            }
            Self::AlreadyAllocated => write!(f, "data manager is already allocated"),
            Self::StateNotAllocated { step } => write!(f, "no state allocated for {step}"),
            Self::UnknownField { name, step } => {
                write!(f, "field '{name}' has no buffer at {step}")
            }
        }
    }
}

impl Error for DataError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FieldError> for DataError {
    fn from(e: FieldError) -> Self {
        match e {
            FieldError::InvalidStep { code } => Self::InvalidStep { code },
            other => Self::Field(other),
        }
    }
}
