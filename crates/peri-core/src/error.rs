//! Error types for field descriptors and distributions.

use std::error::Error;
use std::fmt;

/// Errors raised while constructing or decoding core field types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// A raw step code outside `{0 (NONE), 1 (N), 2 (NP1)}`.
    InvalidStep {
        /// The rejected code.
        code: i32,
    },
    /// A distribution descriptor is internally inconsistent.
    InvalidDistribution {
        /// Description of the inconsistency.
        reason: String,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStep { code } => write!(f, "invalid field step code {code}"),
            Self::InvalidDistribution { reason } => write!(f, "invalid distribution: {reason}"),
        }
    }
}

impl Error for FieldError {}
