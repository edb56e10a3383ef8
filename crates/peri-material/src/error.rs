//! Material model error types.

use std::error::Error;
use std::fmt;

use peri_core::FieldTemporal;

use crate::variables::VariableKind;

/// Errors from material model queries and per-step operations.
#[derive(Clone, Debug, PartialEq)]
pub enum MaterialError {
    /// A constitutive variable index outside `[0, count)`.
    IndexOutOfRange {
        /// Which variable family was queried.
        kind: VariableKind,
        /// The requested position.
        pos: usize,
        /// Number of variables of that kind.
        count: usize,
    },
    /// A buffer handed to the material has the wrong extent.
    BufferSize {
        /// Which buffer.
        buffer: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },
    /// A variable view does not carry the registered temporal class.
    TemporalMismatch {
        /// Name of the variable.
        name: String,
        /// Class it was registered with.
        expected: FieldTemporal,
    },
    /// The owned-node list and neighbour list disagree on the owned count.
    TopologyMismatch {
        /// Length of the owned-id list.
        owned_ids: usize,
        /// Owned nodes described by the neighbour list.
        neighborhoods: usize,
    },
    /// A node or neighbour id is not a local node.
    NeighborOutOfRange {
        /// The offending local id.
        id: usize,
        /// Number of local nodes.
        num_nodes: usize,
    },
    /// Two nodes share a reference position, so their bond has no direction.
    ZeroBondLength {
        /// Local id of the owning node.
        node: usize,
        /// Local id of the neighbour.
        neighbor: usize,
    },
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { kind, pos, count } => {
                write!(f, "{kind} variable index {pos} out of range (count {count})")
            }
            Self::BufferSize {
                buffer,
                expected,
                actual,
            } => write!(f, "buffer '{buffer}' has length {actual}, expected {expected}"),
            Self::TemporalMismatch { name, expected } => {
                write!(f, "variable '{name}' is registered {expected} but its view is not")
            }
            Self::TopologyMismatch {
                owned_ids,
                neighborhoods,
            } => write!(
                f,
                "{owned_ids} owned ids but neighbour list describes {neighborhoods} nodes"
            ),
            Self::NeighborOutOfRange { id, num_nodes } => {
                write!(f, "local id {id} out of range ({num_nodes} local nodes)")
            }
            Self::ZeroBondLength { node, neighbor } => {
                write!(f, "zero reference bond length between nodes {node} and {neighbor}")
            }
        }
    }
}

impl Error for MaterialError {}
