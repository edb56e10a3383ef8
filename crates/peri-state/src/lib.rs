//! Field registry and double-buffered state storage for Peri simulations.
//!
//! # Architecture
//!
//! ```text
//! DataManager (one per rank, per body or material subdomain)
//! ├── FieldClassification (six lists: stateless/stateful × scalar/vector3D/bond)
//! ├── Arc<Distribution> × 3 (scalar, vector3D, bond descriptors)
//! ├── State "NONE"  ←── stateless fields, one buffer each
//! ├── State "N"     ←── stateful fields, last converged step
//! └── State "N+1"   ←── stateful fields, step being computed
//! ```
//!
//! `N` and `N+1` always hold the same field set with equal extents; they
//! differ only in buffer identity. [`DataManager::update_state`] rotates
//! them at the end of a step by swapping ownership, so no handle into the
//! old buffers can survive the rotation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod classify;
pub mod error;
pub mod manager;
pub mod state;

pub use classify::FieldClassification;
pub use error::DataError;
pub use manager::DataManager;
pub use state::State;
