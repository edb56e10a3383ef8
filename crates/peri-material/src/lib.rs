//! Material model contract and call context for Peri simulations.
//!
//! The [`MaterialModel`] trait defines the three per-step operations
//! (`initialize`, `update_constitutive_data`, `compute_force`) over a
//! split-borrow [`MaterialContext`]: read-only kinematics, the owned-node
//! topology, and the mutable buffers: force, bond damage, and one
//! `FieldView` per constitutive variable. Concrete laws live in
//! `peri-materials`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod damage;
pub mod error;
pub mod material;
pub mod neighbor;
pub mod variables;

pub use context::{Buffers, Kinematics, MaterialContext, Topology};
pub use damage::{BondGeometry, DamageModel};
pub use error::MaterialError;
pub use material::MaterialModel;
pub use neighbor::NeighborList;
pub use variables::{ConstitutiveVariables, VariableKind};
