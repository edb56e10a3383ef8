//! Reference constitutive laws and damage models for Peri simulations.
//!
//! Provides ordinary state-based materials that implement the
//! [`MaterialModel`](peri_material::MaterialModel) contract, a
//! critical-stretch damage model, and the configuration layer that builds
//! them from a parameter map.
//!
//! # Call order (each step)
//!
//! 1. `update_constitutive_data`: advance bond damage, then recompute
//!    dilatation and nodal damage.
//! 2. `compute_force`: add bond forces into the force buffer, reading
//!    stateful variables at `N` and writing them at `N+1`.
//! 3. The driver calls `DataManager::update_state` once the step is
//!    accepted, so `N+1` becomes `N`.
//!
//! `initialize` runs once, before the first step, to compute weighted
//! volumes.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod damage;
pub mod elastic;
pub mod elastic_plastic;
pub(crate) mod kernels;
pub mod variables;

pub use config::{ConfigError, MaterialConfig, MaterialKind, MaterialParams};
pub use damage::CriticalStretchDamage;
pub use elastic::ElasticMaterial;
pub use elastic_plastic::ElasticPlasticMaterial;
