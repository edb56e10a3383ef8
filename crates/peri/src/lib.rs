//! Peri: the state-management and constitutive-model core of a
//! peridynamics solver.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Peri sub-crates. For most users, adding `peri` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use peri::prelude::*;
//!
//! // Two nodes 1 mm apart, bonded to each other.
//! let neighbors = NeighborList::from_lists(vec![vec![1], vec![0]]);
//! let params = MaterialParams::new(100.0e9, 60.0e9, 0.003, 7800.0);
//! let material = ElasticMaterial::new(&params).unwrap();
//!
//! // The data manager holds the material's internal variables plus the
//! // driver's force and bond damage.
//! let force = FieldSpec::vector3d(FieldTemporal::Stateful, "force_density");
//! let bond_damage = FieldSpec::bond(FieldTemporal::Stateless, "bond_damage");
//! let mut specs = material.field_specs();
//! specs.extend([force.clone(), bond_damage.clone()]);
//!
//! let mut dm = DataManager::new();
//! dm.set_scalar_map(Arc::new(Distribution::serial(2, 1))).unwrap();
//! dm.set_vector3d_map(Arc::new(Distribution::serial(2, 3))).unwrap();
//! dm.set_bond_map(Arc::new(neighbors.bond_distribution(vec![0, 1]).unwrap()));
//! dm.allocate_data(specs.clone()).unwrap();
//!
//! // Evaluate one step with the second node pulled 1 µm along x.
//! let x = [0.0, 0.0, 0.0, 0.001, 0.0, 0.0];
//! let u = [0.0, 0.0, 0.0, 1.0e-6, 0.0, 0.0];
//! let v = [0.0; 6];
//! let volume = [1.0e-9; 2];
//! let owned = [0, 1];
//! {
//!     let mut views = dm.field_views(&specs).unwrap();
//!     let bond_damage = views.pop().unwrap().into_current();
//!     let force = views.pop().unwrap().into_current();
//!     let buffers =
//!         Buffers::from_views(views, material.variables(), bond_damage, force).unwrap();
//!     let mut ctx = MaterialContext::new(
//!         Kinematics {
//!             reference: &x,
//!             displacement: &u,
//!             velocity: &v,
//!             cell_volume: &volume,
//!             dt: 1.0e-8,
//!         },
//!         Topology { owned_ids: &owned, neighbors: &neighbors },
//!         buffers,
//!     );
//!     material.initialize(&mut ctx).unwrap();
//!     material.update_constitutive_data(&mut ctx).unwrap();
//!     material.compute_force(&mut ctx).unwrap();
//! }
//! let f = dm.get_data(&force, FieldStep::Np1).unwrap();
//! assert!(f[0] > 0.0);
//! assert_eq!(f[0], -f[3]);
//!
//! // Accept the step: N+1 becomes N.
//! dm.update_state();
//! assert!(dm.get_data(&force, FieldStep::N).unwrap()[0] > 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `peri-core` | Field specs, steps, distribution descriptors, `FieldView` |
//! | [`state`] | `peri-state` | `State`, classification, and the `DataManager` |
//! | [`material`] | `peri-material` | `MaterialModel` and `DamageModel` traits, call context |
//! | [`materials`] | `peri-materials` | Reference laws, damage, and configuration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Field specs, steps, distribution descriptors, and field views
/// (`peri-core`).
pub use peri_core as types;

/// Field registry and double-buffered storage (`peri-state`).
///
/// [`state::DataManager`] owns the stateless and stateful states and
/// dispatches lookups by [`types::FieldStep`].
pub use peri_state as state;

/// Material model contract and call context (`peri-material`).
///
/// The [`material::MaterialModel`] trait is the main extension point for
/// user-defined constitutive laws.
pub use peri_material as material;

/// Reference materials and configuration (`peri-materials`).
///
/// Includes [`materials::ElasticMaterial`],
/// [`materials::ElasticPlasticMaterial`], and
/// [`materials::CriticalStretchDamage`].
pub use peri_materials as materials;

/// Common imports for typical Peri usage.
///
/// ```rust
/// use peri::prelude::*;
/// ```
pub mod prelude {
    // Field model
    pub use peri_core::{
        Distribution, FieldLength, FieldSpec, FieldStep, FieldTemporal, FieldView,
    };

    // Storage
    pub use peri_state::{DataManager, State};

    // Material contract
    pub use peri_material::{
        Buffers, ConstitutiveVariables, DamageModel, Kinematics, MaterialContext, MaterialModel,
        NeighborList, Topology,
    };

    // Reference materials
    pub use peri_materials::{
        CriticalStretchDamage, ElasticMaterial, ElasticPlasticMaterial, MaterialConfig,
        MaterialKind, MaterialParams,
    };

    // Errors
    pub use peri_core::FieldError;
    pub use peri_material::MaterialError;
    pub use peri_materials::ConfigError;
    pub use peri_state::DataError;
}
