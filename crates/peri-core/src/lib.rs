//! Core types for the Peri peridynamics engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the field descriptors ([`FieldSpec`]), the temporal step selector
//! ([`FieldStep`]), the rank-local distribution descriptor
//! ([`Distribution`]), and the [`FieldView`] through which per-step
//! computations borrow field storage.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod distribution;
pub mod error;
pub mod field;
pub mod view;

pub use distribution::{Distribution, ElementSizes};
pub use error::FieldError;
pub use field::{FieldLength, FieldSpec, FieldStep, FieldTemporal};
pub use view::FieldView;
