//! One time-snapshot of field storage.
//!
//! A [`State`] owns one zero-initialised buffer per allocated
//! [`FieldSpec`]. Buffers are sized by the distribution they were allocated
//! on and never alias each other, even when two fields share a descriptor.

use indexmap::IndexMap;
use peri_core::{Distribution, FieldSpec};

/// Spec-keyed buffers for one time snapshot.
///
/// Uses `IndexMap` so iteration follows allocation order, which keeps
/// diagnostics and copies deterministic.
#[derive(Clone, Debug, Default)]
pub struct State {
    buffers: IndexMap<FieldSpec, Vec<f64>>,
}

impl State {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate one scalar-per-node buffer per spec on `map`.
    pub fn allocate_scalar_data(&mut self, specs: &[FieldSpec], map: &Distribution) {
        self.allocate(specs, map);
    }

    /// Allocate one three-component-per-node buffer per spec on `map`.
    ///
    /// `map` carries the per-node multiplicity (element size 3), so each
    /// buffer is three times the node count of a scalar buffer.
    pub fn allocate_vector3d_data(&mut self, specs: &[FieldSpec], map: &Distribution) {
        self.allocate(specs, map);
    }

    /// Allocate one scalar-per-bond buffer per spec on `map`.
    pub fn allocate_bond_data(&mut self, specs: &[FieldSpec], map: &Distribution) {
        self.allocate(specs, map);
    }

    fn allocate(&mut self, specs: &[FieldSpec], map: &Distribution) {
        let len = map.local_len();
        for spec in specs {
            self.buffers.insert(spec.clone(), vec![0.0; len]);
        }
    }

    /// Buffer for `spec`, or `None` if it was never allocated here.
    pub fn get_data(&self, spec: &FieldSpec) -> Option<&[f64]> {
        self.buffers.get(spec).map(Vec::as_slice)
    }

    /// Mutable buffer for `spec`, or `None` if it was never allocated here.
    pub fn get_data_mut(&mut self, spec: &FieldSpec) -> Option<&mut [f64]> {
        self.buffers.get_mut(spec).map(Vec::as_mut_slice)
    }

    /// Mutable buffers for several specs at once, in the order given.
    ///
    /// Entry `k` is `None` when `specs[k]` has no buffer here. A spec listed
    /// more than once gets its buffer at its first position only.
    pub fn get_many_mut(&mut self, specs: &[FieldSpec]) -> Vec<Option<&mut [f64]>> {
        let mut out: Vec<Option<&mut [f64]>> = specs.iter().map(|_| None).collect();
        for (spec, buffer) in self.buffers.iter_mut() {
            if let Some(k) = specs.iter().position(|s| s == spec) {
                out[k] = Some(buffer.as_mut_slice());
            }
        }
        out
    }

    /// Whether `spec` has a buffer in this state.
    pub fn contains(&self, spec: &FieldSpec) -> bool {
        self.buffers.contains_key(spec)
    }

    /// Specs with a buffer here, in allocation order.
    pub fn field_specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.buffers.keys()
    }

    /// Number of buffers.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether no buffer has been allocated.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Copy every buffer of `other` that also exists here, element-wise.
    ///
    /// Both states must have been allocated on the same descriptors; fields
    /// present in only one of them are skipped.
    pub fn copy_from(&mut self, other: &State) {
        for (spec, dst) in self.buffers.iter_mut() {
            if let Some(src) = other.buffers.get(spec) {
                dst.copy_from_slice(src);
            }
        }
    }
}
