//! The [`DataManager`]: field registry, descriptor checks, and the three
//! owned states.
//!
//! Lifecycle:
//! 1. `set_scalar_map()` / `set_vector3d_map()` / `set_bond_map()`
//! 2. `allocate_data(specs)`, exactly once
//! 3. `get_data()` / `get_data_mut()`, or `field_views()` to hand a set of
//!    fields to a material, any number of times
//! 4. `update_state()` at the end of each step (N+1 becomes N)

use std::sync::Arc;

use peri_core::{Distribution, FieldLength, FieldSpec, FieldStep, FieldTemporal, FieldView};
use tracing::debug;

use crate::classify::FieldClassification;
use crate::error::DataError;
use crate::state::State;

/// Rank-local owner of all field storage for one body or subdomain.
///
/// Each instance is fully independent: classification results and states
/// are fields of the manager, so several managers (e.g. one per material
/// block) can coexist without sharing anything but descriptors.
#[derive(Clone, Debug, Default)]
pub struct DataManager {
    field_specs: Vec<FieldSpec>,
    classification: FieldClassification,
    scalar_map: Option<Arc<Distribution>>,
    vector3d_map: Option<Arc<Distribution>>,
    bond_map: Option<Arc<Distribution>>,
    state_none: Option<State>,
    state_n: Option<State>,
    state_np1: Option<State>,
    allocated: bool,
}

impl DataManager {
    /// Create an empty manager with no descriptors and no states.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scalar-per-node descriptor. Its element size must be 1.
    pub fn set_scalar_map(&mut self, map: Arc<Distribution>) -> Result<(), DataError> {
        check_uniform(&map, FieldLength::Scalar, 1)?;
        self.scalar_map = Some(map);
        Ok(())
    }

    /// Set the vector3D descriptor. Its element size must be 3.
    pub fn set_vector3d_map(&mut self, map: Arc<Distribution>) -> Result<(), DataError> {
        check_uniform(&map, FieldLength::VECTOR3D, 3)?;
        self.vector3d_map = Some(map);
        Ok(())
    }

    /// Set the bond descriptor (element size = bond count of each node).
    pub fn set_bond_map(&mut self, map: Arc<Distribution>) {
        self.bond_map = Some(map);
    }

    /// The scalar descriptor, if set.
    pub fn scalar_map(&self) -> Option<&Arc<Distribution>> {
        self.scalar_map.as_ref()
    }

    /// The vector3D descriptor, if set.
    pub fn vector3d_map(&self) -> Option<&Arc<Distribution>> {
        self.vector3d_map.as_ref()
    }

    /// The bond descriptor, if set.
    pub fn bond_map(&self) -> Option<&Arc<Distribution>> {
        self.bond_map.as_ref()
    }

    /// Classify `specs` and allocate every state they need.
    ///
    /// The stateless state exists iff a stateless scalar or vector3D field
    /// is registered; the `N`/`N+1` pair exists iff a stateful scalar or
    /// vector3D field is. Bond fields join the state of their temporal
    /// class, and a bond field whose class has no such state fails with
    /// [`DataError::UnhostedBondField`].
    ///
    /// Validation runs to completion before any state is created: an
    /// invalid shape, a missing descriptor, or an unhosted bond field
    /// leaves the manager exactly as it was. A second call fails with
    /// [`DataError::AlreadyAllocated`].
    ///
    /// Allocation order within each state is scalar, then vector3D, then
    /// bond. `N` and `N+1` receive identical allocations.
    pub fn allocate_data(&mut self, specs: Vec<FieldSpec>) -> Result<(), DataError> {
        if self.allocated {
            return Err(DataError::AlreadyAllocated);
        }

        let c = FieldClassification::classify(&specs)?;
        debug!(
            stateless_scalar = c.stateless_scalar.len(),
            stateless_vector3d = c.stateless_vector3d.len(),
            stateless_bond = c.stateless_bond.len(),
            stateful_scalar = c.stateful_scalar.len(),
            stateful_vector3d = c.stateful_vector3d.len(),
            stateful_bond = c.stateful_bond.len(),
            "classified field specs"
        );

        let scalar_map = required_map(&self.scalar_map, c.needs_scalar(), FieldLength::Scalar)?;
        let vector3d_map =
            required_map(&self.vector3d_map, c.needs_vector3d(), FieldLength::VECTOR3D)?;
        let bond_map = required_map(&self.bond_map, c.needs_bond(), FieldLength::Bond)?;
        if let Some(spec) = c.unhosted_bond() {
            return Err(DataError::UnhostedBondField {
                name: spec.name().to_string(),
                temporal: spec.temporal(),
            });
        }

        let allocate = |state: &mut State,
                        scalar: &[FieldSpec],
                        vector: &[FieldSpec],
                        bond: &[FieldSpec]| {
            if let Some(map) = scalar_map.filter(|_| !scalar.is_empty()) {
                state.allocate_scalar_data(scalar, map);
            }
            if let Some(map) = vector3d_map.filter(|_| !vector.is_empty()) {
                state.allocate_vector3d_data(vector, map);
            }
            if let Some(map) = bond_map.filter(|_| !bond.is_empty()) {
                state.allocate_bond_data(bond, map);
            }
        };

        let state_none = if c.needs_state_none() {
            let mut state = State::new();
            allocate(
                &mut state,
                &c.stateless_scalar,
                &c.stateless_vector3d,
                &c.stateless_bond,
            );
            Some(state)
        } else {
            None
        };

        let (state_n, state_np1) = if c.needs_stateful_pair() {
            let mut n = State::new();
            let mut np1 = State::new();
            for state in [&mut n, &mut np1] {
                allocate(
                    state,
                    &c.stateful_scalar,
                    &c.stateful_vector3d,
                    &c.stateful_bond,
                );
            }
            (Some(n), Some(np1))
        } else {
            (None, None)
        };

        debug!(
            state_none = state_none.as_ref().map_or(0, State::len),
            state_n = state_n.as_ref().map_or(0, State::len),
            state_np1 = state_np1.as_ref().map_or(0, State::len),
            "allocated states"
        );

        self.field_specs = specs;
        self.classification = c;
        self.state_none = state_none;
        self.state_n = state_n;
        self.state_np1 = state_np1;
        self.allocated = true;
        Ok(())
    }

    /// Buffer for `spec` at `step`.
    pub fn get_data(&self, spec: &FieldSpec, step: FieldStep) -> Result<&[f64], DataError> {
        self.state(step)?
            .get_data(spec)
            .ok_or_else(|| unknown(spec, step))
    }

    /// Mutable buffer for `spec` at `step`.
    pub fn get_data_mut(
        &mut self,
        spec: &FieldSpec,
        step: FieldStep,
    ) -> Result<&mut [f64], DataError> {
        self.state_mut(step)?
            .get_data_mut(spec)
            .ok_or_else(|| unknown(spec, step))
    }

    /// Buffer for `spec` addressed by a raw step code (`0`, `1`, `2`).
    ///
    /// Entry point for binding layers that carry steps as integers.
    /// Unknown codes fail with [`DataError::InvalidStep`].
    pub fn get_data_by_code(&self, spec: &FieldSpec, code: i32) -> Result<&[f64], DataError> {
        let step = FieldStep::try_from(code)?;
        self.get_data(spec, step)
    }

    /// Borrow the storage of several fields at once, in the order given.
    ///
    /// Stateless specs yield their single buffer; stateful specs yield `N`
    /// read-only and `N+1` writable. This is how a driver hands a
    /// material its variables:
    /// `material.field_specs()` in, one [`FieldView`] per spec out.
    ///
    /// Fails with [`DataError::DuplicateField`] if a spec is listed twice,
    /// since two mutable views of one buffer cannot coexist.
    pub fn field_views(&mut self, specs: &[FieldSpec]) -> Result<Vec<FieldView<'_>>, DataError> {
        for (k, spec) in specs.iter().enumerate() {
            if specs[..k].contains(spec) {
                return Err(DataError::DuplicateField {
                    name: spec.name().to_string(),
                });
            }
        }

        let has_none = self.state_none.is_some();
        let has_pair = self.state_n.is_some();
        let mut stateless = self
            .state_none
            .as_mut()
            .map_or_else(Vec::new, |s| s.get_many_mut(specs));
        let mut np1 = self
            .state_np1
            .as_mut()
            .map_or_else(Vec::new, |s| s.get_many_mut(specs));
        let n = self.state_n.as_ref();

        let mut views = Vec::with_capacity(specs.len());
        for (k, spec) in specs.iter().enumerate() {
            let view = match spec.temporal() {
                FieldTemporal::Stateless => {
                    if !has_none {
                        return Err(DataError::StateNotAllocated {
                            step: FieldStep::None,
                        });
                    }
                    let buffer = stateless.get_mut(k).and_then(Option::take);
                    FieldView::Stateless(buffer.ok_or_else(|| unknown(spec, FieldStep::None))?)
                }
                FieldTemporal::Stateful => {
                    if !has_pair {
                        return Err(DataError::StateNotAllocated { step: FieldStep::N });
                    }
                    let old = n.and_then(|s| s.get_data(spec));
                    let new = np1.get_mut(k).and_then(Option::take);
                    match (old, new) {
                        (Some(n), Some(np1)) => FieldView::Stateful { n, np1 },
                        _ => return Err(unknown(spec, FieldStep::Np1)),
                    }
                }
            };
            views.push(view);
        }
        Ok(views)
    }

    /// The state addressed by `step`.
    pub fn state(&self, step: FieldStep) -> Result<&State, DataError> {
        let state = match step {
            FieldStep::None => self.state_none.as_ref(),
            FieldStep::N => self.state_n.as_ref(),
            FieldStep::Np1 => self.state_np1.as_ref(),
        };
        state.ok_or(DataError::StateNotAllocated { step })
    }

    /// Mutable access to the state addressed by `step`.
    pub fn state_mut(&mut self, step: FieldStep) -> Result<&mut State, DataError> {
        let state = match step {
            FieldStep::None => self.state_none.as_mut(),
            FieldStep::N => self.state_n.as_mut(),
            FieldStep::Np1 => self.state_np1.as_mut(),
        };
        state.ok_or(DataError::StateNotAllocated { step })
    }

    /// Whether a state exists for `step`.
    pub fn has_state(&self, step: FieldStep) -> bool {
        self.state(step).is_ok()
    }

    /// Rotate the stateful pair: `N+1` becomes `N`, and the old `N`
    /// buffers become the next `N+1` (contents unchanged).
    ///
    /// A no-op when no stateful field was registered.
    pub fn update_state(&mut self) {
        if self.state_n.is_some() {
            std::mem::swap(&mut self.state_n, &mut self.state_np1);
            debug!("rotated stateful buffers");
        }
    }

    /// Overwrite every `N+1` buffer with the matching `N` buffer.
    ///
    /// Lets a driver seed the step being computed from the converged one.
    pub fn copy_n_to_np1(&mut self) {
        if let (Some(n), Some(np1)) = (&self.state_n, &mut self.state_np1) {
            np1.copy_from(n);
        }
    }

    /// All registered specs in registration order.
    pub fn field_specs(&self) -> &[FieldSpec] {
        &self.field_specs
    }

    /// The classification computed by `allocate_data`.
    pub fn classification(&self) -> &FieldClassification {
        &self.classification
    }

    /// Whether `allocate_data` has completed.
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }
}

fn check_uniform(map: &Distribution, length: FieldLength, size: u32) -> Result<(), DataError> {
    match map.uniform_element_size() {
        Some(n) if n == size => Ok(()),
        other => Err(DataError::InvalidDistribution {
            length,
            reason: format!("expected uniform element size {size}, got {other:?}"),
        }),
    }
}

fn required_map(
    map: &Option<Arc<Distribution>>,
    needed: bool,
    length: FieldLength,
) -> Result<Option<&Distribution>, DataError> {
    match (map, needed) {
        (_, false) => Ok(None),
        (Some(map), true) => Ok(Some(map.as_ref())),
        (None, true) => Err(DataError::MissingDistribution { length }),
    }
}

fn unknown(spec: &FieldSpec, step: FieldStep) -> DataError {
    DataError::UnknownField {
        name: spec.name().to_string(),
        step,
    }
}
