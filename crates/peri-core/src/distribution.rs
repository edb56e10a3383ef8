//! Rank-local distribution descriptors.
//!
//! A [`Distribution`] describes which elements (nodes) this rank holds and
//! how many storage slots each one needs. It is the only thing the state
//! layer needs to size a buffer: the extent of any buffer allocated on a
//! distribution is [`Distribution::local_len`].
//!
//! Three descriptors are in play for a body:
//!
//! ```text
//! scalar map    element size 1             → one slot per node
//! vector3D map  element size 3             → three slots per node
//! bond map      element size = bond count  → one slot per bond
//! ```
//!
//! Construction of the descriptors (partitioning, ghost selection) is the
//! job of the mesh/partition layer; this type only records the result.

use crate::error::FieldError;

/// Storage slots per element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementSizes {
    /// Every element has the same number of slots.
    Uniform(u32),
    /// Per-element slot counts, indexed like the element list.
    Variable(Vec<u32>),
}

/// Describes the rank-local share of a partitioned element set.
///
/// Elements are ordered owned-first: the first [`num_owned`](Self::num_owned)
/// entries of [`global_ids`](Self::global_ids) are owned by this rank, the rest
/// are ghost copies of neighbours owned elsewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Distribution {
    global_ids: Vec<u64>,
    num_owned: usize,
    sizes: ElementSizes,
    /// Prefix sums of element sizes; `offsets[i]` is the first slot of element `i`.
    offsets: Vec<usize>,
}

impl Distribution {
    /// Create a descriptor where every element has `element_size` slots.
    pub fn uniform(
        global_ids: Vec<u64>,
        num_owned: usize,
        element_size: u32,
    ) -> Result<Self, FieldError> {
        Self::build(global_ids, num_owned, ElementSizes::Uniform(element_size))
    }

    /// Create a descriptor with a slot count per element.
    ///
    /// Used for bond data, where element `i` holds one slot per bond of node `i`.
    pub fn variable(
        global_ids: Vec<u64>,
        num_owned: usize,
        sizes: Vec<u32>,
    ) -> Result<Self, FieldError> {
        if sizes.len() != global_ids.len() {
            return Err(FieldError::InvalidDistribution {
                reason: format!(
                    "{} element sizes given for {} elements",
                    sizes.len(),
                    global_ids.len()
                ),
            });
        }
        Self::build(global_ids, num_owned, ElementSizes::Variable(sizes))
    }

    /// Serial convenience: `count` owned elements with ids `0..count`, no ghosts.
    pub fn serial(count: usize, element_size: u32) -> Self {
        let sizes = ElementSizes::Uniform(element_size);
        let offsets = (0..=count).map(|i| i * element_size as usize).collect();
        Self {
            global_ids: (0..count as u64).collect(),
            num_owned: count,
            sizes,
            offsets,
        }
    }

    fn build(
        global_ids: Vec<u64>,
        num_owned: usize,
        sizes: ElementSizes,
    ) -> Result<Self, FieldError> {
        if num_owned > global_ids.len() {
            return Err(FieldError::InvalidDistribution {
                reason: format!(
                    "owned count {num_owned} exceeds element count {}",
                    global_ids.len()
                ),
            });
        }
        let mut offsets = Vec::with_capacity(global_ids.len() + 1);
        let mut cursor = 0usize;
        offsets.push(cursor);
        for i in 0..global_ids.len() {
            cursor += match &sizes {
                ElementSizes::Uniform(n) => *n as usize,
                ElementSizes::Variable(v) => v[i] as usize,
            };
            offsets.push(cursor);
        }
        Ok(Self {
            global_ids,
            num_owned,
            sizes,
            offsets,
        })
    }

    /// Number of local elements (owned plus ghost).
    pub fn num_elements(&self) -> usize {
        self.global_ids.len()
    }

    /// Number of elements owned by this rank.
    pub fn num_owned(&self) -> usize {
        self.num_owned
    }

    /// Global ids of local elements, owned first.
    pub fn global_ids(&self) -> &[u64] {
        &self.global_ids
    }

    /// Per-element slot counts.
    pub fn element_sizes(&self) -> &ElementSizes {
        &self.sizes
    }

    /// The uniform element size, or `None` for variable-size descriptors.
    pub fn uniform_element_size(&self) -> Option<u32> {
        match self.sizes {
            ElementSizes::Uniform(n) => Some(n),
            ElementSizes::Variable(_) => None,
        }
    }

    /// Total storage slots on this rank: the extent of a buffer on this map.
    pub fn local_len(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Slot range of element `i` within a buffer on this map.
    ///
    /// # Panics
    ///
    /// Panics if `i >= num_elements()`.
    pub fn element_range(&self, i: usize) -> std::ops::Range<usize> {
        self.offsets[i]..self.offsets[i + 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn uniform_local_len_scales_with_element_size() {
        let scalar = Distribution::uniform(vec![0, 1, 2, 3], 3, 1).unwrap();
        let vector = Distribution::uniform(vec![0, 1, 2, 3], 3, 3).unwrap();
        assert_eq!(scalar.local_len(), 4);
        assert_eq!(vector.local_len(), 12);
        assert_eq!(vector.num_owned(), 3);
        assert_eq!(vector.element_range(2), 6..9);
    }

    #[test]
    fn variable_offsets_follow_sizes() {
        let bonds = Distribution::variable(vec![10, 11, 12], 3, vec![2, 0, 3]).unwrap();
        assert_eq!(bonds.local_len(), 5);
        assert_eq!(bonds.element_range(0), 0..2);
        assert_eq!(bonds.element_range(1), 2..2);
        assert_eq!(bonds.element_range(2), 2..5);
        assert_eq!(bonds.uniform_element_size(), None);
    }

    #[test]
    fn owned_count_cannot_exceed_elements() {
        let result = Distribution::uniform(vec![0, 1], 3, 1);
        assert!(matches!(result, Err(FieldError::InvalidDistribution { .. })));
    }

    #[test]
    fn variable_sizes_must_match_elements() {
        let result = Distribution::variable(vec![0, 1], 2, vec![1]);
        assert!(matches!(result, Err(FieldError::InvalidDistribution { .. })));
    }

    #[test]
    fn serial_owns_everything() {
        let d = Distribution::serial(5, 3);
        assert_eq!(d.num_owned(), 5);
        assert_eq!(d.global_ids(), &[0, 1, 2, 3, 4]);
        assert_eq!(d.local_len(), 15);
    }

    proptest! {
        #[test]
        fn local_len_is_sum_of_sizes(sizes in prop::collection::vec(0u32..16, 0..64)) {
            let ids: Vec<u64> = (0..sizes.len() as u64).collect();
            let n = ids.len();
            let expected: usize = sizes.iter().map(|&s| s as usize).sum();
            let d = Distribution::variable(ids, n, sizes).unwrap();
            prop_assert_eq!(d.local_len(), expected);
        }
    }
}
