//! Per-owned-node neighbour lists in compressed-row form.
//!
//! Bond slots are numbered in list order: the bonds of the `k`-th owned
//! node occupy [`NeighborList::bond_range`]`(k)` in every bond-shaped
//! buffer. Summation over a node's bonds therefore follows list order, so
//! results are bit-reproducible for a fixed list but not across
//! reordered lists.

use peri_core::{Distribution, FieldError};

/// Neighbour lists of the owned nodes, indexed by owned position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeighborList {
    /// `offsets[k]..offsets[k + 1]` indexes `neighbors` for owned node `k`.
    offsets: Vec<usize>,
    neighbors: Vec<usize>,
}

impl NeighborList {
    /// Build from one list of local neighbour ids per owned node.
    pub fn from_lists(lists: Vec<Vec<usize>>) -> Self {
        let mut offsets = Vec::with_capacity(lists.len() + 1);
        let mut neighbors = Vec::new();
        offsets.push(0);
        for list in lists {
            neighbors.extend(list);
            offsets.push(neighbors.len());
        }
        Self { offsets, neighbors }
    }

    /// Build from a flat list `[n0, j.., n1, j.., ...]` where each count is
    /// followed by that many neighbour ids.
    ///
    /// Returns `None` if a count runs past the end of the list.
    pub fn from_flat(flat: &[usize]) -> Option<Self> {
        let mut offsets = vec![0];
        let mut neighbors = Vec::new();
        let mut i = 0;
        while i < flat.len() {
            let n = flat[i];
            let end = i.checked_add(1)?.checked_add(n)?;
            neighbors.extend_from_slice(flat.get(i + 1..end)?);
            offsets.push(neighbors.len());
            i = end;
        }
        Some(Self { offsets, neighbors })
    }

    /// Number of owned nodes described.
    pub fn num_owned(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Total number of bonds.
    pub fn num_bonds(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbour ids of the `k`-th owned node.
    pub fn neighbors(&self, k: usize) -> &[usize] {
        &self.neighbors[self.bond_range(k)]
    }

    /// Bond-slot range of the `k`-th owned node.
    pub fn bond_range(&self, k: usize) -> std::ops::Range<usize> {
        self.offsets[k]..self.offsets[k + 1]
    }

    /// Bond count of each owned node.
    pub fn bond_counts(&self) -> Vec<u32> {
        self.offsets.windows(2).map(|w| (w[1] - w[0]) as u32).collect()
    }

    /// All neighbour ids in bond-slot order.
    pub fn all_neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    /// Bond descriptor over the owned nodes with the given global ids.
    pub fn bond_distribution(
        &self,
        owned_global_ids: Vec<u64>,
    ) -> Result<Distribution, FieldError> {
        let n = owned_global_ids.len();
        Distribution::variable(owned_global_ids, n, self.bond_counts())
    }

    /// Flatten back into `[n0, j.., n1, j.., ...]` form.
    pub fn to_flat(&self) -> Vec<usize> {
        let mut flat = Vec::with_capacity(self.num_owned() + self.num_bonds());
        for k in 0..self.num_owned() {
            let nbs = self.neighbors(k);
            flat.push(nbs.len());
            flat.extend_from_slice(nbs);
        }
        flat
    }
}
