//! Test fixtures and mock types for Peri development.
//!
//! [`Body`] owns every buffer a [`MaterialContext`] borrows, so tests can
//! build a small discretized body, run material operations against it,
//! and inspect the results. Constitutive variables live in a
//! [`DataManager`], exactly as a driver would hold them. Mock damage
//! models live in [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::Arc;

use peri_core::{Distribution, FieldSpec, FieldStep};
use peri_material::{
    Buffers, ConstitutiveVariables, Kinematics, MaterialContext, NeighborList, Topology,
};
use peri_state::DataManager;

/// A discretized body with owned storage for one material call.
///
/// All nodes are owned; there are no ghosts.
///
/// Helpers panic on misuse (unknown variable names, mis-sized inputs);
/// this crate is for tests only.
#[derive(Clone, Debug)]
pub struct Body {
    pub reference: Vec<f64>,
    pub displacement: Vec<f64>,
    pub velocity: Vec<f64>,
    pub cell_volume: Vec<f64>,
    pub owned_ids: Vec<usize>,
    pub neighbors: NeighborList,
    pub bond_damage: Vec<f64>,
    pub variables: ConstitutiveVariables,
    pub data: DataManager,
    pub force: Vec<f64>,
    pub dt: f64,
}

impl Body {
    /// Build a body from reference positions, per-node volumes, and
    /// neighbour lists. No constitutive variables are registered; add
    /// them with [`with_variables`](Body::with_variables).
    pub fn new(reference: Vec<f64>, cell_volume: Vec<f64>, neighbors: NeighborList) -> Self {
        let n = cell_volume.len();
        assert_eq!(reference.len(), 3 * n, "reference must hold 3 coords per node");
        let bonds = neighbors.num_bonds();
        Self {
            reference,
            displacement: vec![0.0; 3 * n],
            velocity: vec![0.0; 3 * n],
            cell_volume,
            owned_ids: (0..neighbors.num_owned()).collect(),
            neighbors,
            bond_damage: vec![0.0; bonds],
            variables: ConstitutiveVariables::new(),
            data: DataManager::new(),
            force: vec![0.0; 3 * n],
            dt: 1.0e-7,
        }
    }

    /// Two nodes `spacing` apart on the x axis, bonded to each other.
    pub fn two_node(spacing: f64, volume: f64) -> Self {
        Self::new(
            vec![0.0, 0.0, 0.0, spacing, 0.0, 0.0],
            vec![volume, volume],
            NeighborList::from_lists(vec![vec![1], vec![0]]),
        )
    }

    /// An `n × n × n` lattice with the given spacing. Nodes closer than
    /// `horizon` are bonded; each node's volume is `spacing³`.
    pub fn cubic_lattice(n: usize, spacing: f64, horizon: f64) -> Self {
        let count = n * n * n;
        let mut reference = Vec::with_capacity(3 * count);
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    reference.extend([i as f64 * spacing, j as f64 * spacing, k as f64 * spacing]);
                }
            }
        }
        let mut lists = Vec::with_capacity(count);
        for a in 0..count {
            let mut list = Vec::new();
            for b in 0..count {
                if a == b {
                    continue;
                }
                let d2: f64 = (0..3)
                    .map(|c| reference[3 * b + c] - reference[3 * a + c])
                    .map(|d| d * d)
                    .sum();
                if d2.sqrt() <= horizon {
                    list.push(b);
                }
            }
            lists.push(list);
        }
        let volume = spacing * spacing * spacing;
        Self::new(reference, vec![volume; count], NeighborList::from_lists(lists))
    }

    /// Register `vars` and allocate their storage, zero-filled.
    ///
    /// # Panics
    ///
    /// If called twice, or if `vars` cannot be allocated.
    pub fn with_variables(mut self, vars: &ConstitutiveVariables) -> Self {
        let n = self.num_nodes();
        let ids = (0..self.neighbors.num_owned() as u64).collect();
        let bonds = self.neighbors.bond_distribution(ids).expect("bond map");
        self.data.set_scalar_map(Arc::new(Distribution::serial(n, 1))).expect("scalar map");
        self.data.set_vector3d_map(Arc::new(Distribution::serial(n, 3))).expect("vector map");
        self.data.set_bond_map(Arc::new(bonds));
        self.data.allocate_data(vars.field_specs()).expect("allocate variables");
        self.variables = vars.clone();
        self
    }

    pub fn num_nodes(&self) -> usize {
        self.cell_volume.len()
    }

    /// Set every node's displacement to `f(reference position)`.
    pub fn displace(&mut self, f: impl Fn([f64; 3]) -> [f64; 3]) {
        for i in 0..self.num_nodes() {
            let x = [
                self.reference[3 * i],
                self.reference[3 * i + 1],
                self.reference[3 * i + 2],
            ];
            self.displacement[3 * i..3 * i + 3].copy_from_slice(&f(x));
        }
    }

    /// Force on node `i`.
    pub fn force_on(&self, i: usize) -> [f64; 3] {
        [self.force[3 * i], self.force[3 * i + 1], self.force[3 * i + 2]]
    }

    /// Sum of all nodal forces.
    pub fn net_force(&self) -> [f64; 3] {
        let mut net = [0.0; 3];
        for (c, f) in self.force.iter().enumerate() {
            net[c % 3] += f;
        }
        net
    }

    fn spec(&self, name: &str) -> FieldSpec {
        self.data
            .field_specs()
            .iter()
            .find(|s| s.name() == name)
            .cloned()
            .unwrap_or_else(|| panic!("no variable named '{name}'"))
    }

    /// Variable `name` as last written: `N+1` if stateful.
    pub fn current(&self, name: &str) -> &[f64] {
        let spec = self.spec(name);
        let step = if spec.is_stateful() { FieldStep::Np1 } else { FieldStep::None };
        self.data.get_data(&spec, step).expect("variable storage")
    }

    /// Variable `name` at the last accepted step: `N` if stateful.
    pub fn previous(&self, name: &str) -> &[f64] {
        let spec = self.spec(name);
        let step = if spec.is_stateful() { FieldStep::N } else { FieldStep::None };
        self.data.get_data(&spec, step).expect("variable storage")
    }

    /// Value of variable `name` at node or bond slot `i`, as last written.
    pub fn current_at(&self, name: &str, i: usize) -> f64 {
        self.current(name)[i]
    }

    /// Accept the step: `N+1` becomes `N`.
    pub fn commit(&mut self) {
        self.data.update_state();
    }

    /// Borrow everything as a material context.
    ///
    /// Variables are handed over as `DataManager` views, so stateful ones
    /// read `N` and write `N+1`.
    pub fn ctx(&mut self) -> MaterialContext<'_> {
        let views = self
            .data
            .field_views(&self.variables.field_specs())
            .expect("variable views");
        let buffers = Buffers::from_views(
            views,
            &self.variables,
            &mut self.bond_damage,
            &mut self.force,
        )
        .expect("views match registry");
        MaterialContext::new(
            Kinematics {
                reference: &self.reference,
                displacement: &self.displacement,
                velocity: &self.velocity,
                cell_volume: &self.cell_volume,
                dt: self.dt,
            },
            Topology {
                owned_ids: &self.owned_ids,
                neighbors: &self.neighbors,
            },
            buffers,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peri_core::FieldTemporal::{Stateful, Stateless};

    #[test]
    fn two_node_body_has_one_bond_each_way() {
        let body = Body::two_node(0.001, 1.0e-9);
        assert_eq!(body.num_nodes(), 2);
        assert_eq!(body.neighbors.num_bonds(), 2);
        assert_eq!(body.bond_damage.len(), 2);
    }

    #[test]
    fn lattice_neighbours_are_symmetric() {
        let body = Body::cubic_lattice(3, 1.0, 1.5);
        assert_eq!(body.num_nodes(), 27);
        for k in 0..body.num_nodes() {
            for &j in body.neighbors.neighbors(k) {
                assert!(body.neighbors.neighbors(j).contains(&k));
            }
        }
        // Corner node: 3 faces + 3 edge diagonals.
        assert_eq!(body.neighbors.neighbors(0).len(), 6);
    }

    #[test]
    fn context_of_sized_body_validates() {
        let mut vars = ConstitutiveVariables::new();
        vars.add_scalar(Stateless, "weighted_volume");
        vars.add_scalar(Stateful, "dilatation");
        vars.add_bond(Stateful, "plastic_extension");
        let mut body = Body::cubic_lattice(2, 1.0, 1.8).with_variables(&vars);
        assert_eq!(body.ctx().validate(&vars), Ok(()));
        assert_eq!(body.current("plastic_extension").len(), body.neighbors.num_bonds());
    }

    #[test]
    fn commit_promotes_written_values() {
        let mut vars = ConstitutiveVariables::new();
        vars.add_scalar(Stateful, "dilatation");
        let mut body = Body::two_node(1.0, 1.0).with_variables(&vars);
        body.ctx().buffers.scalar[0].current_mut().fill(0.5);
        assert_eq!(body.previous("dilatation"), &[0.0, 0.0]);
        body.commit();
        assert_eq!(body.previous("dilatation"), &[0.5, 0.5]);
    }
}
