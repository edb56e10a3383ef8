//! Per-call context passed to material models.
//!
//! [`MaterialContext`] splits the call's inputs into three parts so a
//! material can hold shared borrows of the kinematics and topology while
//! writing the constitutive buffers:
//!
//! - **[`Kinematics`]**: reference positions, displacements, velocities,
//!   cell volumes, and `dt`. Read-only.
//! - **[`Topology`]**: owned-node ids and their neighbour lists. Read-only.
//! - **[`Buffers`]**: bond damage, views of the constitutive variables,
//!   and the accumulated force. Mutable.
//!
//! A context borrows everything for the duration of one call; materials
//! must not keep references past it, since the driver rotates the
//! underlying storage between steps. The variable views are usually the
//! output of `DataManager::field_views(&material.field_specs())`, split by
//! [`Buffers::from_views`].

use peri_core::FieldView;

use crate::error::MaterialError;
use crate::neighbor::NeighborList;
use crate::variables::{ConstitutiveVariables, VariableKind};

/// Read-only kinematic and geometric inputs, indexed by local node id.
///
/// Vector quantities are interleaved `[x0, y0, z0, x1, y1, z1, ...]`.
#[derive(Clone, Copy, Debug)]
pub struct Kinematics<'a> {
    /// Reference (undeformed) positions.
    pub reference: &'a [f64],
    /// Displacements from the reference configuration.
    pub displacement: &'a [f64],
    /// Velocities.
    pub velocity: &'a [f64],
    /// Volume associated with each node.
    pub cell_volume: &'a [f64],
    /// Timestep.
    pub dt: f64,
}

impl Kinematics<'_> {
    /// Number of local nodes (owned plus ghost).
    pub fn num_nodes(&self) -> usize {
        self.cell_volume.len()
    }

    /// Reference position of node `i`.
    pub fn reference_position(&self, i: usize) -> [f64; 3] {
        [
            self.reference[3 * i],
            self.reference[3 * i + 1],
            self.reference[3 * i + 2],
        ]
    }

    /// Current (deformed) position of node `i`.
    pub fn current_position(&self, i: usize) -> [f64; 3] {
        [
            self.reference[3 * i] + self.displacement[3 * i],
            self.reference[3 * i + 1] + self.displacement[3 * i + 1],
            self.reference[3 * i + 2] + self.displacement[3 * i + 2],
        ]
    }
}

/// Owned nodes and their neighbourhoods.
#[derive(Clone, Copy, Debug)]
pub struct Topology<'a> {
    /// Local ids of owned nodes; entry `k` pairs with `neighbors.neighbors(k)`.
    pub owned_ids: &'a [usize],
    /// Neighbour list of the owned nodes.
    pub neighbors: &'a NeighborList,
}

impl Topology<'_> {
    /// Iterate `(owned position, local id, neighbour ids, first bond slot)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &[usize], usize)> + '_ {
        self.owned_ids.iter().enumerate().map(move |(k, &id)| {
            let range = self.neighbors.bond_range(k);
            (k, id, self.neighbors.neighbors(k), range.start)
        })
    }
}

/// Mutable per-call outputs and internal state.
///
/// Variable views are in registration order within each family. A
/// stateless view is read and written in place; a stateful view is read at
/// `N` and written at `N+1`.
#[derive(Debug)]
pub struct Buffers<'a> {
    /// Damage state per bond (0 intact, 1 broken), in bond-slot order.
    pub bond_damage: &'a mut [f64],
    /// One view per registered scalar variable, one value per node.
    pub scalar: Vec<FieldView<'a>>,
    /// One view per registered vector variable, three values per node.
    pub vector: Vec<FieldView<'a>>,
    /// One view per registered bond variable, one value per bond slot.
    pub bond: Vec<FieldView<'a>>,
    /// Accumulated force density per node. Materials add to it.
    pub force: &'a mut [f64],
}

impl<'a> Buffers<'a> {
    /// Split `views`, given in [`ConstitutiveVariables::field_specs`] order,
    /// into the scalar, vector, and bond families of `vars`.
    pub fn from_views(
        views: Vec<FieldView<'a>>,
        vars: &ConstitutiveVariables,
        bond_damage: &'a mut [f64],
        force: &'a mut [f64],
    ) -> Result<Self, MaterialError> {
        let counts = [VariableKind::Scalar, VariableKind::Vector, VariableKind::Bond]
            .map(|kind| vars.count(kind));
        expect_len("views", views.len(), counts.iter().sum())?;

        let mut views = views.into_iter();
        let [scalar, vector, bond]: [Vec<FieldView<'a>>; 3] =
            counts.map(|count| views.by_ref().take(count).collect());
        Ok(Self {
            bond_damage,
            scalar,
            vector,
            bond,
            force,
        })
    }
}

/// Everything a material needs for one call.
#[derive(Debug)]
pub struct MaterialContext<'a> {
    /// Read-only kinematics.
    pub kinematics: Kinematics<'a>,
    /// Owned nodes and neighbourhoods.
    pub topology: Topology<'a>,
    /// Mutable outputs.
    pub buffers: Buffers<'a>,
}

impl<'a> MaterialContext<'a> {
    /// Assemble a context from its parts.
    pub fn new(kinematics: Kinematics<'a>, topology: Topology<'a>, buffers: Buffers<'a>) -> Self {
        Self {
            kinematics,
            topology,
            buffers,
        }
    }

    /// Check every extent against the node count, the neighbour list, and
    /// the material's variable registry.
    ///
    /// Materials call this on entry to each operation so a mis-sized
    /// buffer surfaces as [`MaterialError::BufferSize`] rather than a panic
    /// mid-loop. A view whose temporal class differs from the registered
    /// variable's is [`MaterialError::TemporalMismatch`].
    pub fn validate(&self, vars: &ConstitutiveVariables) -> Result<(), MaterialError> {
        let kin = &self.kinematics;
        let n = kin.num_nodes();
        let bonds = self.topology.neighbors.num_bonds();

        expect_len("reference", kin.reference.len(), 3 * n)?;
        expect_len("displacement", kin.displacement.len(), 3 * n)?;
        expect_len("velocity", kin.velocity.len(), 3 * n)?;
        expect_len("force", self.buffers.force.len(), 3 * n)?;
        expect_len("bond_damage", self.buffers.bond_damage.len(), bonds)?;
        expect_views("scalar", &self.buffers.scalar, vars, VariableKind::Scalar, n)?;
        expect_views("vector", &self.buffers.vector, vars, VariableKind::Vector, 3 * n)?;
        expect_views("bond", &self.buffers.bond, vars, VariableKind::Bond, bonds)?;

        let owned = self.topology.owned_ids.len();
        if owned != self.topology.neighbors.num_owned() {
            return Err(MaterialError::TopologyMismatch {
                owned_ids: owned,
                neighborhoods: self.topology.neighbors.num_owned(),
            });
        }
        let ids = self
            .topology
            .owned_ids
            .iter()
            .chain(self.topology.neighbors.all_neighbors());
        for &id in ids {
            if id >= n {
                return Err(MaterialError::NeighborOutOfRange { id, num_nodes: n });
            }
        }
        Ok(())
    }
}

fn expect_len(buffer: &'static str, actual: usize, expected: usize) -> Result<(), MaterialError> {
    if actual == expected {
        Ok(())
    } else {
        Err(MaterialError::BufferSize {
            buffer,
            expected,
            actual,
        })
    }
}

fn expect_views(
    buffer: &'static str,
    views: &[FieldView<'_>],
    vars: &ConstitutiveVariables,
    kind: VariableKind,
    len: usize,
) -> Result<(), MaterialError> {
    expect_len(buffer, views.len(), vars.count(kind))?;
    for (pos, view) in views.iter().enumerate() {
        let expected = vars.temporal(kind, pos)?;
        if view.temporal() != expected {
            return Err(MaterialError::TemporalMismatch {
                name: vars.name(kind, pos)?.to_string(),
                expected,
            });
        }
        expect_len(buffer, view.current().len(), len)?;
        expect_len(buffer, view.previous().len(), len)?;
    }
    Ok(())
}
