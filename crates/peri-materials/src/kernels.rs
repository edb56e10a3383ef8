//! Shared bond kernels for state-based materials.
//!
//! Every law in this crate walks the same owned-node/bond loop and needs
//! the same reference-configuration reductions (weighted volume,
//! dilatation, nodal damage). Centralised here so the laws differ only in
//! their force state.
//!
//! All kernels use a unit influence function.

use peri_core::{FieldTemporal, FieldView};
use peri_material::{BondGeometry, DamageModel, Kinematics, MaterialError, Topology};

/// One bond seen from its owning node.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Bond {
    /// Local id of the owning node.
    pub node: usize,
    /// Local id of the neighbour.
    pub neighbor: usize,
    /// Slot in bond-shaped buffers.
    pub slot: usize,
    pub reference_length: f64,
    pub deformed_length: f64,
    /// Unit vector from `node` to `neighbor` in the current configuration;
    /// zero when the deformed length is zero.
    pub direction: [f64; 3],
}

impl Bond {
    /// Extension `|Y| - |ξ|`.
    pub fn extension(&self) -> f64 {
        self.deformed_length - self.reference_length
    }

    pub fn geometry(&self) -> BondGeometry {
        BondGeometry {
            reference_length: self.reference_length,
            deformed_length: self.deformed_length,
        }
    }
}

pub(crate) fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn bond(
    kin: &Kinematics<'_>,
    node: usize,
    neighbor: usize,
    slot: usize,
) -> Result<Bond, MaterialError> {
    let (xi, xj) = (kin.reference_position(node), kin.reference_position(neighbor));
    let (yi, yj) = (kin.current_position(node), kin.current_position(neighbor));
    let xi_vec = [xj[0] - xi[0], xj[1] - xi[1], xj[2] - xi[2]];
    let y_vec = [yj[0] - yi[0], yj[1] - yi[1], yj[2] - yi[2]];
    let reference_length = norm(xi_vec);
    if reference_length == 0.0 {
        return Err(MaterialError::ZeroBondLength { node, neighbor });
    }
    let deformed_length = norm(y_vec);
    let direction = if deformed_length > 0.0 {
        [
            y_vec[0] / deformed_length,
            y_vec[1] / deformed_length,
            y_vec[2] / deformed_length,
        ]
    } else {
        [0.0; 3]
    };
    Ok(Bond {
        node,
        neighbor,
        slot,
        reference_length,
        deformed_length,
        direction,
    })
}

/// Visit every owned node with the bonds it owns, in neighbour-list order.
///
/// `f` receives the node's local id and its bonds. Bond construction fails
/// on coincident reference positions.
pub(crate) fn for_each_node<F>(
    kin: &Kinematics<'_>,
    topo: &Topology<'_>,
    mut f: F,
) -> Result<(), MaterialError>
where
    F: FnMut(usize, &[Bond]) -> Result<(), MaterialError>,
{
    let mut bonds = Vec::new();
    for (_, node, neighbors, first) in topo.iter() {
        bonds.clear();
        for (b, &j) in neighbors.iter().enumerate() {
            bonds.push(bond(kin, node, j, first + b)?);
        }
        f(node, &bonds)?;
    }
    Ok(())
}

/// Survival factor of `bond`; `1.0` without a damage model.
pub(crate) fn survival(damage: Option<&dyn DamageModel>, bond_damage: &[f64], bond: &Bond) -> f64 {
    match damage {
        Some(model) => model.survival_factor(bond_damage[bond.slot], &bond.geometry()),
        None => 1.0,
    }
}

/// Add `t · M` to the owning node scaled by the neighbour's volume, and
/// the reaction to the neighbour scaled by the owner's volume.
pub(crate) fn apply_pair_force(force: &mut [f64], cell_volume: &[f64], bond: &Bond, t: f64) {
    let (i, j) = (bond.node, bond.neighbor);
    for c in 0..3 {
        let fc = t * bond.direction[c];
        force[3 * i + c] += fc * cell_volume[j];
        force[3 * j + c] -= fc * cell_volume[i];
    }
}

/// The first `N` views of a variable family, to destructure disjointly.
///
/// Fails with a size error if fewer than `N` views were handed over.
pub(crate) fn views<'s, 'v, const N: usize>(
    views: &'s mut [FieldView<'v>],
    buffer: &'static str,
) -> Result<&'s mut [FieldView<'v>; N], MaterialError> {
    let actual = views.len();
    views
        .get_mut(..N)
        .and_then(|head| head.try_into().ok())
        .ok_or(MaterialError::BufferSize {
            buffer,
            expected: N,
            actual,
        })
}

/// `(N, N+1)` of the stateful variable `name`.
pub(crate) fn stateful<'s>(
    view: &'s mut FieldView<'_>,
    name: &str,
) -> Result<(&'s [f64], &'s mut [f64]), MaterialError> {
    view.split_mut().ok_or_else(|| MaterialError::TemporalMismatch {
        name: name.to_string(),
        expected: FieldTemporal::Stateful,
    })
}

/// Weighted volume `m_i = Σ |ξ|² V_j` of every owned node.
///
/// Returns the number of owned nodes with zero weighted volume.
pub(crate) fn weighted_volume(
    kin: &Kinematics<'_>,
    topo: &Topology<'_>,
    out: &mut [f64],
) -> Result<usize, MaterialError> {
    let mut isolated = 0;
    for_each_node(kin, topo, |i, bonds| {
        let m: f64 = bonds
            .iter()
            .map(|b| b.reference_length * b.reference_length * kin.cell_volume[b.neighbor])
            .sum();
        if m == 0.0 {
            isolated += 1;
        }
        out[i] = m;
        Ok(())
    })?;
    Ok(isolated)
}

/// Dilatation `θ_i = 3/m_i Σ s |ξ| e V_j` of every owned node.
///
/// Nodes with zero weighted volume get `θ = 0`.
pub(crate) fn dilatation(
    kin: &Kinematics<'_>,
    topo: &Topology<'_>,
    damage: Option<&dyn DamageModel>,
    bond_damage: &[f64],
    weighted_volume: &[f64],
    out: &mut [f64],
) -> Result<(), MaterialError> {
    for_each_node(kin, topo, |i, bonds| {
        let m = weighted_volume[i];
        out[i] = if m > 0.0 {
            let sum: f64 = bonds
                .iter()
                .map(|b| {
                    survival(damage, bond_damage, b)
                        * b.reference_length
                        * b.extension()
                        * kin.cell_volume[b.neighbor]
                })
                .sum();
            3.0 * sum / m
        } else {
            0.0
        };
        Ok(())
    })
}

/// Volume-weighted fraction of broken bonds at every owned node.
pub(crate) fn nodal_damage(
    kin: &Kinematics<'_>,
    topo: &Topology<'_>,
    bond_damage: &[f64],
    out: &mut [f64],
) -> Result<(), MaterialError> {
    for (_, node, neighbors, first) in topo.iter() {
        let mut broken = 0.0;
        let mut total = 0.0;
        for (b, &j) in neighbors.iter().enumerate() {
            let v = kin.cell_volume[j];
            broken += bond_damage[first + b].clamp(0.0, 1.0) * v;
            total += v;
        }
        out[node] = if total > 0.0 { broken / total } else { 0.0 };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use peri_material::NeighborList;

    fn kin<'a>(x: &'a [f64], u: &'a [f64], vol: &'a [f64]) -> Kinematics<'a> {
        Kinematics {
            reference: x,
            displacement: u,
            velocity: u,
            cell_volume: vol,
            dt: 1.0,
        }
    }

    #[test]
    fn weighted_volume_of_pair() {
        let x = [0.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        let u = [0.0; 6];
        let vol = [3.0, 5.0];
        let nl = NeighborList::from_lists(vec![vec![1], vec![0]]);
        let owned = [0, 1];
        let topo = Topology {
            owned_ids: &owned,
            neighbors: &nl,
        };
        let mut m = [0.0; 2];
        let isolated = weighted_volume(&kin(&x, &u, &vol), &topo, &mut m).unwrap();
        assert_eq!(isolated, 0);
        assert_eq!(m, [4.0 * 5.0, 4.0 * 3.0]);
    }

    #[test]
    fn dilatation_of_stretched_pair() {
        let x = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let u = [0.0, 0.0, 0.0, 0.1, 0.0, 0.0];
        let vol = [1.0, 1.0];
        let nl = NeighborList::from_lists(vec![vec![1], vec![0]]);
        let owned = [0, 1];
        let topo = Topology {
            owned_ids: &owned,
            neighbors: &nl,
        };
        let k = kin(&x, &u, &vol);
        let mut m = [0.0; 2];
        weighted_volume(&k, &topo, &mut m).unwrap();
        let mut theta = [0.0; 2];
        dilatation(&k, &topo, None, &[0.0; 2], &m, &mut theta).unwrap();
        // 3/m * |ξ| e V = 3 * 0.1
        assert!((theta[0] - 0.3).abs() < 1e-12);
        assert!((theta[1] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn coincident_nodes_are_rejected() {
        let x = [0.0; 6];
        let u = [0.0; 6];
        let vol = [1.0, 1.0];
        let nl = NeighborList::from_lists(vec![vec![1], vec![0]]);
        let owned = [0, 1];
        let topo = Topology {
            owned_ids: &owned,
            neighbors: &nl,
        };
        let mut m = [0.0; 2];
        assert_eq!(
            weighted_volume(&kin(&x, &u, &vol), &topo, &mut m),
            Err(MaterialError::ZeroBondLength { node: 0, neighbor: 1 })
        );
    }

    #[test]
    fn pair_force_is_equal_and_opposite_for_equal_volumes() {
        let b = Bond {
            node: 0,
            neighbor: 1,
            slot: 0,
            reference_length: 1.0,
            deformed_length: 1.0,
            direction: [0.6, 0.8, 0.0],
        };
        let mut f = [0.0; 6];
        apply_pair_force(&mut f, &[2.0, 2.0], &b, 10.0);
        assert_eq!(&f[..3], &[12.0, 16.0, 0.0]);
        assert_eq!(&f[3..], &[-12.0, -16.0, 0.0]);
    }

    #[test]
    fn leading_views_split_disjointly() {
        let mut wv = [0.0; 2];
        let (theta_n, mut theta_np1) = ([4.0; 2], [0.0; 2]);
        let mut extra = [0.0; 2];
        let mut family = vec![
            FieldView::Stateless(&mut wv),
            FieldView::Stateful {
                n: &theta_n,
                np1: &mut theta_np1,
            },
            FieldView::Stateless(&mut extra),
        ];
        let [m, theta] = views::<2>(&mut family, "scalar").unwrap();
        m.current_mut().fill(1.0);
        let (old, new) = stateful(theta, "dilatation").unwrap();
        new.copy_from_slice(old);
        assert!(stateful(m, "weighted_volume").is_err());
        drop(family);
        assert_eq!(wv, [1.0, 1.0]);
        assert_eq!(theta_np1, [4.0, 4.0]);
    }

    #[test]
    fn too_few_views_is_size_error() {
        let mut edp = [0.0; 2];
        let mut family = vec![FieldView::Stateless(&mut edp)];
        assert_eq!(
            views::<2>(&mut family, "bond").map(|_| ()),
            Err(MaterialError::BufferSize {
                buffer: "bond",
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn nodal_damage_weights_by_neighbour_volume() {
        let vol = [1.0, 1.0, 3.0];
        let x = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        let u = [0.0; 9];
        let nl = NeighborList::from_lists(vec![vec![1, 2]]);
        let owned = [0];
        let topo = Topology {
            owned_ids: &owned,
            neighbors: &nl,
        };
        let mut out = [0.0; 3];
        nodal_damage(&kin(&x, &u, &vol), &topo, &[0.0, 1.0], &mut out).unwrap();
        assert!((out[0] - 0.75).abs() < 1e-15);
    }
}
