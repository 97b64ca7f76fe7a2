//! Free/restrained DOF partition and system reduction

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::model::Structure;
use crate::sparse::SparseMatrixBuilder;

/// Split of the global DOF set by support flags.
pub struct Partition {
    /// Global indices of unrestrained DOFs, ascending
    pub free: Vec<usize>,
    /// Global indices of restrained DOFs, ascending
    pub restrained: Vec<usize>,
}

impl Partition {
    /// Partition DOFs from the nodes' support flags, in node insertion order.
    ///
    /// Each rotational flag restrains its global-axis rotation independently,
    /// exactly as the translational flags do; partially fixed rotations are
    /// no special case.
    pub fn from_structure(structure: &Structure) -> Self {
        let mut free = Vec::new();
        let mut restrained = Vec::new();

        for (index, node) in structure.nodes.iter().enumerate() {
            let base = index * 6;
            for (offset, flag) in node.supports.as_array().into_iter().enumerate() {
                if flag {
                    restrained.push(base + offset);
                } else {
                    free.push(base + offset);
                }
            }
        }

        Self { free, restrained }
    }
}

/// Storage of the reduced stiffness matrix, chosen by configuration.
pub enum ReducedMatrix {
    Dense(DMatrix<f64>),
    Sparse(CsrMatrix<f64>),
}

/// The free-DOF system `K_ff · u_f = F_f`.
pub struct ReducedSystem {
    pub matrix: ReducedMatrix,
    pub rhs: DVector<f64>,
    /// Global index of each reduced row, for expanding the solution
    pub free: Vec<usize>,
}

impl ReducedSystem {
    pub fn num_free(&self) -> usize {
        self.free.len()
    }
}

/// Reduce the assembled system to the free DOFs.
///
/// Restrained DOFs are fixed at zero, so their columns drop without a
/// right-hand-side correction. Loads applied to restrained DOFs flow into
/// reactions, not into the solve.
pub fn reduce(
    stiffness: &SparseMatrixBuilder,
    loads: &DVector<f64>,
    partition: &Partition,
    sparse: bool,
) -> ReducedSystem {
    let n_dofs = stiffness.size();
    let n_free = partition.free.len();

    // Global DOF -> reduced slot
    let mut slot_of = vec![usize::MAX; n_dofs];
    for (slot, &dof) in partition.free.iter().enumerate() {
        slot_of[dof] = slot;
    }

    let mut rhs = DVector::zeros(n_free);
    for (slot, &dof) in partition.free.iter().enumerate() {
        rhs[slot] = loads[dof];
    }

    let matrix = if sparse {
        let mut coo = CooMatrix::new(n_free, n_free);
        for &(row, col, value) in stiffness.triplets() {
            let (r, c) = (slot_of[row], slot_of[col]);
            if r != usize::MAX && c != usize::MAX {
                coo.push(r, c, value);
            }
        }
        ReducedMatrix::Sparse(CsrMatrix::from(&coo))
    } else {
        let mut dense = DMatrix::zeros(n_free, n_free);
        for &(row, col, value) in stiffness.triplets() {
            let (r, c) = (slot_of[row], slot_of[col]);
            if r != usize::MAX && c != usize::MAX {
                dense[(r, c)] += value;
            }
        }
        ReducedMatrix::Dense(dense)
    };

    ReducedSystem {
        matrix,
        rhs,
        free: partition.free.clone(),
    }
}

/// Scatter the free-DOF solution back into a full displacement vector,
/// with restrained entries exactly zero.
pub fn expand_displacements(u_free: &DVector<f64>, free: &[usize], n_dofs: usize) -> DVector<f64> {
    let mut full = DVector::zeros(n_dofs);
    for (slot, &dof) in free.iter().enumerate() {
        full[dof] = u_free[slot];
    }
    full
}
