//! Sparse storage and the iterative solve path
//!
//! Frame stiffness matrices are overwhelmingly sparse; COO assembly plus a
//! CSR conjugate-gradient solve bounds memory on large structures.

use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Incremental COO accumulator for the global stiffness matrix.
///
/// Duplicate entries accumulate on conversion, which is exactly what
/// scatter-add assembly needs.
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    pub fn new(size: usize) -> Self {
        // Rough pre-allocation for typical frame connectivity
        Self {
            size,
            entries: Vec::with_capacity(size * 60),
        }
    }

    /// Number of rows/columns
    pub fn size(&self) -> usize {
        self.size
    }

    /// Add a value; exact zeros are skipped.
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Raw accumulated triplets
    pub fn triplets(&self) -> &[(usize, usize, f64)] {
        &self.entries
    }

    /// Accumulated entry count (before duplicate merging)
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Materialize as CSR for the iterative solver
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);
        for &(row, col, value) in &self.entries {
            coo.push(row, col, value);
        }
        CsrMatrix::from(&coo)
    }

    /// Materialize as a dense matrix for the direct solver
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);
        for &(row, col, value) in &self.entries {
            mat[(row, col)] += value;
        }
        mat
    }

    /// Multiply the accumulated matrix by a vector without materializing it.
    pub fn mul_vector(&self, x: &DVector<f64>) -> DVector<f64> {
        let mut y = DVector::zeros(self.size);
        for &(row, col, value) in &self.entries {
            y[row] += value * x[col];
        }
        y
    }
}

/// Outcome of an iterative solve, convergent or not.
pub struct CgOutcome {
    pub solution: DVector<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Solve a symmetric positive-definite sparse system with Jacobi-preconditioned
/// conjugate gradient.
///
/// Convergence is judged on the residual norm relative to `‖b‖`. When the
/// iteration budget runs out the best iterate is returned with
/// `converged = false`; `None` signals a breakdown (the matrix is not SPD).
pub fn solve_pcg(
    csr: &CsrMatrix<f64>,
    b: &DVector<f64>,
    tolerance: f64,
    max_iterations: usize,
) -> Option<CgOutcome> {
    let n = csr.nrows();
    let b_norm = b.norm();
    if b_norm == 0.0 {
        return Some(CgOutcome {
            solution: DVector::zeros(n),
            iterations: 0,
            converged: true,
        });
    }
    let target = tolerance * b_norm;

    // Jacobi (diagonal) preconditioner
    let mut diag = DVector::from_element(n, 1.0);
    for (row, col, &value) in csr.triplet_iter() {
        if row == col && value.abs() > 1e-300 {
            diag[row] = value;
        }
    }

    let mut x = DVector::zeros(n);
    let mut r = b.clone();
    let mut z = r.component_div(&diag);
    let mut p = z.clone();
    let mut r_dot_z = r.dot(&z);

    for iteration in 1..=max_iterations {
        let ap = spmv(csr, &p);
        let p_dot_ap = p.dot(&ap);
        if p_dot_ap.abs() < 1e-300 {
            return None;
        }

        let alpha = r_dot_z / p_dot_ap;
        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);

        if r.norm() < target {
            return Some(CgOutcome {
                solution: x,
                iterations: iteration,
                converged: true,
            });
        }

        z = r.component_div(&diag);
        let r_dot_z_next = r.dot(&z);
        let beta = r_dot_z_next / r_dot_z;
        r_dot_z = r_dot_z_next;
        p = &z + beta * &p;
    }

    Some(CgOutcome {
        solution: x,
        iterations: max_iterations,
        converged: false,
    })
}

/// Sparse matrix-vector product over CSR storage
#[inline]
fn spmv(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    let n = csr.nrows();
    let mut y = DVector::zeros(n);

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    for row in 0..n {
        let mut sum = 0.0;
        for idx in row_offsets[row]..row_offsets[row + 1] {
            sum += values[idx] * x[col_indices[idx]];
        }
        y[row] = sum;
    }

    y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tridiagonal_spd() -> SparseMatrixBuilder {
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 0, 4.0);
        builder.add(0, 1, -1.0);
        builder.add(1, 0, -1.0);
        builder.add(1, 1, 4.0);
        builder.add(1, 2, -1.0);
        builder.add(2, 1, -1.0);
        builder.add(2, 2, 4.0);
        builder
    }

    #[test]
    fn test_builder_accumulates_duplicates() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1.5);
        builder.add(0, 0, 2.5);
        let dense = builder.to_dense();
        assert!((dense[(0, 0)] - 4.0).abs() < 1e-12);

        let csr = builder.to_csr();
        let x = DVector::from_vec(vec![1.0, 0.0]);
        assert!((spmv(&csr, &x)[0] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_pcg_solves_spd_system() {
        let csr = tridiagonal_spd().to_csr();
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let outcome = solve_pcg(&csr, &b, 1e-12, 100).unwrap();
        assert!(outcome.converged);

        let residual = (&spmv(&csr, &outcome.solution) - &b).norm();
        assert!(residual < 1e-8, "residual: {residual}");
    }

    #[test]
    fn test_pcg_zero_rhs_is_exact() {
        let csr = tridiagonal_spd().to_csr();
        let b = DVector::zeros(3);
        let outcome = solve_pcg(&csr, &b, 1e-12, 100).unwrap();
        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.solution.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_pcg_reports_budget_exhaustion() {
        let csr = tridiagonal_spd().to_csr();
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let outcome = solve_pcg(&csr, &b, 1e-14, 1).unwrap();
        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 1);
    }
}
