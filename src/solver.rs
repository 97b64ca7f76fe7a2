//! Interchangeable linear solve strategies

use log::warn;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

use crate::boundary::{ReducedMatrix, ReducedSystem};
use crate::config::AnalysisConfig;
use crate::error::{EngineError, EngineResult};
use crate::math;
use crate::sparse;

/// Result of a solve attempt that did not hard-fail.
#[derive(Debug)]
pub struct SolveOutcome {
    /// Free-DOF displacement vector
    pub displacements: DVector<f64>,
    /// Iteration count, for the iterative strategy
    pub iterations: Option<usize>,
    /// Set when the result is a best-effort estimate rather than a
    /// converged solution
    pub warning: Option<String>,
}

/// A strategy for solving `K_ff · u_f = F_f`.
///
/// Both implementations must agree within a small numeric tolerance on any
/// system they can both solve; the integration tests cross-validate this.
pub trait LinearSolver {
    fn name(&self) -> &'static str;
    fn solve(&self, system: &ReducedSystem) -> EngineResult<SolveOutcome>;
}

/// Pick the strategy selected by the configuration.
pub fn for_config(config: &AnalysisConfig) -> Box<dyn LinearSolver> {
    if config.use_conjugate_gradient {
        Box::new(ConjugateGradientSolver {
            tolerance: config.convergence_tolerance,
            max_iterations: config.max_iterations,
        })
    } else {
        Box::new(DirectSolver)
    }
}

/// Dense LU elimination; deterministic and exact to floating precision.
pub struct DirectSolver;

impl LinearSolver for DirectSolver {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn solve(&self, system: &ReducedSystem) -> EngineResult<SolveOutcome> {
        let matrix = match &system.matrix {
            ReducedMatrix::Dense(m) => m.clone(),
            ReducedMatrix::Sparse(csr) => densify(csr),
        };

        let displacements =
            math::solve_dense(matrix, &system.rhs).ok_or(EngineError::SingularMatrix)?;

        Ok(SolveOutcome {
            displacements,
            iterations: None,
            warning: None,
        })
    }
}

/// Jacobi-preconditioned conjugate gradient over sparse storage.
///
/// Non-convergence within the iteration budget degrades to the best
/// iterate plus a warning; it is never a hard failure.
pub struct ConjugateGradientSolver {
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl LinearSolver for ConjugateGradientSolver {
    fn name(&self) -> &'static str {
        "conjugate-gradient"
    }

    fn solve(&self, system: &ReducedSystem) -> EngineResult<SolveOutcome> {
        let owned;
        let csr = match &system.matrix {
            ReducedMatrix::Sparse(csr) => csr,
            ReducedMatrix::Dense(m) => {
                owned = sparsify(m);
                &owned
            }
        };

        let outcome = sparse::solve_pcg(csr, &system.rhs, self.tolerance, self.max_iterations)
            .ok_or(EngineError::SingularMatrix)?;

        let warning = if outcome.converged {
            None
        } else {
            let message = format!(
                "conjugate gradient stopped after {} iterations with residual above tolerance {}",
                outcome.iterations, self.tolerance
            );
            warn!("{message}");
            Some(message)
        };

        Ok(SolveOutcome {
            displacements: outcome.solution,
            iterations: Some(outcome.iterations),
            warning,
        })
    }
}

fn densify(csr: &CsrMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(csr.nrows(), csr.ncols());
    for (row, col, &value) in csr.triplet_iter() {
        dense[(row, col)] += value;
    }
    dense
}

fn sparsify(dense: &DMatrix<f64>) -> CsrMatrix<f64> {
    let mut coo = nalgebra_sparse::CooMatrix::new(dense.nrows(), dense.ncols());
    for row in 0..dense.nrows() {
        for col in 0..dense.ncols() {
            let value = dense[(row, col)];
            if value != 0.0 {
                coo.push(row, col, value);
            }
        }
    }
    CsrMatrix::from(&coo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::SparseMatrixBuilder;
    use approx::assert_relative_eq;

    fn spd_system(sparse_storage: bool) -> ReducedSystem {
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 0, 4.0);
        builder.add(0, 1, -1.0);
        builder.add(1, 0, -1.0);
        builder.add(1, 1, 4.0);
        builder.add(1, 2, -1.0);
        builder.add(2, 1, -1.0);
        builder.add(2, 2, 4.0);

        let matrix = if sparse_storage {
            ReducedMatrix::Sparse(builder.to_csr())
        } else {
            ReducedMatrix::Dense(builder.to_dense())
        };

        ReducedSystem {
            matrix,
            rhs: DVector::from_vec(vec![1.0, 2.0, 3.0]),
            free: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_strategies_agree() {
        let direct = DirectSolver.solve(&spd_system(false)).unwrap();
        let cg = ConjugateGradientSolver {
            tolerance: 1e-12,
            max_iterations: 100,
        }
        .solve(&spd_system(true))
        .unwrap();

        for i in 0..3 {
            assert_relative_eq!(
                direct.displacements[i],
                cg.displacements[i],
                epsilon = 1e-8
            );
        }
        assert!(cg.warning.is_none());
    }

    #[test]
    fn test_each_strategy_handles_either_storage() {
        assert!(DirectSolver.solve(&spd_system(true)).is_ok());
        let cg = ConjugateGradientSolver {
            tolerance: 1e-10,
            max_iterations: 100,
        };
        assert!(cg.solve(&spd_system(false)).is_ok());
    }

    #[test]
    fn test_singular_matrix_is_reported() {
        let system = ReducedSystem {
            matrix: ReducedMatrix::Dense(DMatrix::zeros(2, 2)),
            rhs: DVector::from_vec(vec![1.0, 1.0]),
            free: vec![0, 1],
        };
        assert_eq!(
            DirectSolver.solve(&system).unwrap_err(),
            EngineError::SingularMatrix
        );
    }

    #[test]
    fn test_budget_exhaustion_degrades_to_warning() {
        let solver = ConjugateGradientSolver {
            tolerance: 1e-15,
            max_iterations: 1,
        };
        let outcome = solver.solve(&spd_system(true)).unwrap();
        assert!(outcome.warning.is_some());
        assert_eq!(outcome.iterations, Some(1));
    }
}
