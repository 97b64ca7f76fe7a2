//! Analysis configuration

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Node count above which `memory_optimization` switches the assembled
/// stiffness matrix to sparse storage.
pub const SPARSE_NODE_THRESHOLD: usize = 100;

/// Configuration for a single analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    /// Force sparse storage for the global stiffness matrix
    pub use_sparse_matrices: bool,
    /// Solve with preconditioned conjugate gradient instead of dense elimination
    pub use_conjugate_gradient: bool,
    /// Switch to sparse storage automatically above [`SPARSE_NODE_THRESHOLD`] nodes
    pub memory_optimization: bool,
    /// Record assembly/solve timings on the result
    pub enable_profiling: bool,
    /// Relative residual tolerance for the iterative solver
    pub convergence_tolerance: f64,
    /// Iteration budget for the iterative solver
    pub max_iterations: usize,
    /// Divisor applied to yield strength for the allowable-stress check
    pub safety_factor: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            use_sparse_matrices: false,
            use_conjugate_gradient: false,
            memory_optimization: false,
            enable_profiling: false,
            convergence_tolerance: 1e-10,
            max_iterations: 1000,
            safety_factor: 1.67,
        }
    }
}

impl AnalysisConfig {
    /// Configuration for the sparse/iterative large-structure path
    pub fn iterative() -> Self {
        Self {
            use_sparse_matrices: true,
            use_conjugate_gradient: true,
            ..Self::default()
        }
    }

    /// Set the iterative solver tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.convergence_tolerance = tol;
        self
    }

    /// Set the iterative solver iteration budget
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self {
        self.max_iterations = max_iter;
        self
    }

    /// Set the allowable-stress safety factor
    pub fn with_safety_factor(mut self, factor: f64) -> Self {
        self.safety_factor = factor;
        self
    }

    /// Enable timing capture
    pub fn with_profiling(mut self) -> Self {
        self.enable_profiling = true;
        self
    }

    /// Reject inconsistent settings before any numeric work starts.
    pub fn validate(&self) -> EngineResult<()> {
        if !self.convergence_tolerance.is_finite() || self.convergence_tolerance <= 0.0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "convergence tolerance must be positive, got {}",
                self.convergence_tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(EngineError::InvalidConfiguration(
                "max iterations must be at least 1".to_string(),
            ));
        }
        if !self.safety_factor.is_finite() || self.safety_factor <= 0.0 {
            return Err(EngineError::InvalidConfiguration(format!(
                "safety factor must be positive, got {}",
                self.safety_factor
            )));
        }
        Ok(())
    }

    /// Whether the global matrix should be kept in sparse storage.
    pub(crate) fn wants_sparse(&self, node_count: usize) -> bool {
        self.use_sparse_matrices
            || self.use_conjugate_gradient
            || (self.memory_optimization && node_count >= SPARSE_NODE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let config = AnalysisConfig::default().with_tolerance(-1e-6);
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let config = AnalysisConfig::default().with_max_iterations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sparse_selection() {
        let auto = AnalysisConfig {
            memory_optimization: true,
            ..AnalysisConfig::default()
        };
        assert!(!auto.wants_sparse(10));
        assert!(auto.wants_sparse(SPARSE_NODE_THRESHOLD));
        assert!(AnalysisConfig::iterative().wants_sparse(2));
    }
}
