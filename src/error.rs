//! Error types for the frame engine

use thiserror::Error;

/// Error taxonomy for the analysis pipeline.
///
/// Every variant is caught at the `analyze` entry point and converted into
/// diagnostics on the returned result; none escape to the caller as a panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("node {0} not found in structure")]
    NodeNotFound(u32),

    #[error("element {0} has zero length")]
    DegenerateElement(u32),

    #[error("unsupported section: {0}")]
    UnsupportedSection(String),

    #[error("singular stiffness matrix - structure may be unstable or have insufficient supports")]
    SingularMatrix,

    #[error("solver did not converge after {0} iterations")]
    ConvergenceFailed(usize),

    #[error("non-finite value detected in {0}")]
    NumericOverflow(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
