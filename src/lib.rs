//! Frame Engine - a direct-stiffness finite element engine for 3D frames
//!
//! The engine assembles per-element beam stiffness into a global system,
//! reduces it by the support conditions, solves for the unknown
//! displacements with a dense-direct or sparse-iterative strategy, and
//! recovers element forces, stresses, and a per-element safety verdict.
//! One call, one owned set of matrices, no shared state: malformed input
//! comes back as an invalid result with diagnostics, never a panic.
//!
//! ## Example
//! ```rust
//! use frame_engine::prelude::*;
//!
//! let structure = Structure {
//!     nodes: vec![
//!         Node::fixed(1, 0.0, 0.0, 0.0),
//!         Node::new(2, 4.0, 0.0, 0.0),
//!     ],
//!     elements: vec![Element::new(
//!         1,
//!         ElementKind::Beam,
//!         [1, 2],
//!         Material::steel(),
//!         Section::rectangular(0.2, 0.4),
//!     )],
//!     loads: vec![Load::point(2, LoadAxis::Y, -10_000.0)],
//! };
//!
//! let result = analyze(&structure, &AnalysisConfig::default());
//! assert!(result.is_valid);
//! assert!(result.displacements[1].uy < 0.0);
//! ```

pub mod assembly;
pub mod boundary;
pub mod config;
pub mod engine;
pub mod error;
pub mod math;
pub mod model;
pub mod postprocess;
pub mod results;
pub mod section;
pub mod solver;
pub mod sparse;

pub use engine::analyze;

// Re-export common types
pub mod prelude {
    pub use crate::config::AnalysisConfig;
    pub use crate::engine::analyze;
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::model::{
        Element, ElementKind, Load, LoadAxis, Material, Node, Structure, Supports,
    };
    pub use crate::results::{
        AnalysisResult, ElementForces, ElementStress, NodeDisplacement, NodeReaction,
        PerformanceInfo,
    };
    pub use crate::section::{Section, SectionKind, SectionProperties};
}
