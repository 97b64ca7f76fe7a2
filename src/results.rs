//! Result types returned by the engine

use serde::{Deserialize, Serialize};

/// Displacement components at a node [m, rad]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDisplacement {
    pub node_id: u32,
    pub ux: f64,
    pub uy: f64,
    pub uz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
}

impl NodeDisplacement {
    /// Largest absolute component
    pub fn max_component(&self) -> f64 {
        [self.ux, self.uy, self.uz, self.rx, self.ry, self.rz]
            .iter()
            .fold(0.0f64, |acc, &v| acc.max(v.abs()))
    }
}

/// Internal forces at an element's start node, in local coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementForces {
    pub element_id: u32,
    /// Axial force, positive in tension (N)
    pub axial: f64,
    pub shear_y: f64,
    pub shear_z: f64,
    pub moment_y: f64,
    pub moment_z: f64,
    pub torsion: f64,
}

/// Stresses and the safety verdict for one element
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStress {
    pub element_id: u32,
    /// N / A (Pa)
    pub axial_stress: f64,
    /// Governing |My| / Sy (Pa)
    pub bending_stress_y: f64,
    /// Governing |Mz| / Sz (Pa)
    pub bending_stress_z: f64,
    /// Signed superposition at the governing extreme fiber (Pa)
    pub combined_stress: f64,
    /// |combined| within yield strength / safety factor; elements without a
    /// yield strength have no criterion and report safe
    pub is_safe: bool,
}

/// Reaction forces at a supported node, in global coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReaction {
    pub node_id: u32,
    pub fx: f64,
    pub fy: f64,
    pub fz: f64,
    pub mx: f64,
    pub my: f64,
    pub mz: f64,
}

/// Timing and solver metadata, captured when profiling is enabled or a
/// solver warning has to be carried
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceInfo {
    pub assembly_time_ms: f64,
    pub solve_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convergence_warning: Option<String>,
}

/// Complete outcome of one analysis invocation.
///
/// The engine always returns one of these; malformed structural input
/// surfaces through `is_valid = false` and `diagnostics`, never a panic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Per-node displacements, in node input order
    pub displacements: Vec<NodeDisplacement>,
    /// Per-element internal forces, in element input order (failed elements
    /// are absent, surviving ones still report)
    pub forces: Vec<ElementForces>,
    /// Per-element stresses and safety verdicts, matching `forces`
    pub stresses: Vec<ElementStress>,
    /// Reactions at supported nodes, in node input order
    pub reactions: Vec<NodeReaction>,
    pub is_valid: bool,
    /// Largest absolute displacement component across all nodes
    pub max_displacement: f64,
    /// Largest absolute combined stress across all elements
    pub max_stress: f64,
    /// One message per problem encountered; empty when `is_valid`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceInfo>,
}

impl AnalysisResult {
    /// Valid result for a structure with nothing in it
    pub fn empty() -> Self {
        Self {
            displacements: Vec::new(),
            forces: Vec::new(),
            stresses: Vec::new(),
            reactions: Vec::new(),
            is_valid: true,
            max_displacement: 0.0,
            max_stress: 0.0,
            diagnostics: Vec::new(),
            performance: None,
        }
    }

    /// Invalid result carrying only diagnostics, for failures that occur
    /// before any numeric output exists
    pub fn failed(diagnostics: Vec<String>) -> Self {
        Self {
            is_valid: false,
            diagnostics,
            ..Self::empty()
        }
    }
}
