//! Input data model: nodes, materials, elements, loads

use serde::{Deserialize, Serialize};

use crate::section::Section;

/// Poisson's ratio assumed when a material does not specify one.
/// The conventional value for structural steel; only torsion consumes it.
pub const DEFAULT_POISSONS_RATIO: f64 = 0.3;

/// Support flags at a node; `true` means the DOF is restrained to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Supports {
    pub ux: bool,
    pub uy: bool,
    pub uz: bool,
    pub rx: bool,
    pub ry: bool,
    pub rz: bool,
}

impl Supports {
    /// No restraints
    pub fn free() -> Self {
        Self::default()
    }

    /// All six DOFs restrained
    pub fn fixed() -> Self {
        Self {
            ux: true,
            uy: true,
            uz: true,
            rx: true,
            ry: true,
            rz: true,
        }
    }

    /// Translations restrained, rotations free
    pub fn pinned() -> Self {
        Self {
            ux: true,
            uy: true,
            uz: true,
            ..Self::default()
        }
    }

    /// Flags in DOF order [UX, UY, UZ, RX, RY, RZ]
    pub fn as_array(&self) -> [bool; 6] {
        [self.ux, self.uy, self.uz, self.rx, self.ry, self.rz]
    }

    /// Whether any DOF is restrained
    pub fn any(&self) -> bool {
        self.as_array().iter().any(|&r| r)
    }

    /// Number of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.as_array().iter().filter(|&&r| r).count()
    }
}

/// A point in 3D space owning six degrees of freedom
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub supports: Supports,
}

impl Node {
    /// Create an unrestrained node
    pub fn new(id: u32, x: f64, y: f64, z: f64) -> Self {
        Self {
            id,
            x,
            y,
            z,
            supports: Supports::free(),
        }
    }

    /// Create a fully fixed node
    pub fn fixed(id: u32, x: f64, y: f64, z: f64) -> Self {
        Self {
            supports: Supports::fixed(),
            ..Self::new(id, x, y, z)
        }
    }

    /// Attach support flags
    pub fn with_supports(mut self, supports: Supports) -> Self {
        self.supports = supports;
        self
    }

    /// Coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Euclidean distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Material properties for a frame element
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Young's modulus in Pa
    pub elastic_modulus: f64,
    /// Yield strength in Pa, consumed by the safety check when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_strength: Option<f64>,
    /// Poisson's ratio, consumed by the torsion terms when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poissons_ratio: Option<f64>,
}

impl Material {
    /// Material with only a Young's modulus
    pub fn new(elastic_modulus: f64) -> Self {
        Self {
            elastic_modulus,
            yield_strength: None,
            poissons_ratio: None,
        }
    }

    /// Structural steel (E = 200 GPa, fy = 250 MPa, nu = 0.3)
    pub fn steel() -> Self {
        Self {
            elastic_modulus: 200e9,
            yield_strength: Some(250e6),
            poissons_ratio: Some(0.3),
        }
    }

    /// Attach a yield strength
    pub fn with_yield_strength(mut self, fy: f64) -> Self {
        self.yield_strength = Some(fy);
        self
    }

    /// Attach a Poisson's ratio
    pub fn with_poissons_ratio(mut self, nu: f64) -> Self {
        self.poissons_ratio = Some(nu);
        self
    }

    /// Shear modulus G = E / (2 (1 + nu)), with [`DEFAULT_POISSONS_RATIO`]
    /// standing in when no ratio is given.
    pub fn shear_modulus(&self) -> f64 {
        let nu = self.poissons_ratio.unwrap_or(DEFAULT_POISSONS_RATIO);
        self.elastic_modulus / (2.0 * (1.0 + nu))
    }
}

/// Reporting label for an element; the mechanics are identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Beam,
    Column,
}

impl ElementKind {
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Beam => "beam",
            ElementKind::Column => "column",
        }
    }
}

/// A two-node 3D frame element
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: u32,
    pub kind: ElementKind,
    /// Start and end node ids
    pub node_ids: [u32; 2],
    pub material: Material,
    pub section: Section,
}

impl Element {
    pub fn new(
        id: u32,
        kind: ElementKind,
        node_ids: [u32; 2],
        material: Material,
        section: Section,
    ) -> Self {
        Self {
            id,
            kind,
            node_ids,
            material,
            section,
        }
    }
}

/// Global axis a point load acts along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadAxis {
    X,
    Y,
    Z,
    Rx,
    Ry,
    Rz,
}

impl LoadAxis {
    /// Offset of this axis within a node's six-DOF block
    pub fn dof_offset(&self) -> usize {
        match self {
            LoadAxis::X => 0,
            LoadAxis::Y => 1,
            LoadAxis::Z => 2,
            LoadAxis::Rx => 3,
            LoadAxis::Ry => 4,
            LoadAxis::Rz => 5,
        }
    }
}

/// An external load applied to the structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Load {
    /// Signed force or moment applied directly at a node
    #[serde(rename_all = "camelCase")]
    Point {
        node_id: u32,
        axis: LoadAxis,
        magnitude: f64,
    },
}

impl Load {
    /// Create a point load
    pub fn point(node_id: u32, axis: LoadAxis, magnitude: f64) -> Self {
        Load::Point {
            node_id,
            axis,
            magnitude,
        }
    }
}

/// A complete structural model: one per analysis call.
///
/// Collection order is preserved in every output collection, so two calls
/// with the same structure produce identical results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Structure {
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub loads: Vec<Load>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total DOF count (six per node)
    pub fn num_dofs(&self) -> usize {
        self.nodes.len() * 6
    }
}
