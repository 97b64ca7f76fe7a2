//! Cross-section descriptors and derived properties

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Tag selecting how section properties are derived.
///
/// Unrecognized tags deserialize to `Unknown` and fail inside the engine
/// for that element only, instead of aborting deserialization of the
/// whole structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum SectionKind {
    Rectangular,
    Circular,
    #[serde(rename = "i-section")]
    ISection,
    Unknown,
}

impl From<String> for SectionKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "rectangular" => SectionKind::Rectangular,
            "circular" => SectionKind::Circular,
            "i-section" | "explicit" => SectionKind::ISection,
            _ => SectionKind::Unknown,
        }
    }
}

impl SectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::Rectangular => "rectangular",
            SectionKind::Circular => "circular",
            SectionKind::ISection => "i-section",
            SectionKind::Unknown => "unknown",
        }
    }
}

/// Section descriptor as supplied by the caller.
///
/// Rectangular and circular sections carry dimensions; i-section/explicit
/// sections carry area and inertias verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub kind: SectionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moment_of_inertia_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moment_of_inertia_z: Option<f64>,
}

impl Section {
    /// Rectangular section of the given width and height
    pub fn rectangular(width: f64, height: f64) -> Self {
        Self {
            kind: SectionKind::Rectangular,
            width: Some(width),
            height: Some(height),
            area: None,
            moment_of_inertia_y: None,
            moment_of_inertia_z: None,
        }
    }

    /// Circular section of the given diameter
    pub fn circular(diameter: f64) -> Self {
        Self {
            kind: SectionKind::Circular,
            width: Some(diameter),
            height: Some(diameter),
            area: None,
            moment_of_inertia_y: None,
            moment_of_inertia_z: None,
        }
    }

    /// Section with caller-supplied area and inertias
    pub fn explicit(area: f64, iy: f64, iz: f64) -> Self {
        Self {
            kind: SectionKind::ISection,
            width: None,
            height: None,
            area: Some(area),
            moment_of_inertia_y: Some(iy),
            moment_of_inertia_z: Some(iz),
        }
    }

    /// Derive the geometric properties for this descriptor.
    ///
    /// Pure; dispatches on the kind tag. Missing dimensions and unknown
    /// kinds are reported without touching the rest of the structure.
    pub fn properties(&self) -> EngineResult<SectionProperties> {
        match self.kind {
            SectionKind::Rectangular => {
                let (w, h) = self.dimensions("rectangular")?;
                let area = w * h;
                let iy = w * h.powi(3) / 12.0;
                let iz = h * w.powi(3) / 12.0;
                // Thin-rectangle torsion approximation
                let (long, short) = if w > h { (w, h) } else { (h, w) };
                let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);
                Ok(SectionProperties {
                    area,
                    iy,
                    iz,
                    j,
                    sy: iy / (h / 2.0),
                    sz: iz / (w / 2.0),
                })
            }
            SectionKind::Circular => {
                let d = match self.width.or(self.height) {
                    Some(d) if d > 0.0 => d,
                    _ => {
                        return Err(EngineError::UnsupportedSection(
                            "circular section requires a positive diameter".to_string(),
                        ))
                    }
                };
                let r = d / 2.0;
                let area = std::f64::consts::PI * r.powi(2);
                let i = std::f64::consts::PI * r.powi(4) / 4.0;
                let s = std::f64::consts::PI * r.powi(3) / 4.0;
                Ok(SectionProperties {
                    area,
                    iy: i,
                    iz: i,
                    j: 2.0 * i,
                    sy: s,
                    sz: s,
                })
            }
            SectionKind::ISection => {
                let (area, iy, iz) = match (
                    self.area,
                    self.moment_of_inertia_y,
                    self.moment_of_inertia_z,
                ) {
                    (Some(a), Some(iy), Some(iz)) if a > 0.0 && iy > 0.0 && iz > 0.0 => {
                        (a, iy, iz)
                    }
                    _ => {
                        return Err(EngineError::UnsupportedSection(
                            "i-section requires positive area and moments of inertia".to_string(),
                        ))
                    }
                };
                // No extreme-fiber distance is supplied; use the half-side
                // of the equivalent square for the section moduli.
                let c = area.sqrt() / 2.0;
                Ok(SectionProperties {
                    area,
                    iy,
                    iz,
                    j: iy + iz,
                    sy: iy / c,
                    sz: iz / c,
                })
            }
            SectionKind::Unknown => Err(EngineError::UnsupportedSection(
                "unrecognized section kind".to_string(),
            )),
        }
    }

    fn dimensions(&self, kind: &str) -> EngineResult<(f64, f64)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Ok((w, h)),
            _ => Err(EngineError::UnsupportedSection(format!(
                "{kind} section requires positive width and height"
            ))),
        }
    }
}

/// Derived geometric properties consumed by the assembler and post-processor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionProperties {
    /// Cross-sectional area in m²
    pub area: f64,
    /// Moment of inertia about the local y-axis in m⁴
    pub iy: f64,
    /// Moment of inertia about the local z-axis in m⁴
    pub iz: f64,
    /// Torsional constant in m⁴
    pub j: f64,
    /// Elastic section modulus about y in m³
    pub sy: f64,
    /// Elastic section modulus about z in m³
    pub sz: f64,
}
