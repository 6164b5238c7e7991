//! Section properties assigned to elements

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::{ElementKind, Material};

/// Reference from a section to its material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialRef {
    /// Material already registered under this name
    Name(String),
    /// Material registered together with the section
    Inline(Material),
}

impl MaterialRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Inline(material) => &material.name,
        }
    }
}

impl From<&str> for MaterialRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for MaterialRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Material> for MaterialRef {
    fn from(material: Material) -> Self {
        Self::Inline(material)
    }
}

impl From<&Material> for MaterialRef {
    fn from(material: &Material) -> Self {
        Self::Inline(material.clone())
    }
}

/// Cross-section shape of a beam section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BeamProfile {
    Rectangular { width: f64, depth: f64 },
    Circular { radius: f64 },
    /// Hollow circular tube
    Pipe { radius: f64, thickness: f64 },
    /// Rectangular tube with uniform wall
    Box { width: f64, depth: f64, thickness: f64 },
    /// Doubly symmetric wide flange
    ISection {
        depth: f64,
        flange_width: f64,
        flange_thickness: f64,
        web_thickness: f64,
    },
    /// Properties given directly
    General {
        area: f64,
        i11: f64,
        i12: f64,
        i22: f64,
        j: f64,
    },
}

impl BeamProfile {
    /// Cross-sectional area
    pub fn area(&self) -> f64 {
        match *self {
            Self::Rectangular { width, depth } => width * depth,
            Self::Circular { radius } => PI * radius.powi(2),
            Self::Pipe { radius, thickness } => {
                let r_i = radius - thickness;
                PI * (radius.powi(2) - r_i.powi(2))
            }
            Self::Box { width, depth, thickness } => {
                width * depth - (width - 2.0 * thickness) * (depth - 2.0 * thickness)
            }
            Self::ISection {
                depth,
                flange_width,
                flange_thickness,
                web_thickness,
            } => {
                let hw = depth - 2.0 * flange_thickness;
                2.0 * flange_width * flange_thickness + hw * web_thickness
            }
            Self::General { area, .. } => area,
        }
    }

    /// Moment of inertia about the local strong axis
    pub fn iy(&self) -> f64 {
        match *self {
            Self::Rectangular { width, depth } => width * depth.powi(3) / 12.0,
            Self::Circular { radius } => PI * radius.powi(4) / 4.0,
            Self::Pipe { radius, thickness } => {
                let r_i = radius - thickness;
                PI * (radius.powi(4) - r_i.powi(4)) / 4.0
            }
            Self::Box { width, depth, thickness } => {
                let bi = width - 2.0 * thickness;
                let di = depth - 2.0 * thickness;
                (width * depth.powi(3) - bi * di.powi(3)) / 12.0
            }
            Self::ISection {
                depth,
                flange_width,
                flange_thickness,
                web_thickness,
            } => {
                let hw = depth - 2.0 * flange_thickness;
                (flange_width * depth.powi(3) - (flange_width - web_thickness) * hw.powi(3)) / 12.0
            }
            Self::General { i11, .. } => i11,
        }
    }

    /// Moment of inertia about the local weak axis
    pub fn iz(&self) -> f64 {
        match *self {
            Self::Rectangular { width, depth } => depth * width.powi(3) / 12.0,
            Self::Circular { .. } | Self::Pipe { .. } => self.iy(),
            Self::Box { width, depth, thickness } => {
                let bi = width - 2.0 * thickness;
                let di = depth - 2.0 * thickness;
                (depth * width.powi(3) - di * bi.powi(3)) / 12.0
            }
            Self::ISection {
                depth,
                flange_width,
                flange_thickness,
                web_thickness,
            } => {
                let hw = depth - 2.0 * flange_thickness;
                (2.0 * flange_thickness * flange_width.powi(3) + hw * web_thickness.powi(3)) / 12.0
            }
            Self::General { i22, .. } => i22,
        }
    }

    /// Torsional constant
    pub fn j(&self) -> f64 {
        match *self {
            Self::Rectangular { width, depth } => {
                // Approximate, a >= b
                let (a, b) = if width > depth { (width, depth) } else { (depth, width) };
                a * b.powi(3) / 3.0 * (1.0 - 0.63 * b / a)
            }
            Self::Circular { radius } => PI * radius.powi(4) / 2.0,
            Self::Pipe { radius, thickness } => {
                let r_i = radius - thickness;
                PI * (radius.powi(4) - r_i.powi(4)) / 2.0
            }
            Self::Box { width, depth, thickness } => {
                // Thin-walled closed section
                let am = (width - thickness) * (depth - thickness);
                let s = 2.0 * (width + depth) - 4.0 * thickness;
                4.0 * am.powi(2) * thickness / s
            }
            Self::ISection {
                depth,
                flange_width,
                flange_thickness,
                web_thickness,
            } => {
                let hw = depth - 2.0 * flange_thickness;
                (2.0 * flange_width * flange_thickness.powi(3) + hw * web_thickness.powi(3)) / 3.0
            }
            Self::General { j, .. } => j,
        }
    }

    /// Solver keyword for the profile shape
    pub fn solver_shape(&self) -> &'static str {
        match self {
            Self::Rectangular { .. } => "RECT",
            Self::Circular { .. } => "CIRC",
            Self::Pipe { .. } => "PIPE",
            Self::Box { .. } => "BOX",
            Self::ISection { .. } => "I",
            Self::General { .. } => "GENERAL",
        }
    }

    /// Dimension data line values, in solver order
    pub fn dimensions(&self) -> Vec<f64> {
        match *self {
            Self::Rectangular { width, depth } => vec![width, depth],
            Self::Circular { radius } => vec![radius],
            Self::Pipe { radius, thickness } => vec![radius, thickness],
            Self::Box { width, depth, thickness } => {
                vec![width, depth, thickness, thickness, thickness, thickness]
            }
            Self::ISection {
                depth,
                flange_width,
                flange_thickness,
                web_thickness,
            } => vec![
                depth / 2.0,
                depth,
                flange_width,
                flange_width,
                flange_thickness,
                flange_thickness,
                web_thickness,
            ],
            Self::General { area, i11, i12, i22, j } => vec![area, i11, i12, i22, j],
        }
    }
}

/// What a section describes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SectionKind {
    Beam(BeamProfile),
    Truss { area: f64 },
    Shell { thickness: f64, integration_points: usize },
    Membrane { thickness: f64 },
    Solid,
    /// Point mass
    Mass { mass: f64 },
}

impl SectionKind {
    /// Whether elements of `kind` may use this section
    pub fn accepts(&self, kind: ElementKind) -> bool {
        matches!(
            (self, kind),
            (Self::Beam(_), ElementKind::Beam)
                | (Self::Truss { .. }, ElementKind::Truss)
                | (Self::Shell { .. }, ElementKind::Shell)
                | (Self::Membrane { .. }, ElementKind::Membrane)
                | (Self::Solid, ElementKind::Solid)
                | (Self::Mass { .. }, ElementKind::Mass)
        )
    }
}

/// A named section. Every section except a mass section references a
/// material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub material: Option<MaterialRef>,
    pub kind: SectionKind,
}

impl Section {
    pub fn new(name: impl Into<String>, material: impl Into<MaterialRef>, kind: SectionKind) -> Self {
        Self {
            name: name.into(),
            material: Some(material.into()),
            kind,
        }
    }

    pub fn beam(name: impl Into<String>, material: impl Into<MaterialRef>, profile: BeamProfile) -> Self {
        Self::new(name, material, SectionKind::Beam(profile))
    }

    /// Rectangular beam section
    pub fn rectangular(
        name: impl Into<String>,
        material: impl Into<MaterialRef>,
        width: f64,
        depth: f64,
    ) -> Self {
        Self::beam(name, material, BeamProfile::Rectangular { width, depth })
    }

    pub fn truss(name: impl Into<String>, material: impl Into<MaterialRef>, area: f64) -> Self {
        Self::new(name, material, SectionKind::Truss { area })
    }

    /// Shell section with 5 integration points through the thickness
    pub fn shell(name: impl Into<String>, material: impl Into<MaterialRef>, thickness: f64) -> Self {
        Self::new(
            name,
            material,
            SectionKind::Shell {
                thickness,
                integration_points: 5,
            },
        )
    }

    pub fn membrane(name: impl Into<String>, material: impl Into<MaterialRef>, thickness: f64) -> Self {
        Self::new(name, material, SectionKind::Membrane { thickness })
    }

    pub fn solid(name: impl Into<String>, material: impl Into<MaterialRef>) -> Self {
        Self::new(name, material, SectionKind::Solid)
    }

    pub fn mass(name: impl Into<String>, mass: f64) -> Self {
        Self {
            name: name.into(),
            material: None,
            kind: SectionKind::Mass { mass },
        }
    }

    /// Name of the referenced material, if any
    pub fn material_name(&self) -> Option<&str> {
        self.material.as_ref().map(MaterialRef::name)
    }
}
