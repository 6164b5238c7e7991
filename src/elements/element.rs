//! Elements: connectivity, section assignment and solver type tags

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Section;
use crate::error::{ModelError, ModelResult};
use crate::geometry::{canonical_key, GeometricKey};

/// Family of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Mass,
    Beam,
    Truss,
    Shell,
    Membrane,
    Solid,
}

impl ElementKind {
    /// Topological dimension
    pub fn dimension(&self) -> usize {
        match self {
            Self::Mass => 0,
            Self::Beam | Self::Truss => 1,
            Self::Shell | Self::Membrane => 2,
            Self::Solid => 3,
        }
    }
}

/// Solver element type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementType {
    Mass,
    B31,
    B32,
    RB3D2,
    T3D2,
    S3,
    S3R,
    S4,
    S4R,
    S8R,
    R3D3,
    R3D4,
    M3D3,
    M3D4,
    M3D4R,
    C3D4,
    C3D6,
    C3D8,
    C3D8R,
    C3D10,
    C3D20,
    C3D20R,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mass => "MASS",
            Self::B31 => "B31",
            Self::B32 => "B32",
            Self::RB3D2 => "RB3D2",
            Self::T3D2 => "T3D2",
            Self::S3 => "S3",
            Self::S3R => "S3R",
            Self::S4 => "S4",
            Self::S4R => "S4R",
            Self::S8R => "S8R",
            Self::R3D3 => "R3D3",
            Self::R3D4 => "R3D4",
            Self::M3D3 => "M3D3",
            Self::M3D4 => "M3D4",
            Self::M3D4R => "M3D4R",
            Self::C3D4 => "C3D4",
            Self::C3D6 => "C3D6",
            Self::C3D8 => "C3D8",
            Self::C3D8R => "C3D8R",
            Self::C3D10 => "C3D10",
            Self::C3D20 => "C3D20",
            Self::C3D20R => "C3D20R",
        }
    }

    /// Derive the tag from element family, node count and formulation flags.
    pub fn resolve(kind: ElementKind, nodes: usize, reduced: bool, rigid: bool) -> ModelResult<Self> {
        use ElementKind as K;
        let tag = match (kind, nodes, reduced, rigid) {
            (K::Mass, 1, _, false) => Self::Mass,
            (K::Beam, 2, false, false) => Self::B31,
            (K::Beam, 3, false, false) => Self::B32,
            (K::Beam, 2, false, true) => Self::RB3D2,
            (K::Truss, 2, false, false) => Self::T3D2,
            (K::Shell, 3, false, false) => Self::S3,
            (K::Shell, 3, true, false) => Self::S3R,
            (K::Shell, 4, false, false) => Self::S4,
            (K::Shell, 4, true, false) => Self::S4R,
            (K::Shell, 8, _, false) => Self::S8R,
            (K::Shell, 3, false, true) => Self::R3D3,
            (K::Shell, 4, false, true) => Self::R3D4,
            (K::Membrane, 3, false, false) => Self::M3D3,
            (K::Membrane, 4, false, false) => Self::M3D4,
            (K::Membrane, 4, true, false) => Self::M3D4R,
            (K::Solid, 4, false, false) => Self::C3D4,
            (K::Solid, 6, false, false) => Self::C3D6,
            (K::Solid, 8, false, false) => Self::C3D8,
            (K::Solid, 8, true, false) => Self::C3D8R,
            (K::Solid, 10, false, false) => Self::C3D10,
            (K::Solid, 20, false, false) => Self::C3D20,
            (K::Solid, 20, true, false) => Self::C3D20R,
            _ => {
                return Err(ModelError::UnsupportedOperation(format!(
                    "no {kind:?} element with {nodes} nodes (reduced: {reduced}, rigid: {rigid})"
                )))
            }
        };
        Ok(tag)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference from an element to its section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SectionRef {
    /// Section already registered under this name
    Name(String),
    /// Section registered together with the element
    Inline(Box<Section>),
}

impl SectionRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Inline(section) => &section.name,
        }
    }
}

impl From<&str> for SectionRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for SectionRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Section> for SectionRef {
    fn from(section: Section) -> Self {
        Self::Inline(Box::new(section))
    }
}

impl From<&Section> for SectionRef {
    fn from(section: &Section) -> Self {
        Self::Inline(Box::new(section.clone()))
    }
}

/// An element connecting part nodes by key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    pub kind: ElementKind,
    /// Node keys in connectivity order
    pub nodes: Vec<usize>,
    pub section: SectionRef,
    /// Local orientation vector (beam n1 direction)
    pub orientation: Option<[f64; 3]>,
    /// Reduced integration
    pub reduced: bool,
    /// Rigid (only accepted by rigid parts)
    pub rigid: bool,
    pub name: Option<String>,

    #[serde(skip)]
    pub(crate) key: Option<usize>,
}

impl Element {
    pub fn new(kind: ElementKind, nodes: Vec<usize>, section: impl Into<SectionRef>) -> Self {
        Self {
            kind,
            nodes,
            section: section.into(),
            orientation: None,
            reduced: false,
            rigid: false,
            name: None,
            key: None,
        }
    }

    pub fn mass(node: usize, section: impl Into<SectionRef>) -> Self {
        Self::new(ElementKind::Mass, vec![node], section)
    }

    /// Two-node beam with the default local frame `(0, 0, -1)`
    pub fn beam(start: usize, end: usize, section: impl Into<SectionRef>) -> Self {
        Self::new(ElementKind::Beam, vec![start, end], section).with_orientation([0.0, 0.0, -1.0])
    }

    pub fn truss(start: usize, end: usize, section: impl Into<SectionRef>) -> Self {
        Self::new(ElementKind::Truss, vec![start, end], section)
    }

    pub fn shell(nodes: Vec<usize>, section: impl Into<SectionRef>) -> Self {
        Self::new(ElementKind::Shell, nodes, section)
    }

    pub fn membrane(nodes: Vec<usize>, section: impl Into<SectionRef>) -> Self {
        Self::new(ElementKind::Membrane, nodes, section)
    }

    pub fn solid(nodes: Vec<usize>, section: impl Into<SectionRef>) -> Self {
        Self::new(ElementKind::Solid, nodes, section)
    }

    pub fn with_orientation(mut self, orientation: [f64; 3]) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn without_orientation(mut self) -> Self {
        self.orientation = None;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use reduced integration
    pub fn reduced(mut self) -> Self {
        self.reduced = true;
        self
    }

    /// Mark as rigid
    pub fn rigid(mut self) -> Self {
        self.rigid = true;
        self
    }

    pub fn key(&self) -> Option<usize> {
        self.key
    }

    pub fn section_name(&self) -> &str {
        self.section.name()
    }

    pub fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    pub fn element_type(&self) -> ModelResult<ElementType> {
        ElementType::resolve(self.kind, self.nodes.len(), self.reduced, self.rigid)
    }

    /// Order-independent connectivity signature
    pub fn connectivity_key(&self) -> Vec<usize> {
        let mut nodes = self.nodes.clone();
        nodes.sort_unstable();
        nodes
    }

    /// Normalised orientation at `precision` decimals
    pub fn orientation_key(&self, precision: usize) -> Option<GeometricKey> {
        self.orientation.map(|o| canonical_key(o, precision))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_resolution() {
        assert_eq!(Element::shell(vec![0, 1, 2, 3], "s").element_type().unwrap(), ElementType::S4);
        assert_eq!(
            Element::shell(vec![0, 1, 2, 3], "s").reduced().element_type().unwrap(),
            ElementType::S4R
        );
        assert_eq!(Element::beam(0, 1, "b").element_type().unwrap(), ElementType::B31);
        assert_eq!(
            Element::solid((0..10).collect(), "v").element_type().unwrap(),
            ElementType::C3D10
        );
        assert_eq!(
            Element::shell(vec![0, 1, 2], "s").rigid().element_type().unwrap(),
            ElementType::R3D3
        );
    }

    #[test]
    fn test_unsupported_node_count() {
        let err = Element::shell(vec![0, 1, 2, 3, 4], "s").element_type().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn test_connectivity_key_is_order_independent() {
        let a = Element::shell(vec![3, 1, 2, 0], "s");
        let b = Element::shell(vec![0, 1, 2, 3], "s");
        assert_eq!(a.connectivity_key(), b.connectivity_key());
    }

    #[test]
    fn test_orientation_key() {
        let a = Element::beam(0, 1, "b").with_orientation([0.0, 1.0, 0.0]);
        let b = Element::beam(2, 3, "b").with_orientation([0.00001, 1.0, 0.0]);
        assert_eq!(a.orientation_key(3), b.orientation_key(3));
        assert!(Element::truss(0, 1, "t").orientation_key(3).is_none());
    }
}
