//! Node element - a point in 3D space owned by a part

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::geometry::{canonical_key, GeometricKey};

/// Field results of one step: field name (`U`, `RF`, ...) to component values
pub type FieldResults = HashMap<String, Vec<f64>>;

/// A 3D node in the finite element model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
    /// Optional user label
    pub name: Option<String>,
    /// Lumped mass (optional)
    pub mass: Option<f64>,

    /// Part-local key, assigned at registration
    #[serde(skip)]
    pub(crate) key: Option<usize>,

    /// Keys of the elements referencing this node
    #[serde(skip)]
    pub(crate) connected_elements: BTreeSet<usize>,

    /// Results by problem, then step
    #[serde(skip)]
    pub(crate) results: HashMap<String, HashMap<String, FieldResults>>,
}

impl Node {
    /// Create a new node at the given coordinates
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            name: None,
            mass: None,
            key: None,
            connected_elements: BTreeSet::new(),
            results: HashMap::new(),
        }
    }

    pub fn from_coords(xyz: [f64; 3]) -> Self {
        Self::new(xyz[0], xyz[1], xyz[2])
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Get the coordinates as an array
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Key inside the owning part, `None` while unregistered
    pub fn key(&self) -> Option<usize> {
        self.key
    }

    /// Canonical geometric key at `precision` decimals
    pub fn gkey(&self, precision: usize) -> GeometricKey {
        canonical_key(self.coords(), precision)
    }

    /// Calculate distance to another node
    pub fn distance_to(&self, other: &Node) -> f64 {
        crate::geometry::distance(self.coords(), other.coords())
    }

    /// Keys of the elements connected to this node, ascending
    pub fn connected_elements(&self) -> impl Iterator<Item = usize> + '_ {
        self.connected_elements.iter().copied()
    }

    pub fn is_connected(&self) -> bool {
        !self.connected_elements.is_empty()
    }

    /// Values of `field` for a problem step, if results were attached
    pub fn result(&self, problem: &str, step: &str, field: &str) -> Option<&[f64]> {
        self.results
            .get(problem)?
            .get(step)?
            .get(field)
            .map(Vec::as_slice)
    }

    /// All fields stored for a problem step
    pub fn step_results(&self, problem: &str, step: &str) -> Option<&FieldResults> {
        self.results.get(problem)?.get(step)
    }

    pub(crate) fn set_result(&mut self, problem: &str, step: &str, field: &str, values: Vec<f64>) {
        self.results
            .entry(problem.to_string())
            .or_default()
            .entry(step.to_string())
            .or_default()
            .insert(field.to_string(), values);
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new(1.0, 2.0, 3.0).with_name("corner");
        assert_eq!(node.coords(), [1.0, 2.0, 3.0]);
        assert_eq!(node.name.as_deref(), Some("corner"));
        assert!(node.key().is_none());
    }

    #[test]
    fn test_node_distance() {
        let n1 = Node::new(0.0, 0.0, 0.0);
        let n2 = Node::new(3.0, 4.0, 0.0);
        assert!((n1.distance_to(&n2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_results_lookup() {
        let mut node = Node::default();
        node.set_result("static", "step-1", "U", vec![0.0, -1.5, 0.0]);
        assert_eq!(node.result("static", "step-1", "U"), Some(&[0.0, -1.5, 0.0][..]));
        assert!(node.result("static", "step-2", "U").is_none());
        assert_eq!(node.step_results("static", "step-1").map(|r| r.len()), Some(1));
    }
}
