//! Part - registry of nodes, elements, materials, sections, groups and
//! releases with dense part-local keys

use log::{debug, log};
use nalgebra::{Isometry3, Point3, Vector3};
use once_cell::sync::OnceCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::ModelConfig;
use crate::elements::{
    BeamEnd, BeamRelease, Element, ElementKind, ElementType, Group, Material, MaterialRef, Member,
    Node, Release, Section, SectionKind, SectionRef,
};
use crate::error::{ModelError, ModelResult};
use crate::geometry::{is_representable, GeometricKey, KdTree, Plane};

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(&self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Deformable parts take any non-rigid element; rigid parts only rigid ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartKind {
    Deformable,
    Rigid { reference_point: Option<usize> },
}

/// A section about to be registered, validated against the current part
struct PreparedSection {
    section: Section,
    material: Option<Material>,
    exists: bool,
}

/// An element validated against the current part
enum PreparedElement {
    Duplicate(usize),
    New {
        element: Element,
        section: Option<PreparedSection>,
    },
}

/// Self-contained sub-assembly owning its own entities
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    config: ModelConfig,
    kind: PartKind,
    nodes: Vec<Node>,
    elements: Vec<Element>,
    materials: BTreeMap<String, Material>,
    sections: BTreeMap<String, Section>,
    groups: Vec<Group>,
    releases: Vec<BeamRelease>,
    gkey_index: HashMap<GeometricKey, Vec<usize>>,
    connectivity: HashMap<Vec<usize>, usize>,
    tree: OnceCell<KdTree>,
}

impl Part {
    /// Create an empty deformable part with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, ModelConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            name: name.into(),
            config,
            kind: PartKind::Deformable,
            nodes: Vec::new(),
            elements: Vec::new(),
            materials: BTreeMap::new(),
            sections: BTreeMap::new(),
            groups: Vec::new(),
            releases: Vec::new(),
            gkey_index: HashMap::new(),
            connectivity: HashMap::new(),
            tree: OnceCell::new(),
        }
    }

    /// Create an empty rigid part
    pub fn rigid(name: impl Into<String>) -> Self {
        Self::rigid_with_config(name, ModelConfig::default())
    }

    pub fn rigid_with_config(name: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            kind: PartKind::Rigid {
                reference_point: None,
            },
            ..Self::with_config(name, config)
        }
    }

    // ========================
    // Accessors
    // ========================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn kind(&self) -> &PartKind {
        &self.kind
    }

    pub fn is_rigid(&self) -> bool {
        matches!(self.kind, PartKind::Rigid { .. })
    }

    /// Reference node of a rigid part
    pub fn reference_point(&self) -> Option<usize> {
        match self.kind {
            PartKind::Rigid { reference_point } => reference_point,
            PartKind::Deformable => None,
        }
    }

    /// Nodes in key order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Elements in key order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn materials(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// User groups in registration order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn releases(&self) -> &[BeamRelease] {
        &self.releases
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    // ========================
    // Node Methods
    // ========================

    /// Register a node, returning its key. A node coinciding with an existing
    /// one (same geometric key) is discarded and the existing key returned,
    /// unless the part config allows overlapping points.
    pub fn add_node(&mut self, node: Node) -> ModelResult<usize> {
        self.add_node_with(node, self.config.point_overlap)
    }

    /// Register a node, optionally allowing coincident duplicates.
    pub fn add_node_with(&mut self, mut node: Node, allow_duplicates: bool) -> ModelResult<usize> {
        self.check_node_coords(&node)?;
        let gkey = node.gkey(self.config.precision);
        if !allow_duplicates {
            if let Some(&existing) = self.gkey_index.get(&gkey).and_then(|keys| keys.first()) {
                log!(
                    self.config.skip_level(),
                    "Part '{}': node at {:?} skipped, coincides with node {}",
                    self.name,
                    node.coords(),
                    existing
                );
                return Ok(existing);
            }
        }

        let key = self.nodes.len();
        node.key = Some(key);
        node.connected_elements.clear();
        self.nodes.push(node);
        self.gkey_index.entry(gkey).or_default().push(key);
        self.invalidate_tree();
        debug!("Part '{}': added node {}", self.name, key);
        Ok(key)
    }

    /// Element-wise [`add_node`](Self::add_node). Fails before registering
    /// anything if any node has coordinates [`add_node`](Self::add_node) rejects.
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) -> ModelResult<Vec<usize>> {
        let nodes: Vec<Node> = nodes.into_iter().collect();
        for node in &nodes {
            self.check_node_coords(node)?;
        }
        nodes.into_iter().map(|n| self.add_node(n)).collect()
    }

    /// Coordinates must be finite and small enough to quantize at the
    /// configured precision.
    fn check_node_coords(&self, node: &Node) -> ModelResult<()> {
        if !node.is_finite() {
            return Err(ModelError::InvalidArgument(format!(
                "node coordinates must be finite, got {:?}",
                node.coords()
            )));
        }
        if !is_representable(node.coords(), self.config.precision) {
            return Err(ModelError::InvalidArgument(format!(
                "node coordinates {:?} are out of range at precision {}",
                node.coords(),
                self.config.precision
            )));
        }
        Ok(())
    }

    /// Unregister a node and renumber the remaining ones densely, keeping
    /// their relative order. The node must not be referenced by any element.
    pub fn remove_node(&mut self, key: usize) -> ModelResult<Node> {
        self.check_node_removable(key)?;
        let mut node = self.nodes.remove(key);
        node.key = None;
        self.shift_node_keys(&[key]);
        debug!("Part '{}': removed node {}", self.name, key);
        Ok(node)
    }

    /// Remove several nodes at once. Either all are removed or none.
    pub fn remove_nodes(&mut self, keys: impl IntoIterator<Item = usize>) -> ModelResult<Vec<Node>> {
        let keys: BTreeSet<usize> = keys.into_iter().collect();
        for &key in &keys {
            self.check_node_removable(key)?;
        }
        let mut removed = Vec::with_capacity(keys.len());
        for &key in keys.iter().rev() {
            let mut node = self.nodes.remove(key);
            node.key = None;
            removed.push(node);
        }
        removed.reverse();
        let keys: Vec<usize> = keys.into_iter().collect();
        self.shift_node_keys(&keys);
        Ok(removed)
    }

    fn check_node_removable(&self, key: usize) -> ModelResult<()> {
        let node = self.nodes.get(key).ok_or(ModelError::NodeNotFound(key))?;
        if node.is_connected() {
            return Err(ModelError::ReferentialIntegrity(format!(
                "node {} is still used by elements {:?}",
                key,
                node.connected_elements().collect::<Vec<_>>()
            )));
        }
        if self.reference_point() == Some(key) {
            return Err(ModelError::ReferentialIntegrity(format!(
                "node {key} is the reference point of rigid part '{}'",
                self.name
            )));
        }
        Ok(())
    }

    /// Fix up every stored node key after `removed` (ascending) were taken out
    fn shift_node_keys(&mut self, removed: &[usize]) {
        let remap = |key: usize| key - removed.partition_point(|&r| r < key);

        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.key = Some(index);
        }
        for element in &mut self.elements {
            for node in &mut element.nodes {
                *node = remap(*node);
            }
        }
        for group in &mut self.groups {
            if let Group::Nodes(g) = group {
                let keys: BTreeSet<usize> = g
                    .keys()
                    .into_iter()
                    .filter(|k| removed.binary_search(k).is_err())
                    .map(remap)
                    .collect();
                g.members = keys.into_iter().map(Member::Key).collect();
            }
        }
        if let PartKind::Rigid {
            reference_point: Some(point),
        } = &mut self.kind
        {
            *point = remap(*point);
        }
        self.rebuild_gkey_index();
        self.rebuild_connectivity();
        self.invalidate_tree();
    }

    pub fn node(&self, key: usize) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn find_node_by_key(&self, key: usize) -> ModelResult<&Node> {
        self.nodes.get(key).ok_or(ModelError::NodeNotFound(key))
    }

    /// First node carrying `name`
    pub fn find_node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name.as_deref() == Some(name))
    }

    pub fn find_nodes_by_name(&self, name: &str) -> Vec<usize> {
        self.find_nodes_where(|n| n.name.as_deref() == Some(name))
    }

    /// Node whose geometric key matches `point`
    pub fn find_node_by_location(&self, point: [f64; 3]) -> Option<usize> {
        let gkey = crate::geometry::canonical_key(point, self.config.precision);
        self.gkey_index.get(&gkey).and_then(|keys| keys.first().copied())
    }

    /// Whether a node coinciding with `node` is registered
    pub fn contains_node(&self, node: &Node) -> bool {
        self.find_node_by_location(node.coords()).is_some()
    }

    /// Nodes strictly closer than `distance` to `point`, nearest first.
    /// With a plane, only nodes within the configured tolerance of it count.
    pub fn find_nodes_around_point(
        &self,
        point: [f64; 3],
        distance: f64,
        plane: Option<&Plane>,
    ) -> ModelResult<Vec<usize>> {
        check_query_point(point)?;
        if !(distance.is_finite() && distance > 0.0) {
            return Err(ModelError::InvalidArgument(format!(
                "search distance must be positive and finite, got {distance}"
            )));
        }
        Ok(self
            .tree()
            .within_radius(point, distance)
            .into_iter()
            .map(|(key, _)| key)
            .filter(|&key| self.on_plane(key, plane))
            .collect())
    }

    /// Nodes around an existing node, excluding the node itself
    pub fn find_nodes_around_node(
        &self,
        key: usize,
        distance: f64,
        plane: Option<&Plane>,
    ) -> ModelResult<Vec<usize>> {
        let node = self.find_node_by_key(key)?;
        Ok(self
            .find_nodes_around_point(node.coords(), distance, plane)?
            .into_iter()
            .filter(|&k| k != key)
            .collect())
    }

    /// The `k` nodes nearest to `point`, nearest first; `k` must lie in
    /// `1..=node_count`.
    pub fn find_closest_nodes_to_point(&self, point: [f64; 3], k: usize) -> ModelResult<Vec<usize>> {
        check_query_point(point)?;
        if k == 0 || k > self.nodes.len() {
            return Err(ModelError::InvalidArgument(format!(
                "k must be between 1 and {}, got {}",
                self.nodes.len(),
                k
            )));
        }
        Ok(self.tree().nearest(point, k).into_iter().map(|(key, _)| key).collect())
    }

    /// The `k` nodes nearest to an existing node, excluding the node itself
    pub fn find_closest_nodes_to_node(&self, key: usize, k: usize) -> ModelResult<Vec<usize>> {
        let node = self.find_node_by_key(key)?;
        let others = self.nodes.len() - 1;
        if k == 0 || k > others {
            return Err(ModelError::InvalidArgument(format!(
                "k must be between 1 and {others}, got {k}"
            )));
        }
        Ok(self
            .tree()
            .nearest(node.coords(), k + 1)
            .into_iter()
            .map(|(found, _)| found)
            .filter(|&found| found != key)
            .take(k)
            .collect())
    }

    /// Nodes within `tolerance` of `plane`, in key order
    pub fn find_nodes_on_plane(&self, plane: &Plane, tolerance: f64) -> Vec<usize> {
        self.find_nodes_where(|n| plane.contains(n.coords(), tolerance))
    }

    /// Nodes whose coordinate along `axis` is within `tolerance` of `value`
    pub fn find_nodes_by_attribute(&self, axis: Axis, value: f64, tolerance: f64) -> Vec<usize> {
        let i = axis.index();
        self.find_nodes_where(|n| (n.coords()[i] - value).abs() <= tolerance)
    }

    /// Keys of the nodes satisfying `predicate`, in key order
    pub fn find_nodes_where(&self, predicate: impl Fn(&Node) -> bool) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| predicate(n))
            .map(|(key, _)| key)
            .collect()
    }

    /// Nodes inside the axis-aligned box `[min, max]` (inclusive)
    pub fn find_nodes_in_box(&self, min: [f64; 3], max: [f64; 3]) -> Vec<usize> {
        self.find_nodes_where(|n| {
            let c = n.coords();
            (0..3).all(|i| c[i] >= min[i] && c[i] <= max[i])
        })
    }

    /// Elements referencing node `key`
    pub fn connected_elements(&self, key: usize) -> ModelResult<Vec<usize>> {
        Ok(self.find_node_by_key(key)?.connected_elements().collect())
    }

    /// Attach solver results to a node
    pub fn set_node_result(
        &mut self,
        key: usize,
        problem: &str,
        step: &str,
        field: &str,
        values: Vec<f64>,
    ) -> ModelResult<()> {
        let node = self.nodes.get_mut(key).ok_or(ModelError::NodeNotFound(key))?;
        node.set_result(problem, step, field, values);
        Ok(())
    }

    fn on_plane(&self, key: usize, plane: Option<&Plane>) -> bool {
        plane.map_or(true, |p| p.contains(self.nodes[key].coords(), self.config.tolerance))
    }

    // ========================
    // Material & Section Methods
    // ========================

    /// Register a material. Re-adding an identical definition is a no-op;
    /// a different material under a taken name is rejected.
    pub fn add_material(&mut self, material: Material) -> ModelResult<&Material> {
        let exists = self.check_material(&material)?;
        let name = material.name.clone();
        if exists {
            log!(self.config.skip_level(), "Part '{}': material '{}' already registered", self.name, name);
        } else {
            debug!("Part '{}': added material '{}'", self.name, name);
            self.materials.insert(name.clone(), material);
        }
        self.materials
            .get(&name)
            .ok_or(ModelError::MissingDependency(name))
    }

    pub fn add_materials(&mut self, materials: impl IntoIterator<Item = Material>) -> ModelResult<()> {
        for material in materials {
            self.add_material(material)?;
        }
        Ok(())
    }

    pub fn find_material_by_name(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn contains_material(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    /// `Ok(true)` when an identical material is already registered
    fn check_material(&self, material: &Material) -> ModelResult<bool> {
        match self.materials.get(&material.name) {
            Some(existing) if existing == material => Ok(true),
            Some(_) => Err(ModelError::DuplicateEntity(format!(
                "material '{}' is already defined differently in part '{}'",
                material.name, self.name
            ))),
            None => Ok(false),
        }
    }

    /// Register a section. An inline material is registered with it; a
    /// material given by name must already be present.
    pub fn add_section(&mut self, section: Section) -> ModelResult<&Section> {
        let prepared = self.prepare_section(section)?;
        Ok(self.commit_section(prepared))
    }

    pub fn add_sections(&mut self, sections: impl IntoIterator<Item = Section>) -> ModelResult<()> {
        for section in sections {
            self.add_section(section)?;
        }
        Ok(())
    }

    pub fn find_section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn contains_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    fn prepare_section(&self, mut section: Section) -> ModelResult<PreparedSection> {
        let material = match section.material.take() {
            None => {
                if !matches!(section.kind, SectionKind::Mass { .. }) {
                    return Err(ModelError::MissingDependency(format!(
                        "section '{}' has no material",
                        section.name
                    )));
                }
                None
            }
            Some(MaterialRef::Name(name)) => {
                if !self.materials.contains_key(&name) {
                    return Err(ModelError::MissingDependency(format!(
                        "section '{}' references unknown material '{}'",
                        section.name, name
                    )));
                }
                section.material = Some(MaterialRef::Name(name));
                None
            }
            Some(MaterialRef::Inline(material)) => {
                let exists = self.check_material(&material)?;
                section.material = Some(MaterialRef::Name(material.name.clone()));
                (!exists).then_some(material)
            }
        };

        let exists = match self.sections.get(&section.name) {
            Some(existing) if *existing == section => true,
            Some(_) => {
                return Err(ModelError::DuplicateEntity(format!(
                    "section '{}' is already defined differently in part '{}'",
                    section.name, self.name
                )))
            }
            None => false,
        };
        Ok(PreparedSection {
            section,
            material,
            exists,
        })
    }

    fn commit_section(&mut self, prepared: PreparedSection) -> &Section {
        if let Some(material) = prepared.material {
            debug!("Part '{}': added material '{}'", self.name, material.name);
            self.materials.insert(material.name.clone(), material);
        }
        let name = prepared.section.name.clone();
        if prepared.exists {
            log!(self.config.skip_level(), "Part '{}': section '{}' already registered", self.name, name);
        } else {
            debug!("Part '{}': added section '{}'", self.name, name);
        }
        self.sections.entry(name).or_insert(prepared.section)
    }

    // ========================
    // Element Methods
    // ========================

    /// Register an element, returning its key. An element with the same
    /// connectivity as a registered one is discarded and the existing key
    /// returned.
    pub fn add_element(&mut self, element: Element) -> ModelResult<usize> {
        self.add_element_with(element, true)
    }

    /// Register an element. With `checks` off, duplicate-connectivity
    /// suppression is skipped; node references are always validated.
    pub fn add_element_with(&mut self, element: Element, checks: bool) -> ModelResult<usize> {
        match self.prepare_element(element, checks)? {
            PreparedElement::Duplicate(existing) => Ok(existing),
            PreparedElement::New { element, section } => Ok(self.commit_element(element, section)),
        }
    }

    /// Element-wise [`add_element`](Self::add_element)
    pub fn add_elements(&mut self, elements: impl IntoIterator<Item = Element>) -> ModelResult<Vec<usize>> {
        elements.into_iter().map(|e| self.add_element(e)).collect()
    }

    fn prepare_element(&self, mut element: Element, checks: bool) -> ModelResult<PreparedElement> {
        let etype = element.element_type()?;
        match (&self.kind, element.rigid) {
            (PartKind::Rigid { .. }, false) => {
                return Err(ModelError::UnsupportedOperation(format!(
                    "rigid part '{}' only accepts rigid elements",
                    self.name
                )))
            }
            (PartKind::Deformable, true) => {
                return Err(ModelError::UnsupportedOperation(format!(
                    "rigid {etype} element added to deformable part '{}'",
                    self.name
                )))
            }
            _ => {}
        }

        if let Some(missing) = element.nodes.iter().find(|&&k| k >= self.nodes.len()) {
            return Err(ModelError::ReferentialIntegrity(format!(
                "element references node {} which is not registered in part '{}'",
                missing, self.name
            )));
        }
        let connectivity = element.connectivity_key();
        if connectivity.windows(2).any(|w| w[0] == w[1]) {
            return Err(ModelError::InvalidArgument(format!(
                "element connectivity {:?} repeats a node",
                element.nodes
            )));
        }

        let section = match std::mem::replace(&mut element.section, SectionRef::Name(String::new())) {
            SectionRef::Name(name) => {
                let section = self
                    .sections
                    .get(&name)
                    .ok_or_else(|| ModelError::SectionNotFound(name.clone()))?;
                check_section_kind(section, element.kind, etype)?;
                element.section = SectionRef::Name(name);
                None
            }
            SectionRef::Inline(section) => {
                check_section_kind(&section, element.kind, etype)?;
                element.section = SectionRef::Name(section.name.clone());
                Some(self.prepare_section(*section)?)
            }
        };

        if checks {
            if let Some(&existing) = self.connectivity.get(&connectivity) {
                log!(
                    self.config.skip_level(),
                    "Part '{}': element {:?} skipped, same connectivity as element {}",
                    self.name,
                    element.nodes,
                    existing
                );
                return Ok(PreparedElement::Duplicate(existing));
            }
        }
        Ok(PreparedElement::New { element, section })
    }

    fn commit_element(&mut self, mut element: Element, section: Option<PreparedSection>) -> usize {
        if let Some(section) = section {
            self.commit_section(section);
        }
        let key = self.elements.len();
        element.key = Some(key);
        for &node in &element.nodes {
            self.nodes[node].connected_elements.insert(key);
        }
        self.connectivity.entry(element.connectivity_key()).or_insert(key);
        self.elements.push(element);
        debug!("Part '{}': added element {}", self.name, key);
        key
    }

    /// Unregister an element, detach it from its nodes, groups and releases,
    /// and renumber the remaining elements densely.
    pub fn remove_element(&mut self, key: usize) -> ModelResult<Element> {
        if key >= self.elements.len() {
            return Err(ModelError::ElementNotFound(key));
        }
        let mut element = self.elements.remove(key);
        element.key = None;
        self.shift_element_keys(&[key]);
        debug!("Part '{}': removed element {}", self.name, key);
        Ok(element)
    }

    /// Remove several elements at once. Either all are removed or none.
    pub fn remove_elements(&mut self, keys: impl IntoIterator<Item = usize>) -> ModelResult<Vec<Element>> {
        let keys: BTreeSet<usize> = keys.into_iter().collect();
        if let Some(&missing) = keys.iter().find(|&&k| k >= self.elements.len()) {
            return Err(ModelError::ElementNotFound(missing));
        }
        let mut removed = Vec::with_capacity(keys.len());
        for &key in keys.iter().rev() {
            let mut element = self.elements.remove(key);
            element.key = None;
            removed.push(element);
        }
        removed.reverse();
        let keys: Vec<usize> = keys.into_iter().collect();
        self.shift_element_keys(&keys);
        Ok(removed)
    }

    fn shift_element_keys(&mut self, removed: &[usize]) {
        let remap = |key: usize| key - removed.partition_point(|&r| r < key);
        let gone = |key: &usize| removed.binary_search(key).is_ok();

        for (index, element) in self.elements.iter_mut().enumerate() {
            element.key = Some(index);
        }
        for group in &mut self.groups {
            match group {
                Group::Elements(g) => {
                    let keys: BTreeSet<usize> =
                        g.keys().into_iter().filter(|k| !gone(k)).map(remap).collect();
                    g.members = keys.into_iter().map(Member::Key).collect();
                }
                Group::Faces(g) => {
                    let faces: BTreeSet<(usize, String)> = g
                        .keys()
                        .into_iter()
                        .filter(|(k, _)| !gone(k))
                        .map(|(k, face)| (remap(k), face))
                        .collect();
                    g.faces = faces.into_iter().map(|(k, face)| (Member::Key(k), face)).collect();
                }
                Group::Nodes(_) => {}
            }
        }
        self.releases.retain(|r| !gone(&r.element));
        for release in &mut self.releases {
            release.element = remap(release.element);
        }
        self.rebuild_connectivity();
    }

    pub fn element(&self, key: usize) -> Option<&Element> {
        self.elements.get(key)
    }

    pub fn find_element_by_key(&self, key: usize) -> ModelResult<&Element> {
        self.elements.get(key).ok_or(ModelError::ElementNotFound(key))
    }

    pub fn find_elements_by_name(&self, name: &str) -> Vec<usize> {
        self.element_keys_where(|e| e.name.as_deref() == Some(name))
    }

    /// Elements of topological dimension `dimension` (0 to 3)
    pub fn elements_by_dimension(&self, dimension: usize) -> Vec<usize> {
        self.element_keys_where(|e| e.dimension() == dimension)
    }

    /// Element keys per solver type
    pub fn element_types(&self) -> BTreeMap<ElementType, Vec<usize>> {
        let mut types: BTreeMap<ElementType, Vec<usize>> = BTreeMap::new();
        for (key, element) in self.elements.iter().enumerate() {
            if let Ok(etype) = element.element_type() {
                types.entry(etype).or_default().push(key);
            }
        }
        types
    }

    fn element_keys_where(&self, predicate: impl Fn(&Element) -> bool) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, e)| predicate(e))
            .map(|(key, _)| key)
            .collect()
    }

    // ========================
    // Group Methods
    // ========================

    /// Register a group. New members are registered first; a group equal
    /// to an existing one of the same name is skipped.
    pub fn add_group(&mut self, group: impl Into<Group>) -> ModelResult<&Group> {
        let group = group.into();
        if let Some(index) = self.group_index(group.name()) {
            let identical = self
                .resolve_existing_members(&group)
                .is_some_and(|resolved| self.groups[index].same_members(&resolved));
            if !identical {
                return Err(ModelError::DuplicateEntity(format!(
                    "group '{}' already exists in part '{}'",
                    group.name(),
                    self.name
                )));
            }
            log!(self.config.skip_level(), "Part '{}': group '{}' skipped", self.name, group.name());
            return Ok(&self.groups[index]);
        }

        let group = if has_new_members(&group) {
            // Stage on a copy so a failing member leaves the part untouched
            let mut staged = self.clone();
            let group = staged.register_members(group)?;
            *self = staged;
            group
        } else {
            self.check_member_keys(&group)?;
            normalize(group)
        };
        debug!("Part '{}': added group '{}'", self.name, group.name());
        self.groups.push(group);
        Ok(&self.groups[self.groups.len() - 1])
    }

    pub fn add_groups(&mut self, groups: impl IntoIterator<Item = Group>) -> ModelResult<()> {
        for group in groups {
            self.add_group(group)?;
        }
        Ok(())
    }

    pub fn find_group_by_name(&self, name: &str) -> Option<&Group> {
        self.group_index(name).map(|i| &self.groups[i])
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.group_index(name).is_some()
    }

    fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name() == name)
    }

    /// `group` with every new member replaced by the key of the entity it
    /// duplicates; `None` if some new member is not registered yet.
    fn resolve_existing_members(&self, group: &Group) -> Option<Group> {
        let node_key = |node: &Node| self.find_node_by_location(node.coords());
        let element_key =
            |element: &Element| self.connectivity.get(&element.connectivity_key()).copied();
        let resolved = match group {
            Group::Nodes(g) => {
                let mut g = g.clone();
                g.members = g
                    .members
                    .iter()
                    .map(|m| match m {
                        Member::New(node) => node_key(node).map(Member::Key),
                        Member::Key(k) => Some(Member::Key(*k)),
                    })
                    .collect::<Option<_>>()?;
                Group::Nodes(g)
            }
            Group::Elements(g) => {
                let mut g = g.clone();
                g.members = g
                    .members
                    .iter()
                    .map(|m| match m {
                        Member::New(element) => element_key(element).map(Member::Key),
                        Member::Key(k) => Some(Member::Key(*k)),
                    })
                    .collect::<Option<_>>()?;
                Group::Elements(g)
            }
            Group::Faces(g) => {
                let mut g = g.clone();
                g.faces = g
                    .faces
                    .iter()
                    .map(|(m, face)| {
                        let key = match m {
                            Member::New(element) => element_key(element)?,
                            Member::Key(k) => *k,
                        };
                        Some((Member::Key(key), face.clone()))
                    })
                    .collect::<Option<_>>()?;
                Group::Faces(g)
            }
        };
        Some(resolved)
    }

    fn check_member_keys(&self, group: &Group) -> ModelResult<()> {
        let (keys, limit, what) = match group {
            Group::Nodes(g) => (g.keys(), self.nodes.len(), "node"),
            Group::Elements(g) => (g.keys(), self.elements.len(), "element"),
            Group::Faces(g) => (
                g.keys().into_iter().map(|(k, _)| k).collect(),
                self.elements.len(),
                "element",
            ),
        };
        match keys.into_iter().find(|&k| k >= limit) {
            Some(missing) => Err(ModelError::ReferentialIntegrity(format!(
                "group '{}' references {} {} which is not registered in part '{}'",
                group.name(),
                what,
                missing,
                self.name
            ))),
            None => Ok(()),
        }
    }

    fn register_members(&mut self, group: Group) -> ModelResult<Group> {
        self.check_member_keys(&group)?;
        let group = match group {
            Group::Nodes(mut g) => {
                let mut members = Vec::with_capacity(g.members.len());
                for member in g.members {
                    members.push(match member {
                        Member::New(node) => Member::Key(self.add_node(node)?),
                        key => key,
                    });
                }
                g.members = members;
                Group::Nodes(g)
            }
            Group::Elements(mut g) => {
                let mut members = Vec::with_capacity(g.members.len());
                for member in g.members {
                    members.push(match member {
                        Member::New(element) => Member::Key(self.add_element(element)?),
                        key => key,
                    });
                }
                g.members = members;
                Group::Elements(g)
            }
            Group::Faces(mut g) => {
                let mut faces = Vec::with_capacity(g.faces.len());
                for (member, face) in g.faces {
                    let member = match member {
                        Member::New(element) => Member::Key(self.add_element(element)?),
                        key => key,
                    };
                    faces.push((member, face));
                }
                g.faces = faces;
                Group::Faces(g)
            }
        };
        Ok(normalize(group))
    }

    // ========================
    // Release Methods
    // ========================

    /// Release degrees of freedom at one end of a beam element
    pub fn add_beam_release(
        &mut self,
        element: usize,
        location: BeamEnd,
        release: Release,
    ) -> ModelResult<&BeamRelease> {
        let target = self.find_element_by_key(element)?;
        if target.kind != ElementKind::Beam {
            return Err(ModelError::UnsupportedOperation(format!(
                "releases apply to beam elements only, element {} is a {:?}",
                element, target.kind
            )));
        }
        let entry = BeamRelease {
            element,
            location,
            release,
        };
        if let Some(index) = self
            .releases
            .iter()
            .position(|r| r.element == element && r.location == location)
        {
            if self.releases[index] != entry {
                return Err(ModelError::DuplicateEntity(format!(
                    "element {element} already has a {location:?} release"
                )));
            }
            return Ok(&self.releases[index]);
        }
        self.releases.push(entry);
        Ok(&self.releases[self.releases.len() - 1])
    }

    // ========================
    // Rigid Parts
    // ========================

    /// Register the reference node of a rigid part
    pub fn set_reference_point(&mut self, node: Node) -> ModelResult<usize> {
        if !self.is_rigid() {
            return Err(ModelError::UnsupportedOperation(format!(
                "part '{}' is not rigid",
                self.name
            )));
        }
        let key = self.add_node(node)?;
        self.kind = PartKind::Rigid {
            reference_point: Some(key),
        };
        Ok(key)
    }

    // ========================
    // Geometry
    // ========================

    /// Axis-aligned bounding box as `(min, max)`
    pub fn bounding_box(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = self.nodes.first()?.coords();
        Some(self.nodes.iter().fold((first, first), |(mut lo, mut hi), n| {
            let c = n.coords();
            for i in 0..3 {
                lo[i] = lo[i].min(c[i]);
                hi[i] = hi[i].max(c[i]);
            }
            (lo, hi)
        }))
    }

    /// Centroid of the node cloud
    pub fn center(&self) -> Option<[f64; 3]> {
        if self.nodes.is_empty() {
            return None;
        }
        let sum = self
            .nodes
            .iter()
            .fold(Vector3::zeros(), |acc, n| acc + Vector3::from(n.coords()));
        let c = sum / self.nodes.len() as f64;
        Some([c.x, c.y, c.z])
    }

    /// Move every node (and rotate element orientations) in place
    pub fn transform(&mut self, isometry: &Isometry3<f64>) {
        for node in &mut self.nodes {
            let p = isometry.transform_point(&Point3::from(node.coords()));
            node.x = p.x;
            node.y = p.y;
            node.z = p.z;
        }
        for element in &mut self.elements {
            if let Some(o) = element.orientation {
                let v = isometry.transform_vector(&Vector3::from(o));
                element.orientation = Some([v.x, v.y, v.z]);
            }
        }
        self.rebuild_gkey_index();
        self.invalidate_tree();
    }

    /// Transformed copy of the part
    pub fn transformed(&self, isometry: &Isometry3<f64>) -> Part {
        let mut part = self.clone();
        part.transform(isometry);
        part
    }

    // ========================
    // Indexes
    // ========================

    fn tree(&self) -> &KdTree {
        self.tree.get_or_init(|| {
            let points: Vec<[f64; 3]> = self.nodes.iter().map(Node::coords).collect();
            KdTree::build(&points)
        })
    }

    fn invalidate_tree(&mut self) {
        self.tree = OnceCell::new();
    }

    fn rebuild_gkey_index(&mut self) {
        self.gkey_index.clear();
        for (key, node) in self.nodes.iter().enumerate() {
            self.gkey_index
                .entry(node.gkey(self.config.precision))
                .or_default()
                .push(key);
        }
    }

    fn rebuild_connectivity(&mut self) {
        for node in &mut self.nodes {
            node.connected_elements.clear();
        }
        self.connectivity.clear();
        for (key, element) in self.elements.iter().enumerate() {
            for &node in &element.nodes {
                self.nodes[node].connected_elements.insert(key);
            }
            self.connectivity.entry(element.connectivity_key()).or_insert(key);
        }
    }
}

fn check_query_point(point: [f64; 3]) -> ModelResult<()> {
    if point.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::InvalidArgument(format!(
            "query point must be finite, got {point:?}"
        )))
    }
}

fn check_section_kind(section: &Section, kind: ElementKind, etype: ElementType) -> ModelResult<()> {
    if section.kind.accepts(kind) {
        Ok(())
    } else {
        Err(ModelError::UnsupportedOperation(format!(
            "section '{}' cannot be assigned to {etype} elements",
            section.name
        )))
    }
}

fn has_new_members(group: &Group) -> bool {
    match group {
        Group::Nodes(g) => g.members.iter().any(|m| m.key().is_none()),
        Group::Elements(g) => g.members.iter().any(|m| m.key().is_none()),
        Group::Faces(g) => g.faces.iter().any(|(m, _)| m.key().is_none()),
    }
}

/// Sort and deduplicate member keys
fn normalize(group: Group) -> Group {
    match group {
        Group::Nodes(mut g) => {
            let keys: BTreeSet<usize> = g.keys().into_iter().collect();
            g.members = keys.into_iter().map(Member::Key).collect();
            Group::Nodes(g)
        }
        Group::Elements(mut g) => {
            let keys: BTreeSet<usize> = g.keys().into_iter().collect();
            g.members = keys.into_iter().map(Member::Key).collect();
            Group::Elements(g)
        }
        Group::Faces(mut g) => {
            let faces: BTreeSet<(usize, String)> = g.keys().into_iter().collect();
            g.faces = faces.into_iter().map(|(k, f)| (Member::Key(k), f)).collect();
            Group::Faces(g)
        }
    }
}
