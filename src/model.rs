//! Model - parts, their positioned instances and assembly-level sets

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::config::ModelConfig;
use crate::elements::{Group, GroupKind, Material};
use crate::error::{ModelError, ModelResult};
use crate::interactions::{Interaction, InteractionProperty};
use crate::jobdata::{key_lines, reals, JobContext, JobData};
use crate::part::Part;

/// Nodes addressed at assembly level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeTarget {
    /// A node set of the instanced part
    PartSet { instance: String, set: String },
    /// An assembly-level node set
    AssemblySet(String),
    /// Individual nodes of an instance, by part-local key
    Nodes { instance: String, keys: Vec<usize> },
}

impl NodeTarget {
    pub fn part_set(instance: impl Into<String>, set: impl Into<String>) -> Self {
        Self::PartSet {
            instance: instance.into(),
            set: set.into(),
        }
    }

    pub fn assembly_set(set: impl Into<String>) -> Self {
        Self::AssemblySet(set.into())
    }

    pub fn nodes(instance: impl Into<String>, keys: impl IntoIterator<Item = usize>) -> Self {
        Self::Nodes {
            instance: instance.into(),
            keys: keys.into_iter().collect(),
        }
    }

    /// Solver labels (`inst.set`, `set` or `inst.<key+1>`)
    pub fn labels(&self) -> Vec<String> {
        match self {
            Self::PartSet { instance, set } => vec![format!("{instance}.{set}")],
            Self::AssemblySet(set) => vec![set.clone()],
            Self::Nodes { instance, keys } => keys
                .iter()
                .map(|k| format!("{}.{}", instance, k + 1))
                .collect(),
        }
    }
}

/// Instance axis-angle rotation; `angle` in degrees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub axis_start: [f64; 3],
    pub axis_end: [f64; 3],
    pub angle: f64,
}

/// A positioned copy of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    pub part: String,
    pub translation: [f64; 3],
    pub rotation: Option<Rotation>,
}

impl Instance {
    pub fn new(name: impl Into<String>, part: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            part: part.into(),
            translation: [0.0; 3],
            rotation: None,
        }
    }

    pub fn translated(mut self, translation: [f64; 3]) -> Self {
        self.translation = translation;
        self
    }

    pub fn rotated(mut self, axis_start: [f64; 3], axis_end: [f64; 3], angle: f64) -> Self {
        self.rotation = Some(Rotation {
            axis_start,
            axis_end,
            angle,
        });
        self
    }
}

impl JobData for Instance {
    fn jobdata(&self, _ctx: &JobContext<'_>) -> String {
        let mut out = format!("*Instance, name={}, part={}\n", self.name, self.part);
        if self.rotation.is_some() || self.translation != [0.0; 3] {
            out.push_str(&reals(&self.translation));
            out.push('\n');
        }
        if let Some(r) = &self.rotation {
            let mut values = r.axis_start.to_vec();
            values.extend_from_slice(&r.axis_end);
            values.push(r.angle);
            out.push_str(&reals(&values));
            out.push('\n');
        }
        out.push_str("*End Instance\n**\n");
        out
    }
}

/// Node or element set defined on an instance at assembly level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyGroup {
    pub name: String,
    pub instance: String,
    pub kind: GroupKind,
    pub keys: BTreeSet<usize>,
}

impl AssemblyGroup {
    pub fn nodes(
        name: impl Into<String>,
        instance: impl Into<String>,
        keys: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            name: name.into(),
            instance: instance.into(),
            kind: GroupKind::Nodes,
            keys: keys.into_iter().collect(),
        }
    }

    pub fn elements(
        name: impl Into<String>,
        instance: impl Into<String>,
        keys: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            kind: GroupKind::Elements,
            ..Self::nodes(name, instance, keys)
        }
    }
}

impl JobData for AssemblyGroup {
    fn jobdata(&self, _ctx: &JobContext<'_>) -> String {
        let keyword = match self.kind {
            GroupKind::Elements => "Elset, elset",
            _ => "Nset, nset",
        };
        format!(
            "*{}={}, instance={}\n{}",
            keyword,
            self.name,
            self.instance,
            key_lines(self.keys.iter().copied())
        )
    }
}

/// Top-level container: parts by unique name, instances, assembly sets and
/// interactions
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    description: Option<String>,
    config: ModelConfig,
    parts: BTreeMap<String, Part>,
    instances: Vec<Instance>,
    groups: Vec<AssemblyGroup>,
    interaction_properties: Vec<InteractionProperty>,
    interactions: Vec<Interaction>,
}

impl Model {
    /// Create an empty model with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, ModelConfig::default())
    }

    /// Model-level settings. Parts keep the config they were built with;
    /// pass `model.config().clone()` to `Part::with_config` to share it.
    pub fn with_config(name: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            name: name.into(),
            description: None,
            config,
            parts: BTreeMap::new(),
            instances: Vec::new(),
            groups: Vec::new(),
            interaction_properties: Vec::new(),
            interactions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    // ========================
    // Part Methods
    // ========================

    /// Take ownership of a part and create its default instance
    /// `"{part}-1"`.
    pub fn add_part(&mut self, part: Part) -> ModelResult<&mut Part> {
        let name = part.name().to_string();
        if self.parts.contains_key(&name) {
            return Err(ModelError::DuplicateEntity(format!(
                "part '{name}' already exists in model '{}'",
                self.name
            )));
        }
        let instance = format!("{name}-1");
        if self.find_instance(&instance).is_some() {
            return Err(ModelError::DuplicateEntity(format!(
                "instance '{instance}' already exists in model '{}'",
                self.name
            )));
        }
        for material in part.materials() {
            self.check_material(material, &name)?;
        }

        info!("Model '{}': added part '{}'", self.name, name);
        self.instances.push(Instance::new(instance, name.clone()));
        Ok(self.parts.entry(name).or_insert(part))
    }

    pub fn part(&self, name: &str) -> ModelResult<&Part> {
        self.parts
            .get(name)
            .ok_or_else(|| ModelError::PartNotFound(name.to_string()))
    }

    pub fn part_mut(&mut self, name: &str) -> ModelResult<&mut Part> {
        self.parts
            .get_mut(name)
            .ok_or_else(|| ModelError::PartNotFound(name.to_string()))
    }

    /// Parts ordered by name
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Detach a part together with its instances and their assembly sets
    pub fn remove_part(&mut self, name: &str) -> ModelResult<Part> {
        let part = self
            .parts
            .remove(name)
            .ok_or_else(|| ModelError::PartNotFound(name.to_string()))?;
        let dropped: BTreeSet<String> = self
            .instances
            .iter()
            .filter(|i| i.part == name)
            .map(|i| i.name.clone())
            .collect();
        self.instances.retain(|i| i.part != name);
        self.groups.retain(|g| !dropped.contains(&g.instance));
        debug!("Model '{}': removed part '{}'", self.name, name);
        Ok(part)
    }

    /// Material `material` must not clash with a same-named material of
    /// another part.
    fn check_material(&self, material: &Material, owner: &str) -> ModelResult<()> {
        for part in self.parts.values().filter(|p| p.name() != owner) {
            if let Some(other) = part.find_material_by_name(&material.name) {
                if other != material {
                    return Err(ModelError::DuplicateEntity(format!(
                        "material '{}' is defined differently in parts '{}' and '{}'",
                        material.name,
                        part.name(),
                        owner
                    )));
                }
            }
        }
        Ok(())
    }

    /// Materials of all parts, unique by name, ordered by name
    pub fn materials(&self) -> Vec<&Material> {
        let mut by_name: BTreeMap<&str, &Material> = BTreeMap::new();
        for material in self.parts.values().flat_map(Part::materials) {
            by_name.entry(material.name.as_str()).or_insert(material);
        }
        by_name.into_values().collect()
    }

    pub fn node_count(&self) -> usize {
        self.parts.values().map(Part::node_count).sum()
    }

    pub fn element_count(&self) -> usize {
        self.parts.values().map(Part::element_count).sum()
    }

    // ========================
    // Instance Methods
    // ========================

    pub fn add_instance(&mut self, instance: Instance) -> ModelResult<&Instance> {
        if !self.parts.contains_key(&instance.part) {
            return Err(ModelError::PartNotFound(instance.part));
        }
        if self.find_instance(&instance.name).is_some() {
            return Err(ModelError::DuplicateEntity(format!(
                "instance '{}' already exists in model '{}'",
                instance.name, self.name
            )));
        }
        self.instances.push(instance);
        Ok(&self.instances[self.instances.len() - 1])
    }

    pub fn find_instance(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.name == name)
    }

    /// Instances in registration order
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn remove_instance(&mut self, name: &str) -> ModelResult<Instance> {
        let index = self
            .instances
            .iter()
            .position(|i| i.name == name)
            .ok_or_else(|| ModelError::InstanceNotFound(name.to_string()))?;
        self.groups.retain(|g| g.instance != name);
        Ok(self.instances.remove(index))
    }

    fn instance_part(&self, instance: &str) -> ModelResult<&Part> {
        let instance = self
            .find_instance(instance)
            .ok_or_else(|| ModelError::InstanceNotFound(instance.to_string()))?;
        self.part(&instance.part)
    }

    // ========================
    // Assembly Set Methods
    // ========================

    pub fn add_group(&mut self, group: AssemblyGroup) -> ModelResult<&AssemblyGroup> {
        if self.find_group(&group.name).is_some() {
            return Err(ModelError::DuplicateEntity(format!(
                "assembly set '{}' already exists",
                group.name
            )));
        }
        let part = self.instance_part(&group.instance)?;
        let limit = match group.kind {
            GroupKind::Nodes => part.node_count(),
            GroupKind::Elements => part.element_count(),
            GroupKind::Faces => {
                return Err(ModelError::UnsupportedOperation(
                    "assembly sets hold nodes or elements".into(),
                ))
            }
        };
        if let Some(missing) = group.keys.iter().find(|&&k| k >= limit) {
            return Err(ModelError::ReferentialIntegrity(format!(
                "assembly set '{}' references key {} outside part '{}'",
                group.name,
                missing,
                part.name()
            )));
        }
        self.groups.push(group);
        Ok(&self.groups[self.groups.len() - 1])
    }

    pub fn find_group(&self, name: &str) -> Option<&AssemblyGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn groups(&self) -> &[AssemblyGroup] {
        &self.groups
    }

    // ========================
    // Interaction Methods
    // ========================

    pub fn add_interaction_property(&mut self, property: InteractionProperty) -> ModelResult<()> {
        if self.interaction_property(property.name()).is_some() {
            return Err(ModelError::DuplicateEntity(format!(
                "interaction property '{}' already exists",
                property.name()
            )));
        }
        self.interaction_properties.push(property);
        Ok(())
    }

    pub fn interaction_property(&self, name: &str) -> Option<&InteractionProperty> {
        self.interaction_properties.iter().find(|p| p.name() == name)
    }

    pub fn interaction_properties(&self) -> &[InteractionProperty] {
        &self.interaction_properties
    }

    pub fn add_interaction(&mut self, interaction: Interaction) -> ModelResult<()> {
        if self.interactions.iter().any(|i| i.name() == interaction.name()) {
            return Err(ModelError::DuplicateEntity(format!(
                "interaction '{}' already exists",
                interaction.name()
            )));
        }
        interaction.check(self)?;
        self.interactions.push(interaction);
        Ok(())
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    // ========================
    // Validation
    // ========================

    /// Check that a node target resolves inside this model
    pub fn check_target(&self, target: &NodeTarget) -> ModelResult<()> {
        match target {
            NodeTarget::PartSet { instance, set } => {
                let part = self.instance_part(instance)?;
                match part.find_group_by_name(set) {
                    Some(Group::Nodes(_)) => Ok(()),
                    _ => Err(ModelError::ReferentialIntegrity(format!(
                        "part '{}' has no node set '{}'",
                        part.name(),
                        set
                    ))),
                }
            }
            NodeTarget::AssemblySet(set) => match self.find_group(set) {
                Some(g) if g.kind == GroupKind::Nodes => Ok(()),
                _ => Err(ModelError::ReferentialIntegrity(format!(
                    "no assembly node set '{set}'"
                ))),
            },
            NodeTarget::Nodes { instance, keys } => {
                let part = self.instance_part(instance)?;
                match keys.iter().find(|&&k| k >= part.node_count()) {
                    Some(&missing) => Err(ModelError::NodeNotFound(missing)),
                    None => Ok(()),
                }
            }
        }
    }

    /// Re-check cross-part invariants that part mutation after
    /// [`add_part`](Self::add_part) may have broken.
    pub fn validate(&self) -> ModelResult<()> {
        for part in self.parts.values() {
            for material in part.materials() {
                self.check_material(material, part.name())?;
            }
        }
        for instance in &self.instances {
            self.part(&instance.part)?;
        }
        for group in &self.groups {
            let part = self.instance_part(&group.instance)?;
            let limit = match group.kind {
                GroupKind::Elements => part.element_count(),
                _ => part.node_count(),
            };
            if group.keys.iter().any(|&k| k >= limit) {
                return Err(ModelError::ReferentialIntegrity(format!(
                    "assembly set '{}' is out of range",
                    group.name
                )));
            }
        }
        for interaction in &self.interactions {
            interaction.check(self)?;
        }
        Ok(())
    }

    /// `*Assembly` block
    pub(crate) fn assembly_block(&self, ctx: &JobContext<'_>) -> String {
        let mut out = format!("*Assembly, name={}\n**\n", self.name);
        for instance in &self.instances {
            out.push_str(&instance.jobdata(ctx));
        }
        for group in &self.groups {
            out.push_str(&group.jobdata(ctx));
        }
        out.push_str("*End Assembly\n");
        out
    }
}
