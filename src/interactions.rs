//! Interaction properties and interactions between instances

use serde::{Deserialize, Serialize};

use crate::elements::Group;
use crate::error::{ModelError, ModelResult};
use crate::jobdata::{real, JobContext, JobData};
use crate::model::{Model, NodeTarget};

/// Contact behaviour referenced by surface interactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InteractionProperty {
    /// Penalty friction with coefficient `mu`
    Friction { name: String, mu: f64 },
    /// Hard normal contact, frictionless
    HardContact { name: String },
}

impl InteractionProperty {
    pub fn friction(name: impl Into<String>, mu: f64) -> Self {
        Self::Friction {
            name: name.into(),
            mu,
        }
    }

    pub fn hard_contact(name: impl Into<String>) -> Self {
        Self::HardContact { name: name.into() }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Friction { name, .. } | Self::HardContact { name } => name,
        }
    }
}

impl JobData for InteractionProperty {
    fn jobdata(&self, _ctx: &JobContext<'_>) -> String {
        match self {
            Self::Friction { name, mu } => format!(
                "*Surface Interaction, name={}\n*Friction\n{},\n",
                name,
                real(*mu)
            ),
            Self::HardContact { name } => format!(
                "*Surface Interaction, name={name}\n*Surface Behavior, pressure-overclosure=HARD\n"
            ),
        }
    }
}

/// Element-face surface of an instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceTarget {
    pub instance: String,
    pub surface: String,
}

impl SurfaceTarget {
    pub fn new(instance: impl Into<String>, surface: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
            surface: surface.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("{}.{}", self.instance, self.surface)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Interaction {
    /// Multi-point constraint tying the slave node to the master node
    NodeTie {
        name: String,
        master: NodeTarget,
        slave: NodeTarget,
    },
    /// Contact pair between two surfaces
    SurfaceContact {
        name: String,
        master: SurfaceTarget,
        slave: SurfaceTarget,
        property: String,
    },
}

impl Interaction {
    pub fn node_tie(name: impl Into<String>, master: NodeTarget, slave: NodeTarget) -> Self {
        Self::NodeTie {
            name: name.into(),
            master,
            slave,
        }
    }

    pub fn surface_contact(
        name: impl Into<String>,
        master: SurfaceTarget,
        slave: SurfaceTarget,
        property: impl Into<String>,
    ) -> Self {
        Self::SurfaceContact {
            name: name.into(),
            master,
            slave,
            property: property.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::NodeTie { name, .. } | Self::SurfaceContact { name, .. } => name,
        }
    }

    /// Resolve every reference against `model`
    pub(crate) fn check(&self, model: &Model) -> ModelResult<()> {
        match self {
            Self::NodeTie { name, master, slave } => {
                for target in [master, slave] {
                    model.check_target(target)?;
                    if target.labels().len() != 1 {
                        return Err(ModelError::InvalidArgument(format!(
                            "tie '{name}' needs a single node or node set on each side"
                        )));
                    }
                }
                Ok(())
            }
            Self::SurfaceContact {
                master,
                slave,
                property,
                ..
            } => {
                if model.interaction_property(property).is_none() {
                    return Err(ModelError::MissingDependency(format!(
                        "interaction property '{property}' is not defined"
                    )));
                }
                for surface in [master, slave] {
                    let instance = model
                        .find_instance(&surface.instance)
                        .ok_or_else(|| ModelError::InstanceNotFound(surface.instance.clone()))?;
                    let part = model.part(&instance.part)?;
                    if !matches!(part.find_group_by_name(&surface.surface), Some(Group::Faces(_))) {
                        return Err(ModelError::ReferentialIntegrity(format!(
                            "part '{}' has no surface '{}'",
                            part.name(),
                            surface.surface
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

impl JobData for Interaction {
    fn jobdata(&self, _ctx: &JobContext<'_>) -> String {
        match self {
            Self::NodeTie { name, master, slave } => format!(
                "** Constraint: {}\n*MPC\nTIE, {}, {}\n",
                name,
                slave.labels().join(", "),
                master.labels().join(", ")
            ),
            Self::SurfaceContact {
                name,
                master,
                slave,
                property,
            } => format!(
                "** Interaction: {}\n*Contact Pair, interaction={}\n{}, {}\n",
                name,
                property,
                slave.label(),
                master.label()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, FacesGroup, Material, Node, NodesGroup, Section};
    use crate::error::ErrorKind;
    use crate::part::Part;
    use crate::problem::Problem;

    fn model() -> Model {
        let mut part = Part::new("block");
        for xyz in [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ] {
            part.add_node(Node::from_coords(xyz)).unwrap();
        }
        let steel = Material::elastic_isotropic("steel", 210e9, 0.3, 7850.0);
        part.add_element(Element::solid(vec![0, 1, 2, 3], Section::solid("solid", steel)))
            .unwrap();
        part.add_group(FacesGroup::new("bottom").with_face(0, "S1")).unwrap();
        part.add_group(NodesGroup::new("apex").with_keys([3])).unwrap();
        let mut model = Model::new("m");
        model.add_part(part).unwrap();
        model
    }

    #[test]
    fn test_contact_requires_property() {
        let mut model = model();
        let contact = Interaction::surface_contact(
            "c1",
            SurfaceTarget::new("block-1", "bottom"),
            SurfaceTarget::new("block-1", "bottom"),
            "rough",
        );
        let err = model.add_interaction(contact.clone()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingDependency);
        model
            .add_interaction_property(InteractionProperty::friction("rough", 0.3))
            .unwrap();
        model.add_interaction(contact).unwrap();
        assert_eq!(model.interactions().len(), 1);
    }

    #[test]
    fn test_contact_requires_surface() {
        let mut model = model();
        model
            .add_interaction_property(InteractionProperty::hard_contact("hard"))
            .unwrap();
        let contact = Interaction::surface_contact(
            "c1",
            SurfaceTarget::new("block-1", "apex"),
            SurfaceTarget::new("block-1", "bottom"),
            "hard",
        );
        assert_eq!(
            model.add_interaction(contact).unwrap_err().kind(),
            ErrorKind::ReferentialIntegrity
        );
    }

    #[test]
    fn test_tie_rendering() {
        let mut model = model();
        let tie = Interaction::node_tie(
            "t1",
            NodeTarget::part_set("block-1", "apex"),
            NodeTarget::nodes("block-1", [0]),
        );
        model.add_interaction(tie.clone()).unwrap();
        let problem = Problem::new("p");
        let ctx = JobContext::new(&model, &problem);
        assert_eq!(tie.jobdata(&ctx), "** Constraint: t1\n*MPC\nTIE, block-1.1, block-1.apex\n");

        let wide = Interaction::node_tie(
            "t2",
            NodeTarget::nodes("block-1", [0, 1]),
            NodeTarget::nodes("block-1", [2]),
        );
        assert_eq!(model.add_interaction(wide).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_friction_rendering() {
        let model = Model::new("m");
        let problem = Problem::new("p");
        let ctx = JobContext::new(&model, &problem);
        assert_eq!(
            InteractionProperty::friction("rough", 0.3).jobdata(&ctx),
            "*Surface Interaction, name=rough\n*Friction\n0.3,\n"
        );
    }
}
