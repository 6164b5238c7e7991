//! Analysis problem: boundary conditions, steps and the job writer

mod bcs;
mod loads;
mod outputs;
mod steps;

pub use bcs::{BoundaryCondition, Restraint};
pub use loads::{GravityLoad, Load, LoadOperation, PointLoad};
pub use outputs::{FieldOutput, HistoryOutput};
pub use steps::{ModalStep, StaticStep, Step};

use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ModelError, ModelResult};
use crate::jobdata::InputFile;
use crate::model::Model;

/// Initial boundary conditions plus an ordered list of steps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Problem {
    name: String,
    description: Option<String>,
    bcs: Vec<BoundaryCondition>,
    steps: Vec<Step>,
}

impl Problem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
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

    /// Add an initial boundary condition; names are unique
    pub fn add_bc(&mut self, bc: BoundaryCondition) -> ModelResult<&BoundaryCondition> {
        if self.bcs.iter().any(|b| b.name == bc.name) {
            return Err(ModelError::DuplicateEntity(format!(
                "boundary condition '{}'",
                bc.name
            )));
        }
        self.bcs.push(bc);
        Ok(&self.bcs[self.bcs.len() - 1])
    }

    /// Append a step; steps run in insertion order
    pub fn add_step(&mut self, step: impl Into<Step>) -> ModelResult<&Step> {
        let step = step.into();
        if self.steps.iter().any(|s| s.name() == step.name()) {
            return Err(ModelError::DuplicateEntity(format!("step '{}'", step.name())));
        }
        self.steps.push(step);
        Ok(&self.steps[self.steps.len() - 1])
    }

    pub fn bcs(&self) -> &[BoundaryCondition] {
        &self.bcs
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Check the model and every node target this problem references
    pub fn validate(&self, model: &Model) -> ModelResult<()> {
        model.validate()?;
        for bc in &self.bcs {
            model.check_target(&bc.target)?;
        }
        for step in &self.steps {
            for bc in step.displacements() {
                model.check_target(&bc.target)?;
            }
            for target in step.loads().iter().filter_map(|l| l.target()) {
                model.check_target(target)?;
            }
        }
        Ok(())
    }

    /// Validate, render and write `{name}.inp` into `dir`
    pub fn write_input_file(&self, model: &Model, dir: impl AsRef<Path>) -> ModelResult<PathBuf> {
        self.validate(model)?;
        let input = InputFile::new(model, self);
        info!(
            "Writing job '{}' ({} nodes, {} elements)",
            self.name,
            model.node_count(),
            model.element_count()
        );
        input.write_to_dir(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, Material, Node, NodesGroup, Section};
    use crate::error::ErrorKind;
    use crate::model::NodeTarget;
    use crate::part::Part;

    fn cantilever() -> Model {
        let mut part = Part::new("beam");
        part.add_nodes([Node::new(0.0, 0.0, 0.0), Node::new(2.0, 0.0, 0.0)])
            .unwrap();
        let section = Section::rectangular("rect", Material::steel_s355("s355"), 0.1, 0.2);
        part.add_element(Element::beam(0, 1, section)).unwrap();
        part.add_group(NodesGroup::new("root").with_keys([0])).unwrap();
        let mut model = Model::new("frame");
        model.add_part(part).unwrap();
        model
    }

    #[test]
    fn test_unique_names() {
        let mut problem = Problem::new("p");
        let target = NodeTarget::part_set("beam-1", "root");
        problem.add_bc(BoundaryCondition::fixed("fix", target.clone())).unwrap();
        let err = problem.add_bc(BoundaryCondition::pinned("fix", target)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateEntity);

        problem.add_step(StaticStep::new("s1")).unwrap();
        assert!(problem.add_step(ModalStep::new("s1", 5)).is_err());
        assert_eq!(problem.steps().len(), 1);
    }

    #[test]
    fn test_validate_targets() {
        let model = cantilever();
        let mut problem = Problem::new("p");
        problem
            .add_bc(BoundaryCondition::fixed("fix", NodeTarget::part_set("beam-1", "root")))
            .unwrap();
        assert!(problem.validate(&model).is_ok());

        let load = PointLoad::force("f", NodeTarget::nodes("beam-1", [7]), 0.0, 0.0, -1.0);
        problem.add_step(StaticStep::new("s").with_load(load)).unwrap();
        assert!(matches!(problem.validate(&model), Err(ModelError::NodeNotFound(7))));
    }

    #[test]
    fn test_write_input_file() {
        let model = cantilever();
        let mut problem = Problem::new("cantilever");
        problem
            .add_bc(BoundaryCondition::fixed("fix", NodeTarget::part_set("beam-1", "root")))
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = problem.write_input_file(&model, dir.path()).unwrap();
        assert_eq!(path, dir.path().join("cantilever.inp"));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("*Part, name=beam\n"));
        assert!(text.contains("beam-1.root, ENCASTRE\n"));
    }
}
