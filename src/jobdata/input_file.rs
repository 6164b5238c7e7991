//! Complete input deck for one model and problem

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use super::{part_block, JobContext, JobData};
use crate::error::ModelResult;
use crate::model::Model;
use crate::problem::Problem;

/// A rendered input file, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    name: String,
    content: String,
}

impl InputFile {
    /// Render `model` and `problem`. Sections always appear in the order
    /// parts, assembly, materials, interaction properties, interactions,
    /// boundary conditions, steps.
    pub fn new(model: &Model, problem: &Problem) -> Self {
        let ctx = JobContext::new(model, problem);
        let mut inp = String::new();

        inp.push_str(&format!("** {}\n*Heading\n", model.name()));
        if let Some(description) = model.description() {
            inp.push_str(&format!("{description}\n"));
        }
        inp.push_str(&format!("** Job name: {}\n", problem.name()));
        inp.push_str(&format!("** Generated by: {}\n", env!("CARGO_PKG_NAME")));
        inp.push_str("*PHYSICAL CONSTANTS, ABSOLUTE ZERO=-273.15, STEFAN BOLTZMANN=5.67e-8\n");

        inp.push_str(&banner("PARTS"));
        for part in model.parts() {
            inp.push_str(&part_block(part));
        }

        inp.push_str(&banner("ASSEMBLY"));
        inp.push_str(&model.assembly_block(&ctx));

        inp.push_str(&banner("MATERIALS"));
        for material in model.materials() {
            inp.push_str(&material.jobdata(&ctx));
        }

        inp.push_str(&banner("INTERACTION PROPERTIES"));
        for property in model.interaction_properties() {
            inp.push_str(&property.jobdata(&ctx));
        }

        inp.push_str(&banner("INTERACTIONS"));
        for interaction in model.interactions() {
            inp.push_str(&interaction.jobdata(&ctx));
        }

        inp.push_str(&banner("BOUNDARY"));
        for bc in problem.bcs() {
            inp.push_str(&bc.jobdata(&ctx));
        }

        inp.push_str(&banner("STEPS"));
        for step in problem.steps() {
            inp.push_str(&step.jobdata(&ctx));
        }

        Self {
            name: problem.name().to_string(),
            content: inp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rendered text
    pub fn jobdata(&self) -> &str {
        &self.content
    }

    pub fn file_name(&self) -> String {
        format!("{}.inp", self.name)
    }

    /// Write `{name}.inp` into `dir`, creating it if needed
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> ModelResult<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        fs::write(&path, &self.content)?;
        info!("Input file written to {}", path.display());
        Ok(path)
    }
}

fn banner(title: &str) -> String {
    format!("**\n** {title}\n**\n")
}
