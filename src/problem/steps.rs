//! Analysis steps

use serde::{Deserialize, Serialize};

use super::{BoundaryCondition, FieldOutput, HistoryOutput, Load};
use crate::jobdata::{real, reals, JobContext, JobData};

const STEP_RULE: &str = "** ----------------------------------------------------------------\n";

/// Linear or geometrically nonlinear static step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticStep {
    pub name: String,
    /// Large-displacement formulation
    pub nlgeom: bool,
    pub max_increments: usize,
    pub initial_increment: f64,
    pub time_period: f64,
    pub min_increment: f64,
    pub max_increment: f64,
    pub loads: Vec<Load>,
    /// Boundary conditions activated in this step
    pub displacements: Vec<BoundaryCondition>,
    pub field_output: FieldOutput,
    pub history_output: Option<HistoryOutput>,
}

impl StaticStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nlgeom: false,
            max_increments: 100,
            initial_increment: 1.0,
            time_period: 1.0,
            min_increment: 1e-5,
            max_increment: 1.0,
            loads: Vec::new(),
            displacements: Vec::new(),
            field_output: FieldOutput::default(),
            history_output: Some(HistoryOutput),
        }
    }

    pub fn with_nlgeom(mut self, nlgeom: bool) -> Self {
        self.nlgeom = nlgeom;
        self
    }

    /// Incrementation: initial, total period, minimum and maximum increment
    pub fn with_increments(mut self, initial: f64, period: f64, min: f64, max: f64) -> Self {
        self.initial_increment = initial;
        self.time_period = period;
        self.min_increment = min;
        self.max_increment = max;
        self
    }

    pub fn with_max_increments(mut self, max_increments: usize) -> Self {
        self.max_increments = max_increments;
        self
    }

    pub fn with_load(mut self, load: impl Into<Load>) -> Self {
        self.loads.push(load.into());
        self
    }

    pub fn with_displacement(mut self, bc: BoundaryCondition) -> Self {
        self.displacements.push(bc);
        self
    }

    pub fn with_field_output(mut self, output: FieldOutput) -> Self {
        self.field_output = output;
        self
    }

    pub fn without_history_output(mut self) -> Self {
        self.history_output = None;
        self
    }
}

/// Natural frequency extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalStep {
    pub name: String,
    pub modes: usize,
}

impl ModalStep {
    pub fn new(name: impl Into<String>, modes: usize) -> Self {
        Self {
            name: name.into(),
            modes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Static(StaticStep),
    Modal(ModalStep),
}

impl Step {
    pub fn name(&self) -> &str {
        match self {
            Self::Static(s) => &s.name,
            Self::Modal(s) => &s.name,
        }
    }

    pub fn loads(&self) -> &[Load] {
        match self {
            Self::Static(s) => &s.loads,
            Self::Modal(_) => &[],
        }
    }

    pub fn displacements(&self) -> &[BoundaryCondition] {
        match self {
            Self::Static(s) => &s.displacements,
            Self::Modal(_) => &[],
        }
    }
}

impl From<StaticStep> for Step {
    fn from(step: StaticStep) -> Self {
        Self::Static(step)
    }
}

impl From<ModalStep> for Step {
    fn from(step: ModalStep) -> Self {
        Self::Modal(step)
    }
}

impl JobData for Step {
    fn jobdata(&self, ctx: &JobContext<'_>) -> String {
        let mut out = String::from(STEP_RULE);
        out.push_str(&format!("**\n** STEP: {}\n**\n", self.name()));
        match self {
            Self::Static(step) => {
                out.push_str(&format!(
                    "*Step, name={}, nlgeom={}, inc={}\n*Static\n{}\n",
                    step.name,
                    if step.nlgeom { "YES" } else { "NO" },
                    step.max_increments,
                    reals(&[
                        step.initial_increment,
                        step.time_period,
                        step.min_increment,
                        step.max_increment,
                    ])
                ));
                out.push_str("**\n** BOUNDARY CONDITIONS\n**\n");
                for bc in &step.displacements {
                    out.push_str(&bc.jobdata(ctx));
                }
                out.push_str("**\n** LOADS\n**\n");
                for load in &step.loads {
                    out.push_str(&load.jobdata(ctx));
                }
                out.push_str("**\n** OUTPUT REQUESTS\n**\n");
                out.push_str(&step.field_output.jobdata(ctx));
                if let Some(history) = &step.history_output {
                    out.push_str(&history.jobdata(ctx));
                }
            }
            Self::Modal(step) => {
                out.push_str(&format!(
                    "*Step, name={}\n*Frequency, eigensolver=Lanczos\n{},\n",
                    step.name,
                    real(step.modes as f64)
                ));
                out.push_str("**\n** OUTPUT REQUESTS\n**\n");
                out.push_str(&FieldOutput::new(&["U"], &[]).jobdata(ctx));
            }
        }
        out.push_str("*End Step\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, NodeTarget};
    use crate::problem::{PointLoad, Problem};

    fn render(step: impl Into<Step>) -> String {
        let model = Model::new("m");
        let problem = Problem::new("p");
        step.into().jobdata(&JobContext::new(&model, &problem))
    }

    #[test]
    fn test_static_step_layout() {
        let step = StaticStep::new("load")
            .with_load(PointLoad::force("f", NodeTarget::part_set("a-1", "tip"), 0.0, -10.0, 0.0));
        let text = render(step);
        assert!(text.starts_with(STEP_RULE));
        assert!(text.contains("*Step, name=load, nlgeom=NO, inc=100\n*Static\n1, 1, 0.00001, 1\n"));
        let loads = text.find("** LOADS").unwrap();
        let cload = text.find("*Cload").unwrap();
        let output = text.find("*Output, field").unwrap();
        assert!(loads < cload && cload < output);
        assert!(text.contains("*Node Output\nU, RF\n"));
        assert!(text.ends_with("*Output, history, variable=PRESELECT\n*End Step\n"));
    }

    #[test]
    fn test_modal_step() {
        let text = render(ModalStep::new("modes", 10));
        assert!(text.contains("*Frequency, eigensolver=Lanczos\n10,\n"));
        assert!(text.ends_with("*End Step\n"));
    }
}
