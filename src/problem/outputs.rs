//! Output requests

use serde::{Deserialize, Serialize};

use crate::jobdata::{JobContext, JobData};

/// Field output variables written at every increment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOutput {
    pub node_outputs: Vec<String>,
    pub element_outputs: Vec<String>,
}

impl Default for FieldOutput {
    fn default() -> Self {
        Self {
            node_outputs: vec!["U".into(), "RF".into()],
            element_outputs: vec!["S".into(), "E".into()],
        }
    }
}

impl FieldOutput {
    pub fn new(node_outputs: &[&str], element_outputs: &[&str]) -> Self {
        Self {
            node_outputs: node_outputs.iter().map(|s| s.to_string()).collect(),
            element_outputs: element_outputs.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl JobData for FieldOutput {
    fn jobdata(&self, _ctx: &JobContext<'_>) -> String {
        let mut out = String::from("*Output, field\n");
        if !self.node_outputs.is_empty() {
            out.push_str(&format!("*Node Output\n{}\n", self.node_outputs.join(", ")));
        }
        if !self.element_outputs.is_empty() {
            out.push_str(&format!("*Element Output\n{}\n", self.element_outputs.join(", ")));
        }
        out
    }
}

/// History output, preselected variables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryOutput;

impl JobData for HistoryOutput {
    fn jobdata(&self, _ctx: &JobContext<'_>) -> String {
        "*Output, history, variable=PRESELECT\n".to_string()
    }
}
