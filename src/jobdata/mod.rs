//! Job-data generation: the rendering contract and the input-file writer
//!
//! Every boundary condition, load, step, material and assembly entity renders
//! its own fragment through [`JobData`]; [`InputFile`] fixes the section
//! order and concatenates the fragments.

mod input_file;
mod part;

pub use input_file::InputFile;
pub use part::part_block;

use crate::config::ModelConfig;
use crate::model::Model;
use crate::problem::Problem;

/// Keys per line in set data
pub const KEYS_PER_LINE: usize = 15;

/// Read-only context handed to every renderer
#[derive(Debug, Clone, Copy)]
pub struct JobContext<'a> {
    pub model: &'a Model,
    pub problem: &'a Problem,
}

impl<'a> JobContext<'a> {
    pub fn new(model: &'a Model, problem: &'a Problem) -> Self {
        Self { model, problem }
    }

    pub fn config(&self) -> &'a ModelConfig {
        self.model.config()
    }
}

/// Something that renders a fragment of the input file
pub trait JobData {
    fn jobdata(&self, ctx: &JobContext<'_>) -> String;
}

/// `value` with `digits` decimals; never prints `-0`
pub fn fixed(value: f64, digits: usize) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.digits$}")
}

/// Shortest round-trip rendering of a real
pub fn real(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}")
}

/// Comma separated reals
pub fn reals(values: &[f64]) -> String {
    values.iter().map(|v| real(*v)).collect::<Vec<_>>().join(", ")
}

/// 0-based keys as 1-based set data, [`KEYS_PER_LINE`] per line
pub fn key_lines(keys: impl IntoIterator<Item = usize>) -> String {
    let keys: Vec<String> = keys.into_iter().map(|k| (k + 1).to_string()).collect();
    let mut out = String::new();
    for chunk in keys.chunks(KEYS_PER_LINE) {
        out.push_str(&chunk.join(", "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_normalizes_negative_zero() {
        assert_eq!(fixed(-0.0, 3), "0.000");
        assert_eq!(fixed(-1.26, 1), "-1.3");
        assert_eq!(fixed(10.0, 6), "10.000000");
    }

    #[test]
    fn test_real() {
        assert_eq!(real(210e9), "210000000000");
        assert_eq!(real(0.3), "0.3");
    }

    #[test]
    fn test_key_lines_wrap() {
        let text = key_lines(0..16);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1, 2, 3"));
        assert!(lines[0].ends_with("15"));
        assert_eq!(lines[1], "16");
    }
}
