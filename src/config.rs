//! Model-wide settings: deduplication precision, search tolerance and
//! output formatting.

use serde::{Deserialize, Serialize};

use crate::error::ModelResult;

/// Settings threaded through every [`Part`](crate::part::Part) and
/// [`Model`](crate::model::Model).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Decimal digits used to build geometric keys for node deduplication
    pub precision: usize,
    /// Default search radius and plane tolerance for spatial queries
    pub tolerance: f64,
    /// Allow coincident nodes to be registered
    pub point_overlap: bool,
    /// Report suppressed duplicates at `info` instead of `debug`
    pub verbose: bool,
    /// Decimal digits for reals written to the job-data text
    pub output_precision: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            precision: 3,
            tolerance: 1e-3,
            point_overlap: false,
            verbose: false,
            output_precision: 6,
        }
    }
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `FEA_*` environment variables, keeping the
    /// default for anything absent or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            precision: env_parse("FEA_PRECISION").unwrap_or(defaults.precision),
            tolerance: env_parse("FEA_TOLERANCE")
                .filter(|t: &f64| *t > 0.0)
                .unwrap_or(defaults.tolerance),
            point_overlap: env_flag("FEA_POINT_OVERLAP").unwrap_or(defaults.point_overlap),
            verbose: env_flag("FEA_VERBOSE").unwrap_or(defaults.verbose),
            output_precision: env_parse("FEA_OUTPUT_PRECISION")
                .unwrap_or(defaults.output_precision),
        }
    }

    /// Parse a JSON document; omitted fields take their defaults.
    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_point_overlap(mut self, allow: bool) -> Self {
        self.point_overlap = allow;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_output_precision(mut self, digits: usize) -> Self {
        self.output_precision = digits;
        self
    }

    /// Log level used for suppressed-duplicate messages.
    pub(crate) fn skip_level(&self) -> log::Level {
        if self.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.precision, 3);
        assert!(!config.point_overlap);
        assert_eq!(config.output_precision, 6);
    }

    #[test]
    fn test_builder() {
        let config = ModelConfig::new()
            .with_precision(5)
            .with_point_overlap(true)
            .with_verbose(true);
        assert_eq!(config.precision, 5);
        assert!(config.point_overlap);
        assert_eq!(config.skip_level(), log::Level::Info);
    }

    #[test]
    fn test_from_json_partial() {
        let config = ModelConfig::from_json(r#"{ "tolerance": 0.5, "verbose": true }"#).unwrap();
        assert_eq!(config.tolerance, 0.5);
        assert!(config.verbose);
        assert_eq!(config.precision, 3);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(ModelConfig::from_json("{ precision: }").is_err());
    }
}
