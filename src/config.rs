//! Engine tuning knobs.
//!
//! Every field has a default, so a config file only needs to name the
//! values it overrides:
//!
//! ```json
//! { "default_categories": 4, "max_subset_cells": 10000000 }
//! ```

use crate::core::error::{EngineError, Result};
use crate::core::money::TOLERANCE;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by the engine components and the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of clusters the categorizer aims for when none is given.
    pub default_categories: usize,
    /// Upper bound on k-means refinement rounds.
    pub max_kmeans_iterations: usize,
    /// Centroids moving less than this are considered settled.
    pub convergence_threshold: Decimal,
    /// Shortest word (in characters) that may become a category label.
    pub min_label_word_len: usize,
    /// Ceiling on `eligible_expenses * (target_cents + 1)` for the subset optimizer.
    pub max_subset_cells: u64,
    /// Scheduling window used when the caller does not give one.
    pub default_schedule_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_categories: 3,
            max_kmeans_iterations: 100,
            convergence_threshold: TOLERANCE,
            min_label_word_len: 4,
            max_subset_cells: 50_000_000,
            default_schedule_days: 30,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_kmeans_iterations == 0 {
            return Err(EngineError::Config(
                "max_kmeans_iterations must be at least 1".into(),
            ));
        }
        if self.convergence_threshold <= Decimal::ZERO {
            return Err(EngineError::Config(
                "convergence_threshold must be positive".into(),
            ));
        }
        if self.max_subset_cells == 0 {
            return Err(EngineError::Config("max_subset_cells must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_categories, 3);
        assert_eq!(config.convergence_threshold, dec!(0.01));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "default_categories": 5 }"#).unwrap();
        assert_eq!(config.default_categories, 5);
        assert_eq!(config.max_kmeans_iterations, 100);
        assert_eq!(config.default_schedule_days, 30);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EngineConfig::from_json(r#"{ "max_kmeans_iterations": 0 }"#).is_err());
        assert!(EngineConfig::from_json(r#"{ "convergence_threshold": "-1" }"#).is_err());
        assert!(EngineConfig::from_json(r#"{ "max_subset_cells": 0 }"#).is_err());
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(EngineError::Config(_))
        ));
    }
}
