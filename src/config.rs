//! Configuration loading.
//!
//! Configuration is read from a TOML file. Every section is optional and
//! falls back to the built-in six-food catalog:
//!
//! ```toml
//! max_calories = 2000
//!
//! [weights]
//! taste = 1
//! cost = 6
//!
//! [[foods]]
//! name = "rice"
//! calories = 100
//! taste = 7
//! cost = 2.5
//! units = "continuous"
//! nutrients = { Protein = 3, Fat = 1, Carbs = 22, Fiber = 2 }
//!
//! [[requirements]]
//! nutrient = "Protein"
//! minimum = 50
//!
//! [sampler]
//! time_limit = 5.0
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::diet::{DietProblem, Food, Requirement, Weights};
use crate::error::Result;
use crate::logging::LoggingConfig;
use crate::solver::SamplerSettings;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_calories: f64,
    pub foods: Vec<Food>,
    pub requirements: Vec<Requirement>,
    pub weights: Weights,
    pub sampler: SamplerSettings,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        let catalog = DietProblem::default_catalog();
        Config {
            max_calories: catalog.max_calories,
            foods: catalog.foods,
            requirements: catalog.requirements,
            weights: Weights::default(),
            sampler: SamplerSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.problem().validate()?;
        self.weights.validate()?;
        self.sampler.validate()
    }

    /// The diet problem described by this configuration.
    pub fn problem(&self) -> DietProblem {
        DietProblem {
            foods: self.foods.clone(),
            requirements: self.requirements.clone(),
            max_calories: self.max_calories,
        }
    }

    pub fn sampler_settings(&self) -> SamplerSettings {
        self.sampler.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::diet::Units;
    use crate::error::DietError;

    #[test]
    fn test_empty_config_uses_catalog() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.problem(), DietProblem::default_catalog());
        assert_eq!(config.weights, Weights::combined());
        assert_eq!(config.sampler.max_nodes, 10_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml_str(
            r#"
            max_calories = 1800

            [weights]
            cost = 2

            [sampler]
            time_limit = 2.5

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.max_calories, 1800.0);
        assert_eq!(config.weights, Weights::new(1.0, 2.0));
        assert_eq!(config.sampler_settings().time_limit, 2.5);
        assert_eq!(config.sampler_settings().max_samples, 1_000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.foods.len(), 6);
    }

    #[test]
    fn test_custom_foods() {
        let config = Config::from_toml_str(
            r#"
            max_calories = 1000

            [[foods]]
            name = "oats"
            calories = 150
            taste = 4
            cost = 0.5
            units = "continuous"
            nutrients = { Protein = 5 }

            [[foods]]
            name = "egg"
            calories = 80
            taste = 6
            cost = 0.3
            units = "discrete"
            nutrients = { Protein = 6 }

            [[requirements]]
            nutrient = "Protein"
            minimum = 20
            "#,
        )
        .unwrap();

        let problem = config.problem();
        assert_eq!(problem.foods.len(), 2);
        assert_eq!(problem.foods[1].units, Units::Discrete);
        assert_eq!(problem.foods[1].attribute("Protein"), Some(6.0));
        assert_eq!(problem.requirements.len(), 1);
    }

    #[test]
    fn test_missing_nutrient_rejected() {
        let err = Config::from_toml_str(
            r#"
            [[foods]]
            name = "oats"
            calories = 150
            taste = 4
            cost = 0.5
            units = "continuous"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, DietError::InvalidDiet(_)));
    }

    #[test]
    fn test_infinite_time_limit_accepted() {
        let config = Config::from_toml_str("[sampler]\ntime_limit = inf\n").unwrap();
        assert_eq!(config.sampler.time_limit, f64::INFINITY);
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let err = Config::from_toml_str("[sampler]\nfeasibility_tol = -1e-5\n").unwrap_err();
        assert!(matches!(err, DietError::InvalidSettings(_)));

        let err = Config::from_toml_str("[sampler]\nintegrality_tol = -0.1\n").unwrap_err();
        assert!(matches!(err, DietError::InvalidSettings(_)));
    }

    #[test]
    fn test_bad_toml() {
        let err = Config::from_toml_str("max_calories = \"lots\"").unwrap_err();
        assert!(matches!(err, DietError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_calories = 2200").unwrap();
        writeln!(file, "[weights]").unwrap();
        writeln!(file, "taste = 2").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.max_calories, 2200.0);
        assert_eq!(config.weights.taste, 2.0);
        assert_eq!(config.weights.cost, 6.0);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, DietError::Io(_)));
    }
}
