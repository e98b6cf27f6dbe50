//! Configuration management.
//!
//! Negotiation behavior is configurable from TOML files: which protocol
//! versions the controller offers, its TTP preference order, and the table
//! budget of the searching switch. Every section falls back to the built-in
//! defaults when absent.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::controller::Controller;
use crate::error::{Error, Result};
use crate::protocol::TtpId;
use crate::switch::{BudgetedSearchProvider, DEFAULT_BUDGET, DEFAULT_STEP};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Controller configuration
    #[serde(default)]
    pub controller: ControllerConfig,

    /// Budgeted-search switch configuration
    #[serde(default)]
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }
}

/// Controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Protocol versions to offer
    pub versions: Vec<String>,

    /// TTP preference order, most preferred first
    pub preferences: Vec<TtpId>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let controller = Controller::new();
        Self {
            versions: controller.versions().to_vec(),
            preferences: controller.preferences().to_vec(),
        }
    }
}

impl ControllerConfig {
    /// Build a controller from this section
    pub fn build(&self) -> Controller {
        let versions: Vec<&str> = self.versions.iter().map(String::as_str).collect();
        Controller::new()
            .with_versions(&versions)
            .with_preferences(self.preferences.clone())
    }
}

/// Budgeted-search switch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Shared capacity split across the two tables
    pub budget: i64,

    /// Search granularity
    pub step: i64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { budget: DEFAULT_BUDGET, step: DEFAULT_STEP }
    }
}

impl SearchConfig {
    /// Build the searching IPv4 provider from this section
    pub fn build(&self) -> BudgetedSearchProvider {
        BudgetedSearchProvider::variable_ipv4()
            .with_budget(self.budget)
            .with_step(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::switch::CapabilityProvider;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.controller.versions, ["1.0", "2.0"]);
        assert_eq!(config.controller.preferences.len(), 4);
        assert_eq!(config.search.budget, 10_000);
        assert_eq!(config.search.step, 100);
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [controller]
            versions = ["1.0"]

            [[controller.preferences]]
            name = "org.opennetworking/ttps/IPV4"
            version = "1.0"

            [search]
            budget = 4000
            step = 50
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.controller.versions, ["1.0"]);
        assert_eq!(
            config.controller.preferences,
            [TtpId::new("org.opennetworking/ttps/IPV4", "1.0")]
        );
        assert_eq!(config.search.budget, 4000);
        assert_eq!(config.search.step, 50);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("[search]\nbudget = 500\nstep = 10\n").unwrap();
        assert_eq!(config.controller.versions, ["1.0", "2.0"]);
        assert_eq!(config.search.budget, 500);
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ttpneg.toml");
        std::fs::write(&path, "[search]\nbudget = 2000\nstep = 100\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.search.budget, 2000);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/ttpneg.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_builders_apply_settings() {
        let config: Config = toml::from_str(
            r#"
            [controller]
            versions = ["1.0"]
            preferences = []

            [search]
            budget = 1000
            step = 100
        "#,
        )
        .unwrap();

        let controller = config.controller.build();
        assert_eq!(controller.versions(), ["1.0"]);
        assert!(controller.preferences().is_empty());

        let provider = config.search.build();
        let ttp = TtpId::new(crate::switch::IPV4_TTP, "1.0");
        let params = provider.query(&ttp, &[]).unwrap();
        let total = params.get("MAC table size").unwrap().as_i64()
            + params.get("IPV4 table size").unwrap().as_i64();
        assert_eq!(total, 1000);
    }
}
