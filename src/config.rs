//! Configuration management

use anyhow::{Result, Context};
use std::path::Path;
use std::fs;
use serde::{Deserialize, Serialize};
use autotest::{DiscoveryOrder, Tag, TestDiscovery, TestRunnerConfig};
use autotest::test_discovery::DEFAULT_PREFIX;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Reporter used for the run
    #[serde(default)]
    pub reporter: ReporterKind,

    /// Show per-test progress and output
    #[serde(default)]
    pub verbose: bool,

    /// Discovery and selection
    #[serde(default)]
    pub runner: RunnerSection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    #[default]
    Console,
    Json,
    Junit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSection {
    /// Order of discovered tests
    #[serde(default)]
    pub order: DiscoveryOrder,

    /// Name prefix that marks a registered case as a test
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Only run tests with one of these tags
    #[serde(default)]
    pub include_tags: Vec<Tag>,

    /// Never run tests with one of these tags
    #[serde(default)]
    pub exclude_tags: Vec<Tag>,

    /// Only run tests whose name contains this
    #[serde(default)]
    pub filter: Option<String>,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            order: DiscoveryOrder::default(),
            prefix: default_prefix(),
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
            filter: None,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file; no path means defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let Some(config_path) = config_path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: HarnessConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    pub fn discovery(&self) -> TestDiscovery {
        TestDiscovery::new(self.runner.prefix.clone(), self.runner.order)
    }

    pub fn runner_config(&self, local: bool) -> TestRunnerConfig {
        TestRunnerConfig {
            local,
            filter: self.runner.filter.clone(),
            include_tags: self.runner.include_tags.iter().cloned().collect(),
            exclude_tags: self.runner.exclude_tags.iter().cloned().collect(),
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serialization() {
        let config = HarnessConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: HarnessConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.reporter, parsed.reporter);
        assert_eq!(config.runner.prefix, parsed.runner.prefix);
    }

    #[test]
    fn test_config_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("autotest.toml");
        fs::write(&config_path, r#"
reporter = "json"

[runner]
order = "declaration"
exclude_tags = ["long"]
filter = "fast"
"#).unwrap();

        let config = HarnessConfig::load(Some(&config_path)).unwrap();
        assert_eq!(config.reporter, ReporterKind::Json);
        assert_eq!(config.runner.order, DiscoveryOrder::Declaration);
        assert_eq!(config.runner.prefix, "test_");

        let runner = config.runner_config(false);
        assert!(runner.exclude_tags.contains(&Tag::LONG));
        assert_eq!(runner.filter.as_deref(), Some("fast"));
    }

    #[test]
    fn test_missing_path_means_defaults() {
        let config = HarnessConfig::load(None).unwrap();
        assert_eq!(config.reporter, ReporterKind::Console);
        assert!(!config.verbose);
    }

    #[test]
    fn test_unreadable_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = HarnessConfig::load(Some(&temp_dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
