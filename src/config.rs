// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)

//! Resolver configuration.
//!
//! Configuration is optional; every section has defaults.
//!
//! ```toml
//! [resolver]
//! integer_representation = "unsigned"   # "signed" | "unsigned"
//!
//! [logging]
//! level = "info"                        # trace | debug | info | warn | error
//!
//! [output]
//! format = "text"                       # text | json
//! ```
//!
//! # Search Order
//!
//! [`ConfigLoader`] checks, first found wins:
//!
//! 1. Explicit path (if set via `with_path()`)
//! 2. Environment variable `TEMPLATE_ARCHIVAL_CONFIG`
//! 3. Current directory: `./template-archival.toml`
//!
//! An explicit path or environment variable that points at a missing file
//! is an error. If nothing is configured and the default file does not
//! exist, defaults are used.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TemplateError};
use crate::policy_object::IntegerRepresentation;
use crate::resolver::KeyArchivalResolver;

/// Default environment variable for the configuration path.
pub const CONFIG_ENV_VAR: &str = "TEMPLATE_ARCHIVAL_CONFIG";

/// Default configuration file name in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "template-archival.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    /// Resolution settings.
    #[serde(default)]
    pub resolver: ResolverSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[resolver]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverSection {
    /// Integer representation used by the policy object host.
    #[serde(default)]
    pub integer_representation: IntegerRepresentation,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum log level.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented text block.
    #[default]
    Text,
    /// JSON document.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(TemplateError::config(format!(
                "Unknown output format '{other}' (expected 'text' or 'json')"
            ))),
        }
    }
}

impl ResolverConfig {
    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or contains unknown keys.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| TemplateError::config(format!("Invalid TOML: {e}")))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TemplateError::config(format!("TOML serialize: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(TemplateError::config(format!(
                "logging.level '{}' must be one of: {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }

    /// Build a resolver from the configured representation.
    pub fn resolver(&self) -> KeyArchivalResolver {
        KeyArchivalResolver::with_representation(self.resolver.integer_representation)
    }
}

/// Configuration file discovery and loading.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    explicit_path: Option<PathBuf>,
    env_var_name: String,
    search_dir: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader with default settings.
    pub fn new() -> Self {
        Self {
            explicit_path: None,
            env_var_name: CONFIG_ENV_VAR.to_string(),
            search_dir: PathBuf::from("."),
        }
    }

    /// Set an explicit configuration file path.
    ///
    /// When set, only this path will be checked (no discovery).
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.explicit_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable name for path override.
    ///
    /// Default: `TEMPLATE_ARCHIVAL_CONFIG`
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var_name = name.into();
        self
    }

    /// Set the directory searched for the default file.
    ///
    /// Default: the current directory
    pub fn with_search_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.search_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Find the configuration file, if any.
    ///
    /// # Errors
    ///
    /// Fails when an explicit path or the environment variable names a file
    /// that does not exist.
    pub fn find_config_file(&self) -> Result<Option<PathBuf>> {
        if let Some(ref path) = self.explicit_path {
            if path.exists() {
                return Ok(Some(path.clone()));
            }
            return Err(TemplateError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        if let Ok(env_path) = std::env::var(&self.env_var_name) {
            let path = PathBuf::from(&env_path);
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(TemplateError::config(format!(
                "Configuration file from {} not found: {}",
                self.env_var_name, env_path
            )));
        }

        let default_path = self.search_dir.join(DEFAULT_CONFIG_FILE);
        Ok(default_path.exists().then_some(default_path))
    }

    /// Load and validate the configuration.
    ///
    /// Returns defaults when no file is found.
    pub fn load(&self) -> Result<ResolverConfig> {
        let config = match self.find_config_file()? {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    TemplateError::config(format!("Failed to read {}: {e}", path.display()))
                })?;
                ResolverConfig::from_toml(&content)?
            }
            None => ResolverConfig::default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::from_toml("").unwrap();
        assert_eq!(
            config.resolver.integer_representation,
            IntegerRepresentation::Unsigned
        );
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full() {
        let config = ResolverConfig::from_toml(
            r#"
            [resolver]
            integer_representation = "signed"

            [logging]
            level = "debug"

            [output]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.resolver().representation(),
            IntegerRepresentation::Signed
        );
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(ResolverConfig::from_toml("[resolver]\nrepresentation = \"signed\"").is_err());
        assert!(ResolverConfig::from_toml("[resolver]\ninteger_representation = \"int64\"").is_err());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = ResolverConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = ResolverConfig::default();
        config.resolver.integer_representation = IntegerRepresentation::Signed;
        let text = config.to_toml().unwrap();
        assert_eq!(ResolverConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_loader_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[output]\nformat = \"json\"").unwrap();

        let config = ConfigLoader::new().with_path(file.path()).load().unwrap();
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_loader_missing_explicit_path() {
        let result = ConfigLoader::new()
            .with_path("/nonexistent/template-archival.toml")
            .load();
        assert!(matches!(result, Err(TemplateError::Config(_))));
    }

    #[test]
    fn test_loader_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new()
            .with_env_var("TEMPLATE_ARCHIVAL_TEST_UNSET_VAR")
            .with_search_dir(dir.path())
            .load()
            .unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_loader_search_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[resolver]\ninteger_representation = \"signed\"\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_env_var("TEMPLATE_ARCHIVAL_TEST_UNSET_VAR")
            .with_search_dir(dir.path())
            .load()
            .unwrap();
        assert_eq!(
            config.resolver.integer_representation,
            IntegerRepresentation::Signed
        );
    }
}
