use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog::PlanCatalog;
use crate::error::{EntitlementError, Result};
use crate::utils::get_env_with_prefix;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration for the entitlement engine.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EntitlementsConfig {
    /// Plan catalog file. The builtin catalog is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

/// A catalog resolved from configuration.
#[derive(Debug, Clone)]
pub enum LoadedCatalog {
    Builtin(&'static PlanCatalog),
    Loaded(PlanCatalog),
}

impl LoadedCatalog {
    #[must_use]
    pub fn catalog(&self) -> &PlanCatalog {
        match self {
            Self::Builtin(catalog) => *catalog,
            Self::Loaded(catalog) => catalog,
        }
    }
}

impl std::ops::Deref for LoadedCatalog {
    type Target = PlanCatalog;

    fn deref(&self) -> &PlanCatalog {
        self.catalog()
    }
}

impl EntitlementsConfig {
    /// Resolve the plan catalog once for the lifetime of the process.
    ///
    /// # Errors
    ///
    /// Returns catalog errors from [`PlanCatalog::from_path`] when a path is
    /// configured.
    pub fn load_catalog(&self) -> Result<LoadedCatalog> {
        match &self.catalog_path {
            None => {
                tracing::debug!("using builtin plan catalog");
                Ok(LoadedCatalog::Builtin(PlanCatalog::builtin()))
            }
            Some(path) => PlanCatalog::from_path(path).map(LoadedCatalog::Loaded),
        }
    }
}

/// Builder for EntitlementsConfig with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: EntitlementsConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EntitlementsConfig::default(),
        }
    }

    pub fn with_catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.catalog_path = Some(path.into());
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    /// Load configuration from environment variables with WORKSHOP_ prefix
    pub fn from_env(mut self) -> Self {
        if let Some(path) = get_env_with_prefix("CATALOG_PATH") {
            self.config.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }
        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns `EntitlementError::InvalidConfig` for an unknown log level or an
    /// empty catalog path.
    pub fn build(self) -> Result<EntitlementsConfig> {
        if !VALID_LOG_LEVELS.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(EntitlementError::InvalidConfig(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        if let Some(path) = &self.config.catalog_path {
            if path.as_os_str().is_empty() {
                return Err(EntitlementError::InvalidConfig(
                    "Catalog path must not be empty".to_string(),
                ));
            }
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
