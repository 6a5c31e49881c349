//! Factory configuration (modwire.toml)
//!
//! Names the universal root type that ends every superclass walk and the
//! marker that triggers implicit inclusion of generated modules.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Descriptor factory configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactoryConfig {
    /// Canonical name of the universal root type, excluded from hierarchy walks
    #[serde(default = "default_root_type")]
    pub root_type: String,

    /// Implicit inclusion of generated modules
    #[serde(default)]
    pub implicit_inclusion: ImplicitInclusionConfig,
}

/// Implicit inclusion settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImplicitInclusionConfig {
    /// Whether implicitly included modules are collected at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Canonical name of the marker annotation on generating methods
    #[serde(default = "default_marker")]
    pub marker: String,
}

fn default_root_type() -> String {
    "java.lang.Object".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_marker() -> String {
    "dagger.android.ContributesAndroidInjector".to_string()
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            root_type: default_root_type(),
            implicit_inclusion: ImplicitInclusionConfig::default(),
        }
    }
}

impl Default for ImplicitInclusionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            marker: default_marker(),
        }
    }
}

impl FactoryConfig {
    /// Parse a configuration from a file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: FactoryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_type_name(&self.root_type) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid root type: '{}'. Must be a dotted type name",
                self.root_type
            )));
        }

        if self.implicit_inclusion.enabled && !is_valid_type_name(&self.implicit_inclusion.marker) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid implicit inclusion marker: '{}'. Must be a dotted type name",
                self.implicit_inclusion.marker
            )));
        }

        Ok(())
    }
}

fn is_valid_type_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}
