//! Configuration management for cloudctl
//!
//! Handles configuration loading from a TOML file with support for multiple
//! named contexts. Values may reference environment variables with
//! `${VAR}` or `${VAR:-default}`.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::{ConfigError, Result};
use super::resilience::{RetryConfig, WaitConfig};
use crate::client::DEFAULT_API_URL;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Context used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_context: Option<String>,
    /// Map of context name -> context configuration
    #[serde(default)]
    pub contexts: HashMap<String, Context>,
}

/// A named set of credentials and settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait: Option<WaitConfig>,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            access_token: None,
            api_url: default_api_url(),
            retry: None,
            wait: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Config {
    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    ///
    /// A missing file yields the default (empty) configuration.
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// All context names, sorted
    pub fn context_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.contexts.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    /// Look up a context by name
    pub fn context(&self, name: &str) -> Result<&Context> {
        self.contexts
            .get(name)
            .ok_or_else(|| ConfigError::ContextNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve the context name to use
    ///
    /// Order: explicit name, then `default_context`, then the alphabetically
    /// first context.
    pub fn resolve_context_name(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(name) = explicit {
            return Ok(name.to_string());
        }

        if let Some(ref default) = self.default_context {
            return Ok(default.clone());
        }

        self.context_names()
            .first()
            .map(|name| name.to_string())
            .ok_or_else(|| ConfigError::NoContexts {
                suggestion: "Pass --access-token, set CLOUDCTL_ACCESS_TOKEN, or add a [contexts.<name>] table to the config file.".to_string(),
            })
    }

    /// Resolve and fetch the context to use, if any is configured
    ///
    /// Returns `Ok(None)` when the file defines no contexts and none was
    /// asked for explicitly.
    pub fn resolve_context(&self, explicit: Option<&str>) -> Result<Option<(String, &Context)>> {
        match self.resolve_context_name(explicit) {
            Ok(name) => {
                let context = self.context(&name)?;
                Ok(Some((name, context)))
            }
            Err(ConfigError::NoContexts { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Get the path to the configuration file
    ///
    /// On Linux: ~/.config/cloudctl/config.toml
    /// On macOS: ~/.config/cloudctl/config.toml if that directory exists,
    /// otherwise ~/Library/Application Support/cloudctl/config.toml
    /// On Windows: %APPDATA%\cloudctl\config\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("cloudctl")
                    .join("config.toml");

                if linux_style_path
                    .parent()
                    .map(|p| p.exists())
                    .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs = ProjectDirs::from("", "", "cloudctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in config content
    ///
    /// Unset variables without a default are left as-is so contexts that
    /// are never used don't fail to load.
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
