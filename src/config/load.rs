use std::{env, fs, path::PathBuf};

use crate::error::Error;
use crate::naming::FieldRule;

use super::schema::{NamingSettings, RulesFile, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `TRACKSORT__`), and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TRACKSORT")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.library.batch_size == 0 {
            return Err("library.batch_size must be >= 1".to_string());
        }
        if self.naming.rules_file.is_none() && self.naming.rules.is_empty() {
            return Err("naming.rules must not be empty".to_string());
        }
        Ok(())
    }

    /// Catalog location: `store.path`, else the XDG data directory.
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .or_else(default_store_path)
            .unwrap_or_else(|| PathBuf::from("catalog.sqlite3"))
    }
}

impl NamingSettings {
    /// The effective rule table: the rules file when one is configured,
    /// otherwise the inline rules.
    pub fn resolve_rules(&self) -> Result<Vec<FieldRule>, Error> {
        let Some(path) = &self.rules_file else {
            return Ok(self.rules.clone());
        };
        let text = fs::read_to_string(path).map_err(|e| Error::RulesFile {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let file: RulesFile = toml::from_str(&text).map_err(|e| Error::RulesFile {
            path: path.clone(),
            message: e.to_string(),
        })?;
        if file.rules.is_empty() {
            return Err(Error::RulesFile {
                path: path.clone(),
                message: "no rules defined".to_string(),
            });
        }
        Ok(file.rules)
    }
}

/// Resolve the config path from `TRACKSORT_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TRACKSORT_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/tracksort/config.toml`
/// or `~/.config/tracksort/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("tracksort").join("config.toml"))
}

/// `$XDG_DATA_HOME/tracksort/catalog.sqlite3`, or the same under
/// `~/.local/share`.
pub fn default_store_path() -> Option<PathBuf> {
    let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("share"))
    };

    data_home.map(|d| d.join("tracksort").join("catalog.sqlite3"))
}
