use std::path::PathBuf;

use serde::Deserialize;

use crate::naming::{FieldRule, default_rules};

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tracksort/config.toml` or `~/.config/tracksort/config.toml`
///
/// Precedence (highest wins):
/// 1) Command-line flags
/// 2) Environment variables (prefix `TRACKSORT__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub store: StoreSettings,
    pub naming: NamingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Folder that is crawled and sorted.
    pub root: PathBuf,
    /// Files per commit, and rows per page for moves and cleanup.
    pub batch_size: usize,
    /// Stop reading new files once this many misplaced tracks were found.
    pub scan_limit: usize,
    /// When false, relocation only updates the catalog.
    pub move_active: bool,
    /// Whether to follow symlinks while crawling.
    pub follow_links: bool,
    /// Non-MP3 files starting with this are deleted while crawling.
    /// Empty disables the cleanup.
    pub artifact_prefix: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Music"),
            batch_size: 100,
            scan_limit: 1000,
            move_active: true,
            follow_links: false,
            artifact_prefix: ".DS".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// SQLite catalog file. Defaults to the XDG data directory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingSettings {
    /// Ordered rules; their renderings are concatenated into the target path.
    pub rules: Vec<FieldRule>,
    /// Optional TOML file with a `[[rules]]` array that replaces `rules`.
    pub rules_file: Option<PathBuf>,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            rules_file: None,
        }
    }
}

/// Layout of a standalone naming rules file.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesFile {
    pub rules: Vec<FieldRule>,
}
