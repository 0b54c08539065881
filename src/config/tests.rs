use super::load::{default_config_path, default_store_path, resolve_config_path};
use super::schema::*;
use crate::naming::{FieldMode, LogicalField};
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_tracksort_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("TRACKSORT_CONFIG_PATH", "/tmp/tracksort-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/tracksort-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("tracksort")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("tracksort")
            .join("config.toml")
    );
}

#[test]
fn default_store_path_falls_back_to_local_share() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_DATA_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_store_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/share/tracksort/catalog.sqlite3")
    );

    let settings = Settings {
        store: StoreSettings {
            path: Some("/srv/catalog.db".into()),
        },
        ..Settings::default()
    };
    assert_eq!(settings.store_path(), std::path::PathBuf::from("/srv/catalog.db"));
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert_eq!(s.library.batch_size, 100);
    assert!(s.library.move_active);
    assert_eq!(s.naming.rules.len(), 5);
}

#[test]
fn validate_rejects_zero_batch_size_and_empty_rules() {
    let mut s = Settings::default();
    s.library.batch_size = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.naming.rules.clear();
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[library]
root = "/srv/music"
batch_size = 25
scan_limit = 7
move_active = false
artifact_prefix = "._"

[store]
path = "/srv/catalog.sqlite3"

[[naming.rules]]
field = "artist"
mode = "group"
prefix = "/"
default = "Unknown"

[[naming.rules]]
field = "genre"
mode = "value"
default = "Misc"
values = [{ from = "Rock", to = "Guitars" }]

[[naming.rules]]
field = "title"
prefix = "/"
suffix = ".mp3"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TRACKSORT_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("TRACKSORT__LIBRARY__SCAN_LIMIT");

    let s = Settings::load().unwrap();
    assert_eq!(s.library.root, std::path::PathBuf::from("/srv/music"));
    assert_eq!(s.library.batch_size, 25);
    assert_eq!(s.library.scan_limit, 7);
    assert!(!s.library.move_active);
    assert_eq!(s.library.artifact_prefix, "._");
    assert_eq!(s.store_path(), std::path::PathBuf::from("/srv/catalog.sqlite3"));

    let rules = &s.naming.rules;
    assert_eq!(rules.len(), 3);
    assert_eq!(rules[0].field, LogicalField::Artist);
    assert_eq!(rules[0].mode, FieldMode::Group);
    assert_eq!(rules[0].default.as_deref(), Some("Unknown"));
    assert_eq!(rules[1].lookup("Rock"), Some("Guitars"));
    assert_eq!(rules[2].mode, FieldMode::Default);
    assert_eq!(rules[2].suffix.as_deref(), Some(".mp3"));
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[library]
scan_limit = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TRACKSORT_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("TRACKSORT__LIBRARY__SCAN_LIMIT", "3");

    let s = Settings::load().unwrap();
    assert_eq!(s.library.scan_limit, 3);
}

#[test]
fn rules_file_replaces_inline_rules() {
    let dir = tempfile::tempdir().unwrap();
    let rules_path = dir.path().join("naming.toml");
    std::fs::write(
        &rules_path,
        r#"
[[rules]]
field = "TRACK"
mode = "numeric"
width = 2
"#,
    )
    .unwrap();

    let naming = NamingSettings {
        rules_file: Some(rules_path),
        ..NamingSettings::default()
    };
    let rules = naming.resolve_rules().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].field, LogicalField::Track);
    assert_eq!(rules[0].width, Some(2));
}

#[test]
fn broken_rules_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let rules_path = dir.path().join("naming.toml");
    std::fs::write(&rules_path, "[[rules]]\nfield = \"composer\"\n").unwrap();

    let naming = NamingSettings {
        rules_file: Some(rules_path.clone()),
        ..NamingSettings::default()
    };
    assert!(naming.resolve_rules().is_err());

    let missing = NamingSettings {
        rules_file: Some(dir.path().join("missing.toml")),
        ..NamingSettings::default()
    };
    assert!(missing.resolve_rules().is_err());
}
