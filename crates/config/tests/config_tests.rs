//! Tests for the `clubhouse-config` crate.
//!
//! These exercise the configuration loader across default handling, file
//! discovery, and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use clubhouse_config::{load, AppConfig};

const ENV_VARS_TO_RESET: &[&str] = &[
    "CLUBHOUSE_CONFIG",
    "CLUBHOUSE__DATABASE__MAX_CONNECTIONS",
    "CLUBHOUSE__DATABASE__URL",
    "CLUBHOUSE__HTTP__ADDRESS",
    "CLUBHOUSE__HTTP__PORT",
];

struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            vars: Vec::new(),
            original_dir: None,
        }
    }

    fn reset_environment(&mut self) {
        for key in ENV_VARS_TO_RESET {
            self.remove_var(key);
        }
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir =
                Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }

        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(path, contents).expect("failed to write config file");
}

#[test]
#[serial]
fn load_uses_default_values_when_no_files_found() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    let config = load().expect("configuration load should succeed without files");
    let defaults = AppConfig::default();

    assert_eq!(config.http.address, defaults.http.address);
    assert_eq!(config.http.port, defaults.http.port);
    assert_eq!(config.database.url, defaults.database.url);
    assert_eq!(config.database.max_connections, defaults.database.max_connections);
}

#[test]
#[serial]
fn load_picks_first_available_file_in_search_order() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "clubhouse.toml",
        r#"
[http]
address = "0.0.0.0"
port = 9000
"#,
    );

    write_config_file(
        temp_dir.path(),
        "config/clubhouse.toml",
        r#"
[http]
address = "10.0.0.1"
port = 9999
"#,
    );

    let config = load().expect("configuration load should succeed with files");

    assert_eq!(config.http.address, "0.0.0.0");
    assert_eq!(config.http.port, 9000);
}

#[test]
#[serial]
fn load_honours_explicit_config_path() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "custom/location.toml",
        r#"
[database]
url = "sqlite://custom.db"
max_connections = 3
"#,
    );

    let explicit = temp_dir.path().join("custom/location.toml");
    ctx.set_var("CLUBHOUSE_CONFIG", explicit.to_string_lossy());

    let config = load().expect("configuration load should succeed with explicit file");

    assert_eq!(config.database.url, "sqlite://custom.db");
    assert_eq!(config.database.max_connections, 3);
}

#[test]
#[serial]
fn environment_overrides_take_precedence_over_files() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.reset_environment();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "clubhouse.toml",
        r#"
[http]
address = "0.0.0.0"
port = 9000
"#,
    );

    ctx.set_var("CLUBHOUSE__HTTP__PORT", "4242");
    ctx.set_var("CLUBHOUSE__DATABASE__URL", "sqlite://override.db");

    let config = load().expect("configuration load should succeed with overrides");

    assert_eq!(config.http.address, "0.0.0.0");
    assert_eq!(config.http.port, 4242);
    assert_eq!(config.database.url, "sqlite://override.db");
}
