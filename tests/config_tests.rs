//! Configuration system tests
//!
//! Tests configuration loading, validation, and environment overrides

mod common;

use std::fs;
use std::path::PathBuf;

use predicates::prelude::*;
use tempfile::TempDir;

use persona_panel::config::PanelConfig;
use persona_panel::error::Error;

/// Test fixture for configuration testing
struct ConfigFixture {
    _temp_dir: TempDir,
    config_path: PathBuf,
}

impl ConfigFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        Self {
            _temp_dir: temp_dir,
            config_path,
        }
    }

    fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).unwrap();
    }

    fn path(&self) -> &str {
        self.config_path.to_str().unwrap()
    }
}

fn panel_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("persona-panel").unwrap()
}

// ─────────────────────────────────────────────────────────────────
// Valid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_empty_config_uses_defaults() {
    let fixture = ConfigFixture::new();
    fixture.write_config("");

    let config = PanelConfig::from_file(&fixture.config_path).unwrap();
    assert_eq!(config, PanelConfig::default());
}

#[test]
fn test_full_fixture() {
    let config = PanelConfig::from_file(&common::valid_config_fixture()).unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8088);
    assert!(!config.server.cors);
    assert_eq!(config.server.max_body_bytes, 4 * 1024 * 1024);
    assert_eq!(config.generation.base_url, "http://localhost:11434/v1");
    assert_eq!(config.generation.model, "llama3");
    assert_eq!(config.generation.timeout_secs, 30);
    assert_eq!(config.generation.max_tokens, Some(600));
    assert_eq!(config.generation.temperature, Some(0.5));
    assert_eq!(config.panel.max_concurrency, 2);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json_format);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_section_keeps_other_defaults() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[generation]
model = "gpt-4o-mini"
"#,
    );

    let config = PanelConfig::from_file(&fixture.config_path).unwrap();
    assert_eq!(config.generation.model, "gpt-4o-mini");
    assert_eq!(config.generation.base_url, "https://api.openai.com/v1");
    assert_eq!(config.server.port, 3000);
}

// ─────────────────────────────────────────────────────────────────
// Invalid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_invalid_fixture_fails_validation() {
    let config = PanelConfig::from_file(&common::invalid_config_fixture()).unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, Error::ConfigValidation { .. }));
}

#[test]
fn test_malformed_toml() {
    let fixture = ConfigFixture::new();
    fixture.write_config("[server\nport = ");

    let err = PanelConfig::from_file(&fixture.config_path).unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }));

    panel_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("E101"));
}

#[test]
fn test_wrong_type_is_parse_error() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[server]
port = "eighty"
"#,
    );

    let err = PanelConfig::from_file(&fixture.config_path).unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }));
}

#[test]
fn test_invalid_log_level() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[logging]
level = "chatty"
"#,
    );

    panel_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("log level"));
}

// ─────────────────────────────────────────────────────────────────
// Config Show / Init Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_custom() {
    panel_cmd()
        .arg("config")
        .arg("show")
        .arg("--config")
        .arg(common::valid_config_fixture())
        .assert()
        .success()
        .stdout(predicates::str::contains("llama3"))
        .stdout(predicates::str::contains("8088"));
}

#[test]
fn test_config_init_creates_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("panel").join("config.toml");

    panel_cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(&path)
        .assert()
        .success();

    assert!(path.exists());
    let written = PanelConfig::from_file(&path).unwrap();
    assert_eq!(written, PanelConfig::default());
}

#[test]
fn test_config_init_refuses_overwrite() {
    let fixture = ConfigFixture::new();
    fixture.write_config("# existing");

    panel_cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(fixture.path())
        .assert()
        .failure();

    assert_eq!(fs::read_to_string(&fixture.config_path).unwrap(), "# existing");
}

#[test]
fn test_config_init_force_overwrite() {
    let fixture = ConfigFixture::new();
    fixture.write_config("# existing");

    panel_cmd()
        .arg("config")
        .arg("init")
        .arg("--path")
        .arg(fixture.path())
        .arg("--force")
        .assert()
        .success();

    let content = fs::read_to_string(&fixture.config_path).unwrap();
    assert!(content.contains("[generation]"));
}

// ─────────────────────────────────────────────────────────────────
// Environment Variable Override Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_env_override_model() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[generation]
model = "from-file"
"#,
    );

    panel_cmd()
        .arg("config")
        .arg("show")
        .arg("--config")
        .arg(fixture.path())
        .env("PANEL_MODEL", "from-env")
        .assert()
        .success()
        .stdout(predicates::str::contains("from-env"))
        .stdout(predicates::str::contains("from-file").not());
}

#[test]
fn test_env_override_invalid_value_fails_validation() {
    panel_cmd()
        .arg("config")
        .arg("validate")
        .env("PANEL_OPENAI_BASE_URL", "not-a-url")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Base URL"));
}

#[test]
fn test_openai_api_key_fallback() {
    panel_cmd()
        .arg("config")
        .arg("show")
        .env_remove("PANEL_OPENAI_API_KEY")
        .env("OPENAI_API_KEY", "sk-fallback")
        .assert()
        .success()
        .stdout(predicates::str::contains("api_key = \"********\""));
}

// ─────────────────────────────────────────────────────────────────
// Path Expansion Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_tilde_expansion_in_log_file() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[logging]
file = "~/persona-panel/panel.log"
"#,
    );

    let config = PanelConfig::load(Some(fixture.path())).unwrap();
    assert!(!config.logging.file.unwrap().starts_with('~'));
}
