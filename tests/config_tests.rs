use std::env;
use std::fs;
use std::path::PathBuf;

use serial_test::serial;

use keyadmin::config::{KeyAdminConfig, DEFAULT_PORT, DEFAULT_TIMEOUT_MS};
use keyadmin::KeyAdminError;

const VARS: &[&str] = &[
    "KEYADMIN_HOST",
    "KEYADMIN_PORT",
    "KEYADMIN_PATH",
    "KEYADMIN_USERNAME",
    "KEYADMIN_PASSWORD",
    "KEYADMIN_TIMEOUT_MS",
    "KEYADMIN_VERIFY_TLS",
    "KEYADMIN_USE_TLS",
    "KEYADMIN_DEBUG",
    "KEYADMIN_LOGGING_ENABLED",
    "KEYADMIN_LOG_LEVEL",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

fn write_config(contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("keyadmin-{}.toml", uuid::Uuid::new_v4()));
    fs::write(&path, contents).expect("failed to write config file");
    path
}

#[test]
#[serial]
fn defaults_apply_without_file_or_env() {
    clear_env();

    let config = KeyAdminConfig::load().unwrap();
    assert_eq!(config.portal.port, DEFAULT_PORT);
    assert_eq!(config.portal.timeout_ms, DEFAULT_TIMEOUT_MS);
    assert_eq!(config.portal.path, "/");
    assert!(config.portal.use_tls);
    assert!(!config.logging.enabled);

    // No host configured yet.
    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn file_values_are_loaded() {
    clear_env();
    let path = write_config(
        r#"
[portal]
host = "ka.example.com"
port = 7443
username = "reseller"
password = "secret"
verify_tls = false

[logging]
enabled = true
level = "debug"
"#,
    );

    let config = KeyAdminConfig::load_from(Some(&path)).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(config.portal.host, "ka.example.com");
    assert_eq!(config.portal.port, 7443);
    assert_eq!(config.portal.credential().login(), "reseller");
    assert!(!config.portal.verify_tls);
    assert_eq!(config.portal.timeout_ms, DEFAULT_TIMEOUT_MS);
    assert_eq!(config.logging.level, "debug");
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    let path = write_config(
        r#"
[portal]
host = "ka.example.com"
port = 7443
"#,
    );

    env::set_var("KEYADMIN_HOST", "ka-staging.example.com");
    env::set_var("KEYADMIN_TIMEOUT_MS", "30000");
    env::set_var("KEYADMIN_USE_TLS", "false");
    env::set_var("KEYADMIN_PASSWORD", "from-env");

    let config = KeyAdminConfig::load_from(Some(&path)).unwrap();
    fs::remove_file(&path).ok();
    clear_env();

    assert_eq!(config.portal.host, "ka-staging.example.com");
    assert_eq!(config.portal.port, 7443);
    assert_eq!(config.portal.timeout_ms, 30_000);
    assert_eq!(config.portal.credential().password(), "from-env");
    assert_eq!(config.portal.endpoint(), "http://ka-staging.example.com:7443/");
}

#[test]
#[serial]
fn unparseable_env_values_are_ignored() {
    clear_env();
    env::set_var("KEYADMIN_HOST", "ka.example.com");
    env::set_var("KEYADMIN_PORT", "not-a-port");
    env::set_var("KEYADMIN_DEBUG", "maybe");

    let config = KeyAdminConfig::load().unwrap();
    clear_env();

    assert_eq!(config.portal.port, DEFAULT_PORT);
    assert!(!config.portal.debug);
}

#[test]
#[serial]
fn missing_explicit_file_is_an_error() {
    clear_env();
    let path = env::temp_dir().join("keyadmin-does-not-exist.toml");

    let err = KeyAdminConfig::load_from(Some(&path)).unwrap_err();
    assert!(matches!(err, KeyAdminError::Config(_)));
}

#[test]
#[serial]
fn invalid_log_level_fails_validation() {
    clear_env();
    env::set_var("KEYADMIN_HOST", "ka.example.com");
    env::set_var("KEYADMIN_LOG_LEVEL", "chatty");

    let config = KeyAdminConfig::load().unwrap();
    clear_env();

    assert!(matches!(config.validate(), Err(KeyAdminError::InvalidConfig(_))));
}
