//! Unit tests for settings loading and validation
//!
//! Tests cover:
//! - Required DATABASE_URL / SECRET_KEY
//! - Weak and short secret rejection
//! - DEBUG forced off in production
//! - CORS origin parsing
//! - Environment → TOML → default priority
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate the process environment are marked with #[serial].

use serial_test::serial;
use std::collections::HashMap;
use std::env;
use std::io::Write;
use tiraz_common::config::{Settings, TomlConfig, CONFIG_PATH_ENV};
use tiraz_common::{Environment, Error};

const STRONG_SECRET: &str = "f4Jk8Qz1Lm5Vx9Rt2Wp6Ys3Hn7Bc0DgA";

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

fn base_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("DATABASE_URL", "sqlite::memory:"),
        ("SECRET_KEY", STRONG_SECRET),
    ]
}

#[test]
fn test_defaults_applied() {
    let settings = Settings::from_lookup(lookup(&base_pairs())).unwrap();

    assert_eq!(settings.database_url, "sqlite::memory:");
    assert_eq!(settings.algorithm, "HS256");
    assert_eq!(settings.access_token_expire_minutes, 30);
    assert_eq!(settings.api_v1_prefix, "/api/v1");
    assert_eq!(
        settings.cors_origins,
        vec!["http://localhost:3000", "http://localhost:8080"]
    );
    assert_eq!(settings.ai_service_url, "http://ai-models:8000");
    assert_eq!(settings.environment, Environment::Development);
    assert!(!settings.debug);
    assert_eq!(settings.upload_dir.to_string_lossy(), "uploads/measurements");
    assert_eq!(settings.bind_address(), "127.0.0.1:8000");
}

#[test]
fn test_missing_database_url_fails() {
    let result = Settings::from_lookup(lookup(&[("SECRET_KEY", STRONG_SECRET)]));
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("DATABASE_URL")),
        other => panic!("Expected config error, got {:?}", other),
    }
}

#[test]
fn test_missing_secret_key_fails() {
    let result = Settings::from_lookup(lookup(&[("DATABASE_URL", "sqlite::memory:")]));
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("SECRET_KEY")),
        other => panic!("Expected config error, got {:?}", other),
    }
}

#[test]
fn test_short_secret_key_fails() {
    let result = Settings::from_lookup(lookup(&[
        ("DATABASE_URL", "sqlite::memory:"),
        ("SECRET_KEY", "f4Jk8Qz1Lm5Vx9Rt2Wp6Ys3Hn7Bc0Dg"), // 31 chars
    ]));
    assert!(result.is_err(), "31-character secret must be rejected");
}

#[test]
fn test_weak_secret_keys_fail() {
    let weak = [
        "your-secret-key-change-this-in-production",
        "my-application-secret-value-0123456789",
        "PasswordPasswordPasswordPassword1",
        "please-change-this-before-deploying-it",
    ];

    for key in weak {
        let result = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("SECRET_KEY", key),
        ]));
        assert!(result.is_err(), "Weak secret should be rejected: {}", key);
    }
}

#[test]
fn test_debug_forced_off_in_production() {
    let mut pairs = base_pairs();
    pairs.push(("ENVIRONMENT", "production"));
    pairs.push(("DEBUG", "true"));

    let settings = Settings::from_lookup(lookup(&pairs)).unwrap();

    assert_eq!(settings.environment, Environment::Production);
    assert!(settings.is_production());
    assert!(!settings.debug);
}

#[test]
fn test_debug_honoured_outside_production() {
    let mut pairs = base_pairs();
    pairs.push(("ENVIRONMENT", "staging"));
    pairs.push(("DEBUG", "1"));

    let settings = Settings::from_lookup(lookup(&pairs)).unwrap();

    assert!(settings.debug);
}

#[test]
fn test_invalid_environment_fails() {
    let mut pairs = base_pairs();
    pairs.push(("ENVIRONMENT", "qa"));
    assert!(Settings::from_lookup(lookup(&pairs)).is_err());
}

#[test]
fn test_token_expiry_must_be_positive() {
    let mut pairs = base_pairs();
    pairs.push(("ACCESS_TOKEN_EXPIRE_MINUTES", "0"));
    assert!(Settings::from_lookup(lookup(&pairs)).is_err());

    let mut pairs = base_pairs();
    pairs.push(("ACCESS_TOKEN_EXPIRE_MINUTES", "soon"));
    assert!(Settings::from_lookup(lookup(&pairs)).is_err());
}

#[test]
fn test_cors_origins_parsed_from_comma_list() {
    let mut pairs = base_pairs();
    pairs.push(("CORS_ORIGINS", "https://tiraz.example, http://localhost:5173 ,"));

    let settings = Settings::from_lookup(lookup(&pairs)).unwrap();

    assert_eq!(
        settings.cors_origins,
        vec!["https://tiraz.example", "http://localhost:5173"]
    );
}

#[test]
fn test_ai_service_url_trailing_slash_trimmed() {
    let mut pairs = base_pairs();
    pairs.push(("AI_SERVICE_URL", "http://localhost:8080/"));

    let settings = Settings::from_lookup(lookup(&pairs)).unwrap();

    assert_eq!(settings.ai_service_url, "http://localhost:8080");
}

#[test]
fn test_ai_service_url_requires_http_scheme() {
    let mut pairs = base_pairs();
    pairs.push(("AI_SERVICE_URL", "ai-models:8000"));
    assert!(Settings::from_lookup(lookup(&pairs)).is_err());
}

#[test]
fn test_env_overrides_toml_file() {
    let file = TomlConfig::parse(
        r#"
database_url = "sqlite://from-file.db"
secret_key = "f4Jk8Qz1Lm5Vx9Rt2Wp6Ys3Hn7Bc0DgA"
port = 9100
environment = "staging"
"#,
    )
    .unwrap();

    let env = lookup(&[("PORT", "9200")]);
    let settings = Settings::from_sources(env, Some(&file)).unwrap();

    assert_eq!(settings.database_url, "sqlite://from-file.db");
    assert_eq!(settings.port, 9200, "Environment should win over TOML");
    assert_eq!(settings.environment, Environment::Staging);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let result = TomlConfig::parse("database_url = ");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    env::remove_var(CONFIG_PATH_ENV);
    env::set_var("DATABASE_URL", "sqlite::memory:");
    env::set_var("SECRET_KEY", STRONG_SECRET);
    env::set_var("ENVIRONMENT", "production");
    env::set_var("DEBUG", "true");

    let settings = Settings::from_env();

    env::remove_var("DATABASE_URL");
    env::remove_var("SECRET_KEY");
    env::remove_var("ENVIRONMENT");
    env::remove_var("DEBUG");

    let settings = settings.unwrap();
    assert!(!settings.debug);
    assert_eq!(settings.environment, Environment::Production);
}

#[test]
#[serial]
fn test_explicit_config_file_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "database_url = \"sqlite://explicit.db\"").unwrap();
    writeln!(file, "secret_key = \"{}\"", STRONG_SECRET).unwrap();
    writeln!(file, "cors_origins = [\"https://a.example\", \"https://b.example\"]").unwrap();

    env::remove_var("DATABASE_URL");
    env::remove_var("SECRET_KEY");
    env::remove_var("CORS_ORIGINS");
    env::set_var(CONFIG_PATH_ENV, file.path());

    let settings = Settings::from_env();

    env::remove_var(CONFIG_PATH_ENV);

    let settings = settings.unwrap();
    assert_eq!(settings.database_url, "sqlite://explicit.db");
    assert_eq!(
        settings.cors_origins,
        vec!["https://a.example", "https://b.example"]
    );
}

#[test]
#[serial]
fn test_missing_explicit_config_file_fails() {
    env::set_var(CONFIG_PATH_ENV, "/nonexistent/tiraz-config.toml");

    let result = TomlConfig::discover();

    env::remove_var(CONFIG_PATH_ENV);

    assert!(result.is_err());
}
