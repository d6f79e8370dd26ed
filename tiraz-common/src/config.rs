//! Settings loading and validation
//!
//! Each key is resolved with the following priority:
//! 1. Environment variable (highest priority)
//! 2. TOML config file, keyed by the lower-case variable name
//! 3. Compiled default (fallback)
//!
//! `DATABASE_URL` and `SECRET_KEY` have no default. Construction fails if either
//! is missing, or if the secret is short or a known placeholder value.

use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Minimum accepted length for `SECRET_KEY`
pub const MIN_SECRET_KEY_LEN: usize = 32;

/// Placeholder values rejected as `SECRET_KEY` (case-insensitive substring match)
pub const WEAK_SECRET_KEYS: &[&str] = &[
    "your-secret-key",
    "your-secret-key-change-this-in-production",
    "change-this",
    "secret",
    "password",
];

/// Environment variable naming an explicit TOML config file
pub const CONFIG_PATH_ENV: &str = "TIRAZ_CONFIG";

const DEFAULT_ALGORITHM: &str = "HS256";
const DEFAULT_TOKEN_EXPIRE_MINUTES: u32 = 30;
const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:8080";
const DEFAULT_AI_SERVICE_URL: &str = "http://ai-models:8000";
const DEFAULT_UPLOAD_DIR: &str = "uploads/measurements";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Deployment tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            "test" | "testing" => Ok(Environment::Test),
            other => Err(Error::Config(format!(
                "ENVIRONMENT must be one of development, staging, production, test (got '{}')",
                other
            ))),
        }
    }
}

/// Optional TOML config file tier
///
/// Keys are the lower-case environment variable names, e.g.:
///
/// ```toml
/// database_url = "sqlite://tiraz.db"
/// ai_service_url = "http://localhost:8080"
/// cors_origins = ["http://localhost:3000", "https://tiraz.example"]
/// ```
#[derive(Debug, Clone, Default)]
pub struct TomlConfig {
    path: Option<PathBuf>,
    table: toml::Table,
}

impl TomlConfig {
    /// Parse config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        Ok(Self { path: None, table })
    }

    /// Load config from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read TOML failed ({}): {}", path.display(), e))
        })?;
        let mut config = Self::parse(&content)?;
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Locate the config file, if any
    ///
    /// `TIRAZ_CONFIG` must point at an existing file when set. Otherwise
    /// `./tiraz.toml` and then `<config dir>/tiraz/config.toml` are tried;
    /// a missing file at either location is not an error.
    pub fn discover() -> Result<Option<Self>> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load(Path::new(&explicit)).map(Some);
        }

        let candidates = [
            Some(PathBuf::from("tiraz.toml")),
            dirs::config_dir().map(|d| d.join("tiraz").join("config.toml")),
        ];

        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                return Self::load(&path).map(Some);
            }
        }

        Ok(None)
    }

    /// Path the config was loaded from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up a key, rendering scalars and arrays as the env-var string form
    pub fn get(&self, key: &str) -> Option<String> {
        self.table.get(&key.to_lowercase()).map(render_value)
    }
}

fn render_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

/// Validated application settings
#[derive(Clone)]
pub struct Settings {
    /// Database connection URL (e.g. `sqlite://tiraz.db`)
    pub database_url: String,
    /// Signing secret for access tokens
    pub secret_key: String,
    /// Token signing algorithm
    pub algorithm: String,
    pub access_token_expire_minutes: u32,
    /// Path prefix for versioned API routes
    pub api_v1_prefix: String,
    pub cors_origins: Vec<String>,
    /// Base URL of the measurement inference service, without trailing slash
    pub ai_service_url: String,
    pub environment: Environment,
    /// Always false in production
    pub debug: bool,
    /// Root directory for measurement photo uploads
    pub upload_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

// Manual impl keeps the secret out of logs.
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url)
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("api_v1_prefix", &self.api_v1_prefix)
            .field("cors_origins", &self.cors_origins)
            .field("ai_service_url", &self.ai_service_url)
            .field("environment", &self.environment)
            .field("debug", &self.debug)
            .field("upload_dir", &self.upload_dir)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Settings {
    /// Load settings from the process environment and the discovered TOML file
    pub fn from_env() -> Result<Self> {
        let file = TomlConfig::discover()?;
        if let Some(path) = file.as_ref().and_then(|f| f.path()) {
            info!("Loaded config file: {}", path.display());
        }
        Self::from_sources(|key| std::env::var(key).ok(), file.as_ref())
    }

    /// Load settings from an arbitrary key lookup with no file tier
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_sources(lookup, None)
    }

    /// Load settings from an environment lookup layered over an optional TOML file
    pub fn from_sources<F>(env: F, file: Option<&TomlConfig>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            env(key)
                .or_else(|| file.and_then(|f| f.get(key)))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| Error::Config("DATABASE_URL is required".to_string()))?;

        let secret_key = get("SECRET_KEY")
            .ok_or_else(|| Error::Config("SECRET_KEY is required".to_string()))?;
        validate_secret_key(&secret_key)?;

        let algorithm = get("ALGORITHM").unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());

        let access_token_expire_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => parse_number::<u32>("ACCESS_TOKEN_EXPIRE_MINUTES", &raw)?,
            None => DEFAULT_TOKEN_EXPIRE_MINUTES,
        };
        if access_token_expire_minutes < 1 {
            return Err(Error::Config(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be at least 1".to_string(),
            ));
        }

        let api_v1_prefix = get("API_V1_PREFIX").unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());
        if !api_v1_prefix.starts_with('/') {
            return Err(Error::Config(format!(
                "API_V1_PREFIX must start with '/' (got '{}')",
                api_v1_prefix
            )));
        }
        let api_v1_prefix = api_v1_prefix.trim_end_matches('/').to_string();

        let cors_origins = parse_cors_origins(
            &get("CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        );

        let ai_service_url =
            get("AI_SERVICE_URL").unwrap_or_else(|| DEFAULT_AI_SERVICE_URL.to_string());
        if !(ai_service_url.starts_with("http://") || ai_service_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "AI_SERVICE_URL must be an http(s) URL (got '{}')",
                ai_service_url
            )));
        }
        let ai_service_url = ai_service_url.trim_end_matches('/').to_string();

        let environment = match get("ENVIRONMENT") {
            Some(raw) => raw.parse::<Environment>()?,
            None => Environment::Development,
        };

        let configured_debug = match get("DEBUG") {
            Some(raw) => parse_bool("DEBUG", &raw)?,
            None => false,
        };
        let debug = if environment == Environment::Production {
            if configured_debug {
                warn!("DEBUG=true ignored in production environment");
            }
            false
        } else {
            configured_debug
        };

        let upload_dir = PathBuf::from(
            get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
        );

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("PORT") {
            Some(raw) => parse_number::<u16>("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => parse_number::<usize>("MAX_UPLOAD_BYTES", &raw)?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        if max_upload_bytes == 0 {
            return Err(Error::Config("MAX_UPLOAD_BYTES must be at least 1".to_string()));
        }

        Ok(Self {
            database_url,
            secret_key,
            algorithm,
            access_token_expire_minutes,
            api_v1_prefix,
            cors_origins,
            ai_service_url,
            environment,
            debug,
            upload_dir,
            host,
            port,
            max_upload_bytes,
        })
    }

    /// `host:port` socket address string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Reject short or placeholder secrets
pub fn validate_secret_key(key: &str) -> Result<()> {
    if key.chars().count() < MIN_SECRET_KEY_LEN {
        return Err(Error::Config(format!(
            "SECRET_KEY must be at least {} characters",
            MIN_SECRET_KEY_LEN
        )));
    }

    let lowered = key.to_lowercase();
    if WEAK_SECRET_KEYS.iter().any(|weak| lowered.contains(weak)) {
        return Err(Error::Config(
            "SECRET_KEY appears to be a weak/default value. \
             Please set a strong secret key in your environment variables."
                .to_string(),
        ));
    }

    Ok(())
}

/// Split a comma-separated origin list, trimming whitespace and dropping empties
pub fn parse_cors_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(Error::Config(format!("{} must be a boolean (got '{}')", key, other))),
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| Error::Config(format!("Invalid {} value '{}': {}", key, raw, e)))
}
