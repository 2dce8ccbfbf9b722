//! Profile configuration for Sensorflare clients.
//!
//! TOML profiles, credential resolution (env + plaintext), and translation
//! into a ready [`SensorflareClient`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use sensorflare_api::{
    Credentials, DEFAULT_BASE_URL, SensorflareClient, TlsMode, TransportConfig,
};

/// Environment variable consulted for the username when a profile has none.
pub const USERNAME_ENV: &str = "SENSORFLARE_USERNAME";
/// Environment variable consulted for the password before plaintext config.
pub const PASSWORD_ENV: &str = "SENSORFLARE_PASSWORD";

const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("authentication rejected for profile '{profile}'")]
    AuthenticationRejected { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Api(#[from] sensorflare_api::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named service profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile. `None` selects `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE);
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds. Unset means the transport default.
    pub timeout: Option<u64>,
}

/// A named service profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL. Falls back to the production endpoint.
    pub base_url: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext -- prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid certificates.
    pub insecure: Option<bool>,

    /// Override the default timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "sensorflare", "sensorflare").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sensorflare");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from a specific TOML file, layered under `SENSORFLARE_*`
/// environment variables. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SENSORFLARE_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve username + password for a profile.
///
/// Username: profile, then `SENSORFLARE_USERNAME`. Password: the env var
/// named by `password_env`, then `SENSORFLARE_PASSWORD`, then plaintext.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    let no_credentials = || ConfigError::NoCredentials {
        profile: profile_name.into(),
    };

    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok())
        .ok_or_else(no_credentials)?;

    let password = profile
        .password_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
        .or_else(|| std::env::var(PASSWORD_ENV).ok())
        .or_else(|| profile.password.clone())
        .ok_or_else(no_credentials)?;

    Ok(Credentials::new(username, SecretString::from(password)))
}

// ── Client construction ─────────────────────────────────────────────

/// Translate a profile's TLS and timeout settings.
pub fn profile_to_transport(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    let tls = if profile.insecure.unwrap_or(false) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    TransportConfig {
        tls,
        timeout: profile.timeout.or(defaults.timeout).map(Duration::from_secs),
    }
}

/// Build an unauthenticated client for a profile.
pub fn build_client(profile: &Profile, defaults: &Defaults) -> Result<SensorflareClient, ConfigError> {
    let base_url = profile.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let transport = profile_to_transport(profile, defaults);
    SensorflareClient::with_base_url(base_url, &transport).map_err(|e| match e {
        sensorflare_api::Error::InvalidBaseUrl { reason, .. } => ConfigError::Validation {
            field: "base_url".into(),
            reason,
        },
        other => ConfigError::Api(other),
    })
}

/// Build a client for the named profile (or the default) and authenticate.
pub async fn connect(config: &Config, name: Option<&str>) -> Result<SensorflareClient, ConfigError> {
    let (profile_name, profile) = config.profile(name)?;
    let credentials = resolve_credentials(profile, profile_name)?;
    let mut client = build_client(profile, &config.defaults)?;

    if client.authenticate_with(&credentials).await? {
        Ok(client)
    } else {
        Err(ConfigError::AuthenticationRejected {
            profile: profile_name.into(),
        })
    }
}
