//! Shared configuration for GMP tools.
//!
//! TOML profiles, password resolution (env + keyring + plaintext),
//! and translation to `gvm_gmp::ClientConfig`. The CLI layers its
//! flag overrides on top of what this crate resolves.

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

use gvm_gmp::{ClientConfig, Credentials, DEFAULT_BUFSIZE, DEFAULT_READ_TIMEOUT, DEFAULT_SOCKET_PATH};

/// Keyring service name for stored passwords.
pub const KEYRING_SERVICE: &str = "gvmctl";

/// Environment variable consulted for the password of any profile.
pub const PASSWORD_ENV: &str = "GVMCTL_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named gvmd profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_socket")]
    pub socket: PathBuf,

    #[serde(default = "default_bufsize")]
    pub bufsize: usize,

    /// Read timeout as a humantime string ("3s", "500ms").
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            socket: default_socket(),
            bufsize: default_bufsize(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_socket() -> PathBuf {
    PathBuf::from(DEFAULT_SOCKET_PATH)
}
fn default_bufsize() -> usize {
    DEFAULT_BUFSIZE
}
fn default_timeout() -> String {
    humantime::format_duration(DEFAULT_READ_TIMEOUT).to_string()
}

/// A named gvmd profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Path of the gvmd Unix socket.
    pub socket: Option<PathBuf>,

    /// GMP username.
    #[serde(default = "default_username")]
    pub username: String,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override read buffer size.
    pub bufsize: Option<usize>,

    /// Override read timeout.
    pub timeout: Option<String>,

    /// Client debug level; above 3 logs request and response bodies.
    #[serde(default)]
    pub debug: u8,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            socket: None,
            username: default_username(),
            password: None,
            password_env: None,
            bufsize: None,
            timeout: None,
            debug: 0,
        }
    }
}

fn default_username() -> String {
    "admin".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "greenbone", "gvmctl").map_or_else(
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
    p.push("gvmctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Nested keys are addressed with a double underscore, e.g.
/// `GVMCTL_DEFAULTS__SOCKET`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GVMCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
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

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
}

/// Resolve the GMP password without CLI flags.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. Shared env var
    if let Ok(val) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Parse a humantime duration, naming `field` on failure.
pub fn parse_timeout(field: &str, raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("'{raw}' is not a duration: {e}"),
    })
}

/// Build a `ClientConfig` from a profile and the global defaults, no CLI
/// flag overrides.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    client_config(profile, defaults, password)
}

/// Build a `ClientConfig` from a profile with an already-resolved password.
pub fn client_config(
    profile: &Profile,
    defaults: &Defaults,
    password: SecretString,
) -> Result<ClientConfig, ConfigError> {
    if profile.bufsize == Some(0) {
        return Err(ConfigError::Validation {
            field: "bufsize".into(),
            reason: "must be greater than zero".into(),
        });
    }

    let timeout = profile.timeout.as_deref().unwrap_or(&defaults.timeout);

    Ok(ClientConfig {
        socket_path: profile
            .socket
            .clone()
            .unwrap_or_else(|| defaults.socket.clone()),
        credentials: Credentials {
            username: profile.username.clone(),
            password,
        },
        bufsize: profile.bufsize.unwrap_or(defaults.bufsize),
        read_timeout: parse_timeout("timeout", timeout)?,
        debug: profile.debug,
        ..ClientConfig::default()
    })
}
