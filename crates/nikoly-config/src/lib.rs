//! Shared configuration for the nikoly CLI.
//!
//! TOML profiles, loading through figment (defaults, file, environment),
//! persistence, and translation to `nikoly_core::ControllerConfig`.
//! Address validation lives here, in the settings layer; the core takes
//! whatever it is handed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use nikoly_core::ControllerConfig;
use nikoly_core::config::{DEFAULT_PORT, DEFAULT_SOCKET_KEYWORD, DEFAULT_TIMEOUT};

/// Prefix for environment overrides of the config file.
pub const ENV_PREFIX: &str = "NIKOLY_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

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
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            port: default_port(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// A named controller profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Controller host name or IP address.
    pub address: String,

    /// Override the default port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Override the default timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Name fragment marking binary actions as sockets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_keyword: Option<String>,
}

impl Profile {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: None,
            timeout: None,
            socket_keyword: None,
        }
    }
}

impl Config {
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }

    /// The profile named by `default_profile`, falling back to "default".
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }
}

// ── Validation ──────────────────────────────────────────────────────

/// Reject addresses the controller could never be reached at.
pub fn validate_address(address: &str) -> Result<(), ConfigError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Validation {
            field: "address".into(),
            reason: "must not be empty".into(),
        });
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation {
            field: "address".into(),
            reason: format!("'{trimmed}' contains whitespace"),
        });
    }
    Ok(())
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "nikoly", "nikoly").map_or_else(
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
    p.push("nikoly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file yields the defaults. Environment keys nest on a double
/// underscore: `NIKOLY_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ControllerConfig` from a profile, filling gaps from defaults.
pub fn profile_to_controller_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    validate_address(&profile.address)?;

    Ok(ControllerConfig {
        address: profile.address.trim().to_owned(),
        port: profile.port.unwrap_or(defaults.port),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        socket_keyword: profile
            .socket_keyword
            .clone()
            .unwrap_or_else(|| DEFAULT_SOCKET_KEYWORD.into()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.port, 8000);
        assert_eq!(config.defaults.timeout, 5);
        assert!(config.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
output = "json"
timeout = 3

[profiles.home]
address = "192.168.111.16"
socket_keyword = "Plug"

[profiles.cabin]
address = "10.0.0.5"
port = 8001
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.default_profile_name(), "home");
        assert_eq!(config.defaults.output, "json");
        assert_eq!(config.defaults.color, "auto");
        assert_eq!(config.profile("cabin").unwrap().port, Some(8001));
        assert!(matches!(
            config.profile("office"),
            Err(ConfigError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[defaults]\ntimeout = \"five\"\n\n[profiles.home]\naddress = \"192.168.111.16\"\n",
        )
        .unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)), "got {err:?}");
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.default_profile = Some("home".into());
        config
            .profiles
            .insert("home".into(), Profile::new("192.168.111.16"));
        save_config_to(&config, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[profiles.home]"));
        assert!(!written.contains("socket_keyword"));
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn profile_translation_fills_defaults() {
        let defaults = Defaults {
            timeout: 9,
            ..Defaults::default()
        };
        let mut profile = Profile::new(" 10.0.0.5 ");
        profile.port = Some(8001);

        let cfg = profile_to_controller_config(&profile, &defaults).unwrap();

        assert_eq!(cfg.address, "10.0.0.5");
        assert_eq!(cfg.port, 8001);
        assert_eq!(cfg.timeout, Duration::from_secs(9));
        assert_eq!(cfg.socket_keyword, "stopcontact");
    }

    #[test]
    fn empty_address_is_rejected() {
        let err = profile_to_controller_config(&Profile::new("   "), &Defaults::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid address: must not be empty");
        assert!(validate_address("niko hub").is_err());
        assert!(validate_address("niko.local").is_ok());
    }
}
