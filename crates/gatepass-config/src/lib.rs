//! Settings loading for gatepass deployments.
//!
//! TOML file + environment merging via figment, and translation to
//! `gatepass_core::PassSettings`. The embedding application calls
//! [`load_settings`] once at startup and hands the result to the
//! registry.

use std::path::{Path, PathBuf};

use chrono::Duration;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatepass_core::PassSettings;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

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

// ── TOML config struct ──────────────────────────────────────────────

/// On-disk configuration schema.
///
/// All fields have defaults, so an absent file yields a working setup.
#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    /// Query-string parameter carrying the visitor id.
    #[serde(default = "default_querystring_key")]
    pub querystring_key: String,

    /// Session key under which an admitted visitor is stashed.
    #[serde(default = "default_session_key")]
    pub session_key: String,

    /// Pass lifetime in seconds.
    #[serde(default = "default_token_expiry_secs")]
    pub token_expiry_secs: u32,

    /// Use ceiling applied to passes issued without an explicit limit.
    #[serde(default = "default_max_uses")]
    pub default_max_uses: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            querystring_key: default_querystring_key(),
            session_key: default_session_key(),
            token_expiry_secs: default_token_expiry_secs(),
            default_max_uses: default_max_uses(),
        }
    }
}

fn default_querystring_key() -> String {
    gatepass_core::DEFAULT_QUERYSTRING_KEY.into()
}
fn default_session_key() -> String {
    gatepass_core::DEFAULT_SESSION_KEY.into()
}
fn default_token_expiry_secs() -> u32 {
    24 * 60 * 60
}
fn default_max_uses() -> u32 {
    10
}

impl Settings {
    /// Translate into the runtime settings the registry consumes.
    pub fn to_pass_settings(&self) -> Result<PassSettings, ConfigError> {
        if self.token_expiry_secs == 0 {
            return Err(ConfigError::Validation {
                field: "token_expiry_secs".into(),
                reason: "must be positive".into(),
            });
        }
        if self.default_max_uses == 0 {
            return Err(ConfigError::Validation {
                field: "default_max_uses".into(),
                reason: "must be at least 1".into(),
            });
        }

        let settings = PassSettings {
            querystring_key: self.querystring_key.clone(),
            session_key: self.session_key.clone(),
            token_expiry: Duration::seconds(i64::from(self.token_expiry_secs)),
            default_max_uses: self.default_max_uses,
        };
        settings
            .validate()
            .map_err(|err| ConfigError::Validation {
                field: "settings".into(),
                reason: err.to_string(),
            })?;
        Ok(settings)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("rs", "gatepass", "gatepass").map_or_else(
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
    p.push("gatepass");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load settings from the canonical path + environment.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(config_path())
}

/// Load settings from an explicit file + environment.
///
/// Layering: built-in defaults, then the TOML file (if present), then
/// `GATEPASS_`-prefixed environment variables.
pub fn load_settings_from(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path.as_ref()))
        .merge(Env::prefixed("GATEPASS_"));

    let settings: Settings = figment.extract()?;
    Ok(settings)
}

/// Load settings, falling back to defaults on any failure.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize settings to TOML and write to the canonical config path.
pub fn save_settings(settings: &Settings) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(settings)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}
