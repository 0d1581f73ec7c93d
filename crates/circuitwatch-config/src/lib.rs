//! Configuration for circuitwatch.
//!
//! TOML file plus `CIRCUITWATCH_`-prefixed environment overrides, and
//! translation to `circuitwatch_core::PollerConfig`. The CLI layers its
//! flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use circuitwatch_core::{ImportantCircuitSpec, PollerConfig, TlsVerification, TraceServiceConfig};

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

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Output and display defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// External trace service. Absent disables the important-circuit poller.
    pub trace_service: Option<TraceService>,

    #[serde(default)]
    pub poller: Poller,

    /// Circuits polled through the trace service.
    #[serde(default)]
    pub important_circuits: Vec<ImportantCircuitSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TraceService {
    /// Service root, e.g. "http://localhost:8181/api/amlight/sdntrace".
    pub url: String,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Skip TLS verification.
    #[serde(default)]
    pub insecure: bool,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,
}

impl Default for TraceService {
    fn default() -> Self {
        Self {
            url: DEFAULT_TRACE_SERVICE_URL.into(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

/// Where the trace service usually listens on a controller host.
pub const DEFAULT_TRACE_SERVICE_URL: &str = "http://localhost:8181/api/amlight/sdntrace";

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Poller {
    /// Seconds between progress polls.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Give up on a trace after this many polls. Unset polls forever.
    pub max_attempts: Option<u32>,

    /// Give up on a trace after this many seconds. Unset polls forever.
    pub timeout_secs: Option<u64>,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            max_attempts: None,
            timeout_secs: None,
        }
    }
}

fn default_interval() -> u64 {
    5
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "circuitwatch", "circuitwatch").map_or_else(
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
    p.push("circuitwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from a specific file + environment.
///
/// A missing file is not an error; defaults and env vars still apply.
/// Nested keys use a double underscore: `CIRCUITWATCH_POLLER__INTERVAL_SECS`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CIRCUITWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Translation to core runtime config ──────────────────────────────

/// Build the poller's runtime config.
pub fn to_poller_config(cfg: &Config) -> Result<PollerConfig, ConfigError> {
    if cfg.poller.interval_secs == 0 {
        return Err(ConfigError::Validation {
            field: "poller.interval_secs".into(),
            reason: "must be at least 1".into(),
        });
    }

    let trace_service = cfg
        .trace_service
        .as_ref()
        .map(trace_service_config)
        .transpose()?;

    Ok(PollerConfig {
        trace_service,
        important_circuits: cfg.important_circuits.clone(),
        interval: Duration::from_secs(cfg.poller.interval_secs),
        max_attempts: cfg.poller.max_attempts,
        timeout: cfg.poller.timeout_secs.map(Duration::from_secs),
    })
}

fn trace_service_config(service: &TraceService) -> Result<TraceServiceConfig, ConfigError> {
    let url: url::Url = service.url.parse().map_err(|_| ConfigError::Validation {
        field: "trace_service.url".into(),
        reason: format!("invalid URL: {}", service.url),
    })?;

    let tls = if service.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = service.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(TraceServiceConfig {
        url,
        tls,
        timeout: Duration::from_secs(service.timeout),
    })
}
