//! CLI configuration: thin wrapper around `circuitwatch_config`.
//!
//! Adds `--config` path resolution and flag overrides for the
//! important-circuit poller.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use tracing::{debug, warn};

use circuitwatch_core::{PollerConfig, TraceServiceConfig};

use crate::cli::{ColorMode, GlobalOpts, ImportantArgs, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use circuitwatch_config::{Config, TraceService, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file in effect: `--config` / `CIRCUITWATCH_CONFIG`, else the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(circuitwatch_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(circuitwatch_config::load_config_from(&config_path(global))?)
}

/// Fill `--output` / `--color` from `[defaults]` when no flag was given.
///
/// An unreadable config leaves the built-in defaults in place; commands
/// that need the file report the error themselves.
pub fn apply_display_defaults(global: &mut GlobalOpts) {
    if global.output.is_some() && global.color.is_some() {
        return;
    }
    let cfg = match load(global) {
        Ok(cfg) => cfg,
        Err(e) => {
            debug!(error = %e, "config unavailable, using built-in display defaults");
            return;
        }
    };

    if global.output.is_none() {
        global.output = parse_default("defaults.output", &cfg.defaults.output);
    }
    if global.color.is_none() {
        global.color = parse_default("defaults.color", &cfg.defaults.color);
    }
}

fn parse_default<T: ValueEnum>(field: &str, raw: &str) -> Option<T> {
    T::from_str(raw, true)
        .inspect_err(|_| warn!(field, value = raw, "ignoring unknown config default"))
        .ok()
}

/// Translate config + flags into the poller's runtime config.
///
/// Flags take priority over file and environment values.
pub fn resolve_poller(cfg: &Config, args: &ImportantArgs) -> Result<PollerConfig, CliError> {
    let mut poller = circuitwatch_config::to_poller_config(cfg)?;

    if let Some(ref raw) = args.url {
        let url: url::Url = raw.parse().map_err(|_| CliError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
        match poller.trace_service.as_mut() {
            Some(service) => service.url = url,
            None => poller.trace_service = Some(TraceServiceConfig::new(url)),
        }
    }

    if let Some(secs) = args.interval {
        if secs == 0 {
            return Err(CliError::Validation {
                field: "interval".into(),
                reason: "must be at least 1".into(),
            });
        }
        poller.interval = Duration::from_secs(secs);
    }
    if args.max_attempts.is_some() {
        poller.max_attempts = args.max_attempts;
    }
    if let Some(secs) = args.timeout {
        poller.timeout = Some(Duration::from_secs(secs));
    }

    Ok(poller)
}
