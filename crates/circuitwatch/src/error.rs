//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use circuitwatch_config::ConfigError;
use circuitwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const DRIFT: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Topology ─────────────────────────────────────────────────────
    #[error("Could not load topology: {message}")]
    #[diagnostic(
        code(circuitwatch::topology),
        help("Check that the snapshot file exists and holds a JSON document with a \"switches\" array.")
    )]
    Topology { message: String },

    #[error("Switch '{dpid}' not found")]
    #[diagnostic(
        code(circuitwatch::unknown_switch),
        help("Run: circuitwatch discover --topology <file> to see the known circuits")
    )]
    UnknownSwitch { dpid: String },

    #[error("Trace failed: {message}")]
    #[diagnostic(code(circuitwatch::trace))]
    Trace { message: String },

    // ── Drift ────────────────────────────────────────────────────────
    #[error("{changed} of {total} circuits changed path")]
    #[diagnostic(
        code(circuitwatch::drift),
        help("Re-run discovery to accept the new paths as the baseline.")
    )]
    Drift { changed: usize, total: usize },

    // ── Trace service ────────────────────────────────────────────────
    #[error("Trace service request failed: {message}")]
    #[diagnostic(
        code(circuitwatch::trace_service),
        help(
            "Check that the trace service is running and reachable.\n\
             Configure its URL under [trace_service] or pass --url."
        )
    )]
    TraceService { message: String },

    #[error("{incomplete} of {total} important circuit traces did not finish")]
    #[diagnostic(
        code(circuitwatch::traces_incomplete),
        help("Raise --max-attempts / --timeout, or check the trace service logs.")
    )]
    TracesIncomplete { incomplete: usize, total: usize },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(circuitwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(circuitwatch::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(circuitwatch::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(circuitwatch::toml))]
    Toml(#[from] toml::ser::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TraceService { .. } => exit_code::CONNECTION,
            Self::UnknownSwitch { .. } => exit_code::NOT_FOUND,
            Self::TracesIncomplete { .. } => exit_code::TIMEOUT,
            Self::Drift { .. } => exit_code::DRIFT,
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Topology { message } => CliError::Topology { message },

            CoreError::UnknownSwitch { dpid } => CliError::UnknownSwitch { dpid },

            e @ (CoreError::FlowsUnavailable { .. }
            | CoreError::Tracer { .. }
            | CoreError::MalformedTrace { .. }) => CliError::Trace {
                message: e.to_string(),
            },

            CoreError::TraceService { message, status } => CliError::TraceService {
                message: match status {
                    Some(code) => format!("HTTP {code}: {message}"),
                    None => message,
                },
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
