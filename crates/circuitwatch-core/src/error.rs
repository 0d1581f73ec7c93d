// ── Core error types ──
//
// Domain errors from circuitwatch-core. Callers never see HTTP status
// codes or JSON parse failures directly: the `From<circuitwatch_api::Error>`
// impl folds transport-layer errors into `TraceService`.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Topology ─────────────────────────────────────────────────────
    /// The switch has not synchronized its flow table yet.
    #[error("Flows unavailable for switch {dpid}")]
    FlowsUnavailable { dpid: String },

    #[error("Unknown switch: {dpid}")]
    UnknownSwitch { dpid: String },

    #[error("Topology error: {message}")]
    Topology { message: String },

    // ── Tracing ──────────────────────────────────────────────────────
    #[error("Path trace failed: {message}")]
    Tracer { message: String },

    /// A trace result lacks a field the canonical form needs.
    #[error("Malformed trace result: missing {field}")]
    MalformedTrace { field: String },

    // ── Trace service ────────────────────────────────────────────────
    #[error("Trace service error: {message}")]
    TraceService {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<circuitwatch_api::Error> for CoreError {
    fn from(err: circuitwatch_api::Error) -> Self {
        match err {
            circuitwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid trace service URL: {e}"),
            },
            circuitwatch_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS setup failed: {msg}"),
            },
            circuitwatch_api::Error::Http { status, message } => CoreError::TraceService {
                message,
                status: Some(status),
            },
            ref e @ circuitwatch_api::Error::Transport(_) => CoreError::TraceService {
                message: e.to_string(),
                status: e.status(),
            },
            circuitwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::TraceService {
                    message: format!("unexpected response: {message}"),
                    status: None,
                }
            }
        }
    }
}
