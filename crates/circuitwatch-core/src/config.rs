// ── Runtime poller configuration ──
//
// Describes which circuits to poll and how to reach the trace service.
// Never touches disk: circuitwatch-config builds a `PollerConfig` and
// hands it in.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::TraceEntry;

/// Interval between progress polls when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// An operator-designated circuit polled through the trace service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantCircuitSpec {
    #[serde(alias = "dpid_a")]
    pub dpid: String,
    pub port_a: u32,
    #[serde(default)]
    pub vlan_a: u16,
}

impl ImportantCircuitSpec {
    pub fn trace_entry(&self) -> TraceEntry {
        TraceEntry::new(self.dpid.clone(), self.port_a, self.vlan_a)
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Where the trace service lives and how to talk to it.
#[derive(Debug, Clone)]
pub struct TraceServiceConfig {
    /// Service root, e.g. `http://localhost:8181/api/amlight/sdntrace`.
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl TraceServiceConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Configuration for the important-circuit poller.
///
/// Leaving `trace_service` unset or `important_circuits` empty disables
/// the poller. `max_attempts` and `timeout` bound each poll loop; both
/// are unset by default, which polls until the trace finishes.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub trace_service: Option<TraceServiceConfig>,
    pub important_circuits: Vec<ImportantCircuitSpec>,
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub timeout: Option<Duration>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            trace_service: None,
            important_circuits: Vec::new(),
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            timeout: None,
        }
    }
}

impl PollerConfig {
    pub fn is_enabled(&self) -> bool {
        self.trace_service.is_some() && !self.important_circuits.is_empty()
    }
}
