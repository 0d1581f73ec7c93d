// ── Important-circuit poller ──
//
// Submits each configured circuit to the external trace service and
// polls its progress at a fixed interval until the latest entry carries
// the terminal tag. Circuits are handled one at a time, in config order.

use std::time::Duration;

use serde::Serialize;
use strum::{Display, EnumString};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use circuitwatch_api::{TraceClient, TraceProgress, TraceRequest};

use crate::config::{ImportantCircuitSpec, PollerConfig};
use crate::convert::build_transport;
use crate::error::CoreError;
use crate::model::TraceEntry;

// ── Poll records ────────────────────────────────────────────────────

/// Where a single important-circuit poll ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PollState {
    /// Submission rejected; no trace id.
    SubmitFailed,
    Polling,
    /// Latest progress entry was tagged `last`.
    Terminal,
    /// Gave up after hitting `max_attempts` or `timeout`.
    Abandoned,
}

/// Outcome of polling one important circuit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TracePoll {
    pub circuit: TraceEntry,
    pub trace_id: Option<String>,
    pub state: PollState,
    /// `type` tag of the most recent progress entry seen.
    pub last_type: Option<String>,
    /// Progress requests issued, including failed ones.
    pub attempts: u32,
    pub result: Option<TraceProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TracePoll {
    fn new(circuit: TraceEntry) -> Self {
        Self {
            circuit,
            trace_id: None,
            state: PollState::Polling,
            last_type: None,
            attempts: 0,
            result: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state == PollState::Terminal
    }
}

// ── ImportantCircuitPoller ──────────────────────────────────────────

pub struct ImportantCircuitPoller {
    config: PollerConfig,
    client: Option<TraceClient>,
}

impl ImportantCircuitPoller {
    /// Build the HTTP client when the poller is enabled.
    ///
    /// A missing trace service or an empty circuit list yields a disabled
    /// poller, not an error.
    pub fn new(config: PollerConfig) -> Result<Self, CoreError> {
        let client = match &config.trace_service {
            Some(service) if config.is_enabled() => Some(TraceClient::new(
                service.url.as_str(),
                &build_transport(service),
            )?),
            _ => None,
        };
        if let Some(ref client) = client {
            debug!(url = %client.base_url(), "trace service client ready");
        }
        Ok(Self { config, client })
    }

    /// Use a pre-built client, ignoring `config.trace_service`.
    pub fn with_client(config: PollerConfig, client: TraceClient) -> Self {
        Self {
            config,
            client: Some(client),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some() && !self.config.important_circuits.is_empty()
    }

    /// Poll every configured important circuit to completion.
    ///
    /// Returns one record per circuit. With nothing configured, returns
    /// immediately without touching the network.
    pub async fn run_important_traces(&self) -> Vec<TracePoll> {
        let Some(client) = self.client.as_ref() else {
            debug!("no trace service configured, skipping important circuits");
            return Vec::new();
        };
        if self.config.important_circuits.is_empty() {
            debug!("no important circuits configured");
            return Vec::new();
        }

        let mut polls = Vec::with_capacity(self.config.important_circuits.len());
        for spec in &self.config.important_circuits {
            polls.push(self.poll_circuit(client, spec).await);
        }
        polls
    }

    async fn poll_circuit(&self, client: &TraceClient, spec: &ImportantCircuitSpec) -> TracePoll {
        let entry = spec.trace_entry();
        let mut poll = TracePoll::new(entry.clone());

        let trace_id = match client.submit(&TraceRequest::from(&entry)).await {
            Ok(id) => id,
            Err(e) => {
                warn!(%entry, error = %e, "trace submission failed");
                poll.state = PollState::SubmitFailed;
                poll.error = Some(e.to_string());
                return poll;
            }
        };
        debug!(%entry, %trace_id, "polling trace");
        poll.trace_id = Some(trace_id.clone());

        let started = Instant::now();
        loop {
            if let Some(limit) = self.limit_reached(poll.attempts, started.elapsed()) {
                warn!(
                    %entry,
                    %trace_id,
                    attempts = poll.attempts,
                    limit,
                    "abandoning trace poll"
                );
                poll.state = PollState::Abandoned;
                return poll;
            }

            tokio::time::sleep(self.config.interval).await;
            poll.attempts += 1;

            let progress = match client.progress(&trace_id).await {
                Ok(progress) => progress,
                Err(e) => {
                    warn!(
                        %trace_id,
                        attempt = poll.attempts,
                        transient = e.is_transient(),
                        error = %e,
                        "trace progress poll failed"
                    );
                    poll.error = Some(e.to_string());
                    continue;
                }
            };

            poll.error = None;
            poll.last_type = progress.last_type().map(str::to_owned);
            let terminal = progress.is_terminal();
            if terminal {
                info!(
                    %entry,
                    %trace_id,
                    attempts = poll.attempts,
                    result = %serde_json::Value::Array(progress.result.clone()),
                    "important circuit trace finished"
                );
                poll.state = PollState::Terminal;
            } else {
                debug!(%trace_id, last_type = ?poll.last_type, "trace still running");
            }
            poll.result = Some(progress);
            if terminal {
                return poll;
            }
        }
    }

    /// Name of the limit that stops this poll, if any.
    fn limit_reached(&self, attempts: u32, elapsed: Duration) -> Option<&'static str> {
        if self.config.max_attempts.is_some_and(|max| attempts >= max) {
            return Some("max_attempts");
        }
        if self.config.timeout.is_some_and(|timeout| elapsed >= timeout) {
            return Some("timeout");
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::TraceServiceConfig;

    fn spec() -> ImportantCircuitSpec {
        ImportantCircuitSpec {
            dpid: "00:00:00:00:00:00:00:01".into(),
            port_a: 1,
            vlan_a: 100,
        }
    }

    #[test]
    fn disabled_without_trace_service() {
        let poller = ImportantCircuitPoller::new(PollerConfig {
            important_circuits: vec![spec()],
            ..PollerConfig::default()
        })
        .unwrap();
        assert!(!poller.is_enabled());
    }

    #[test]
    fn disabled_without_circuits() {
        let service = TraceServiceConfig::new("http://localhost:8181/sdntrace".parse().unwrap());
        let poller = ImportantCircuitPoller::new(PollerConfig {
            trace_service: Some(service),
            ..PollerConfig::default()
        })
        .unwrap();
        assert!(!poller.is_enabled());
    }

    #[test]
    fn limits_unset_by_default() {
        let poller = ImportantCircuitPoller::new(PollerConfig::default()).unwrap();
        assert_eq!(poller.limit_reached(10_000, Duration::from_secs(86_400)), None);
    }

    #[test]
    fn attempt_cap_checked_before_timeout() {
        let poller = ImportantCircuitPoller::new(PollerConfig {
            max_attempts: Some(3),
            timeout: Some(Duration::from_secs(1)),
            ..PollerConfig::default()
        })
        .unwrap();
        assert_eq!(poller.limit_reached(2, Duration::ZERO), None);
        assert_eq!(poller.limit_reached(3, Duration::from_secs(5)), Some("max_attempts"));
        assert_eq!(poller.limit_reached(0, Duration::from_secs(1)), Some("timeout"));
    }

    #[test]
    fn poll_state_renders_snake_case() {
        assert_eq!(PollState::SubmitFailed.to_string(), "submit_failed");
    }
}
