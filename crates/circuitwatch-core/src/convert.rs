// ── Domain ↔ wire conversions ──

use circuitwatch_api::TraceRequest;
use circuitwatch_api::transport::{TlsMode, TransportConfig};

use crate::config::{TlsVerification, TraceServiceConfig};
use crate::model::TraceEntry;

impl From<&TraceEntry> for TraceRequest {
    fn from(entry: &TraceEntry) -> Self {
        TraceRequest::new(entry.dpid.clone(), entry.in_port, entry.vlan)
    }
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

pub(crate) fn build_transport(config: &TraceServiceConfig) -> TransportConfig {
    TransportConfig {
        tls: TlsMode::from(&config.tls),
        timeout: config.timeout,
    }
}
