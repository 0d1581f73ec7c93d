//! `important` handler: poll configured circuits through the trace service.

use tabled::Tabled;
use tracing::info;

use circuitwatch_core::{ImportantCircuitPoller, TracePoll};

use crate::cli::{GlobalOpts, ImportantArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PollRow {
    #[tabled(rename = "Switch")]
    dpid: String,
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Trace ID")]
    trace_id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Polls")]
    attempts: u32,
    #[tabled(rename = "Last")]
    last_type: String,
}

impl From<&TracePoll> for PollRow {
    fn from(p: &TracePoll) -> Self {
        Self {
            dpid: p.circuit.dpid.clone(),
            port: p.circuit.in_port,
            vlan: util::vlan_label(p.circuit.vlan),
            trace_id: p.trace_id.clone().unwrap_or_else(|| "-".into()),
            state: p.state.to_string(),
            attempts: p.attempts,
            last_type: p.last_type.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: &ImportantArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let poller = ImportantCircuitPoller::new(config::resolve_poller(&cfg, args)?)?;

    if !poller.is_enabled() {
        info!("no important circuits configured");
        return Ok(());
    }

    let polls = poller.run_important_traces().await;

    let out = output::render_list(
        &global.output_format(),
        &polls,
        |p| PollRow::from(p),
        |p| format!("{}\t{}", p.circuit, p.state),
    );
    output::print_output(&out, global.quiet);

    let incomplete = polls.iter().filter(|p| !p.is_terminal()).count();
    if incomplete > 0 {
        return Err(CliError::TracesIncomplete {
            incomplete,
            total: polls.len(),
        });
    }
    Ok(())
}
