//! Shared helpers for command handlers.

use std::fmt::Write;
use std::path::Path;

use tabled::Tabled;

use circuitwatch_core::{
    ChangedCircuit, Circuit, CircuitMonitor, DriftReason, RevalidationReport, SnapshotTopology,
    SnapshotTracer,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Snapshot loading ────────────────────────────────────────────────

/// Load a snapshot and run discovery over it.
pub fn discover_snapshot(path: &Path) -> Result<CircuitMonitor<SnapshotTracer>, CliError> {
    let topology = SnapshotTopology::load(path)?;
    let mut monitor = CircuitMonitor::new(SnapshotTracer::new(topology));
    monitor.refresh()?;
    Ok(monitor)
}

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct CircuitRow {
    #[tabled(rename = "Switch")]
    dpid: String,
    #[tabled(rename = "Port")]
    port: u32,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Hops")]
    hops: usize,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&Circuit> for CircuitRow {
    fn from(c: &Circuit) -> Self {
        Self {
            dpid: c.entry.dpid.clone(),
            port: c.entry.in_port,
            vlan: vlan_label(c.entry.vlan),
            hops: c.path.len(),
            path: c.path.to_string(),
        }
    }
}

#[derive(Tabled)]
struct ChangedRow {
    #[tabled(rename = "Circuit")]
    entry: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Baseline")]
    baseline: String,
    #[tabled(rename = "Current")]
    current: String,
}

impl From<&ChangedCircuit> for ChangedRow {
    fn from(c: &ChangedCircuit) -> Self {
        let (reason, current) = match &c.reason {
            DriftReason::PathChanged { current } => ("path changed".to_owned(), current.to_string()),
            DriftReason::Unresolvable { error } => ("unresolvable".to_owned(), error.clone()),
            DriftReason::TraceFailed { error } => ("trace failed".to_owned(), error.clone()),
        };
        Self {
            entry: c.circuit.entry.to_string(),
            reason,
            baseline: c.circuit.path.to_string(),
            current,
        }
    }
}

pub fn vlan_label(vlan: u16) -> String {
    if vlan == 0 {
        "untagged".into()
    } else {
        vlan.to_string()
    }
}

// ── Report rendering ────────────────────────────────────────────────

/// Render a revalidation report in the selected output format.
pub fn render_report(report: &RevalidationReport, global: &GlobalOpts) -> String {
    let color = output::should_color(&global.color_mode());
    output::render_single(
        &global.output_format(),
        report,
        |r| {
            let mut out = String::new();
            let summary = format!("{} of {} circuits changed", r.changed.len(), r.total);
            let _ = write!(out, "{}", output::status_text(&summary, r.is_clean(), color));
            if !r.is_clean() {
                let rows: Vec<ChangedRow> = r.changed.iter().map(ChangedRow::from).collect();
                let _ = write!(out, "\n{}", output::render_table(&rows));
            }
            out
        },
        |r| {
            r.changed
                .iter()
                .map(|c| c.circuit.entry.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )
}

/// Error out with the drift exit code when anything changed.
pub fn drift_result(report: &RevalidationReport) -> Result<(), CliError> {
    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::Drift {
            changed: report.changed.len(),
            total: report.total,
        })
    }
}
