// ── Stock canonicalizer and deduplicator ──
//
// StepCanonicalizer reads the `{"in": {...}, "out": {...}}` step objects
// produced by control-plane tracers. PathDeduplicator reduces a discovery
// batch to distinct circuits: no exact repeats, no sub-paths of a longer
// circuit, one representative per bidirectional pair.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{CanonicalPath, Circuit, Hop, Switch, TraceResult};
use crate::provider::{Canonicalizer, Deduplicator};

// ── StepCanonicalizer ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct StepCanonicalizer;

impl Canonicalizer for StepCanonicalizer {
    fn canonicalize(&self, result: &TraceResult) -> Result<CanonicalPath, CoreError> {
        if result.is_empty() {
            return Err(missing("in"));
        }
        result.steps().iter().map(step_to_hop).collect()
    }
}

fn step_to_hop(step: &Value) -> Result<Hop, CoreError> {
    let input = step.get("in").ok_or_else(|| missing("in"))?;
    let dpid = input
        .get("dpid")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("in.dpid"))?;
    let in_port = port_field(input).ok_or_else(|| missing("in.port"))?;

    let (out_port, out_vlan) = match step.get("out") {
        None | Some(Value::Null) => (None, None),
        Some(out) => (
            Some(port_field(out).ok_or_else(|| missing("out.port"))?),
            vlan_field(out),
        ),
    };

    Ok(Hop::new(dpid, in_port, out_port).with_vlans(vlan_field(input), out_vlan))
}

fn port_field(obj: &Value) -> Option<u32> {
    obj.get("port")
        .and_then(Value::as_u64)
        .and_then(|p| u32::try_from(p).ok())
}

/// Absent or zero VLAN both mean untagged.
fn vlan_field(obj: &Value) -> Option<u16> {
    obj.get("vlan")
        .and_then(Value::as_u64)
        .and_then(|v| u16::try_from(v).ok())
        .filter(|v| *v != 0)
}

fn missing(field: &str) -> CoreError {
    CoreError::MalformedTrace {
        field: field.into(),
    }
}

// ── PathDeduplicator ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct PathDeduplicator;

impl Deduplicator for PathDeduplicator {
    fn deduplicate(&self, candidates: Vec<Circuit>, _topology: &[Switch]) -> Vec<Circuit> {
        let total = candidates.len();

        // Drop sub-paths first so that partial traces starting mid-circuit
        // cannot survive by pairing with each other.
        let full: Vec<&Circuit> = candidates
            .iter()
            .filter(|c| {
                let covered = candidates.iter().any(|other| c.path.is_subpath_of(&other.path));
                if covered {
                    debug!(entry = %c.entry, "dropping sub-circuit");
                }
                !covered
            })
            .collect();

        let mut kept: Vec<Circuit> = Vec::with_capacity(full.len());
        for circuit in full {
            let duplicate = kept
                .iter()
                .any(|k| k.path == circuit.path || k.path.is_reverse_of(&circuit.path));
            if duplicate {
                debug!(entry = %circuit.entry, "dropping duplicate circuit");
            } else {
                kept.push(circuit.clone());
            }
        }

        for circuit in &kept {
            let has_return = candidates
                .iter()
                .any(|other| circuit.path.returns_via(&other.path));
            if !has_return {
                warn!(entry = %circuit.entry, path = %circuit.path, "circuit has no return path");
            }
        }

        debug!(candidates = total, kept = kept.len(), "deduplicated circuits");
        kept
    }
}
