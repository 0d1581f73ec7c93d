// ── Snapshot topology and tracer ──
//
// A JSON document describing switches, their flow tables, and the
// links between them. Serves as the topology provider for offline
// runs, and backs a control-plane tracer that walks flows and links
// the way the controller would forward a packet.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Flow, Switch, TraceEntry, TraceResult, normalize_vlan};
use crate::provider::{PathTracer, TopologyProvider};

// ── SnapshotTopology ────────────────────────────────────────────────

/// One end of an inter-switch link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkEnd {
    pub dpid: String,
    pub port: u32,
}

/// Bidirectional link between two switch ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub a: LinkEnd,
    pub b: LinkEnd,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotTopology {
    pub switches: Vec<Switch>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl SnapshotTopology {
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw).map_err(|e| CoreError::Topology {
            message: format!("invalid topology snapshot: {e}"),
        })
    }

    /// Read a snapshot document from disk.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CoreError::Topology {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_json(&raw)
    }

    pub fn switch(&self, dpid: &str) -> Option<&Switch> {
        self.switches.iter().find(|s| s.dpid == dpid)
    }

    /// The far end of the link attached to `dpid:port`, if any.
    pub fn peer(&self, dpid: &str, port: u32) -> Option<&LinkEnd> {
        self.links.iter().find_map(|link| {
            if link.a.dpid == dpid && link.a.port == port {
                Some(&link.b)
            } else if link.b.dpid == dpid && link.b.port == port {
                Some(&link.a)
            } else {
                None
            }
        })
    }
}

impl TopologyProvider for SnapshotTopology {
    fn switches(&self) -> Result<Vec<Switch>, CoreError> {
        Ok(self.switches.clone())
    }
}

// ── SnapshotTracer ──────────────────────────────────────────────────

/// Control-plane tracer over a [`SnapshotTopology`].
///
/// At each switch the highest-priority flow matching the ingress port
/// and VLAN wins (first listed on ties). The trace ends at an edge port,
/// on a table miss, or when a (switch, port, VLAN) triple repeats.
#[derive(Debug, Clone, Default)]
pub struct SnapshotTracer {
    topology: SnapshotTopology,
}

impl SnapshotTracer {
    pub fn new(topology: SnapshotTopology) -> Self {
        Self { topology }
    }

    pub fn topology(&self) -> &SnapshotTopology {
        &self.topology
    }

    /// Swap in a newer snapshot; later traces see the new state.
    pub fn replace_topology(&mut self, topology: SnapshotTopology) {
        self.topology = topology;
    }
}

impl TopologyProvider for SnapshotTracer {
    fn switches(&self) -> Result<Vec<Switch>, CoreError> {
        self.topology.switches()
    }
}

impl PathTracer for SnapshotTracer {
    fn trace_path(&self, entry: &TraceEntry) -> Result<TraceResult, CoreError> {
        let first = self
            .topology
            .switch(&entry.dpid)
            .ok_or_else(|| CoreError::UnknownSwitch {
                dpid: entry.dpid.clone(),
            })?;
        first.flows()?;

        let mut steps = Vec::new();
        let mut seen = HashSet::new();
        let (mut dpid, mut port, mut vlan) = (entry.dpid.clone(), entry.in_port, entry.vlan);

        loop {
            if !seen.insert((dpid.clone(), port, vlan)) {
                debug!(%dpid, port, vlan, "trace loop detected");
                break;
            }
            let Some(switch) = self.topology.switch(&dpid) else {
                break;
            };

            let kind = if steps.is_empty() { "starting" } else { "intermediary" };
            let input = endpoint(Some(dpid.as_str()), port, vlan, Some(kind));

            let Some((out_port, out_vlan)) = forward(switch, port, vlan) else {
                steps.push(json!({ "in": input }));
                break;
            };
            steps.push(json!({
                "in": input,
                "out": endpoint(None, out_port, out_vlan, None),
            }));

            let Some(next) = self.topology.peer(&dpid, out_port) else {
                break;
            };
            dpid.clone_from(&next.dpid);
            port = next.port;
            vlan = out_vlan;
        }

        Ok(TraceResult(steps))
    }
}

/// Egress port and VLAN for a packet entering `switch` on `port` tagged `vlan`.
fn forward(switch: &Switch, port: u32, vlan: u16) -> Option<(u32, u16)> {
    let flow = matching_flow(switch, port, vlan)?;
    let controller_port = switch.controller_port();

    let mut out_vlan = vlan;
    for action in &flow.actions {
        match action.action_type.as_str() {
            "set_vlan" => {
                if let Some(v) = action.vlan_id.as_ref().and_then(|v| v.scalar()) {
                    out_vlan = normalize_vlan(v);
                }
            }
            "pop_vlan" => out_vlan = 0,
            _ => {}
        }
        if let Some(out) = action.output_port() {
            if out != controller_port {
                return Some((out, out_vlan));
            }
        }
    }
    None
}

fn matching_flow(switch: &Switch, port: u32, vlan: u16) -> Option<&Flow> {
    let flows = switch.flows().ok()?;
    flows
        .iter()
        .filter(|f| f.in_port() == Some(port))
        .filter(|f| f.vlan_vid().is_none_or(|v| v == vlan))
        .rev()
        .max_by_key(|f| f.priority)
}

fn endpoint(dpid: Option<&str>, port: u32, vlan: u16, kind: Option<&str>) -> Value {
    let mut obj = Map::new();
    if let Some(dpid) = dpid {
        obj.insert("dpid".into(), json!(dpid));
    }
    obj.insert("port".into(), json!(port));
    if vlan != 0 {
        obj.insert("vlan".into(), json!(vlan));
    }
    if let Some(kind) = kind {
        obj.insert("type".into(), json!(kind));
    }
    Value::Object(obj)
}
