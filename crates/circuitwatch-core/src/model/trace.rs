use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a control-plane trace starts: switch, ingress port, VLAN.
///
/// VLAN `0` means untagged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TraceEntry {
    pub dpid: String,
    pub in_port: u32,
    pub vlan: u16,
}

impl TraceEntry {
    pub fn new(dpid: impl Into<String>, in_port: u32, vlan: u16) -> Self {
        Self {
            dpid: dpid.into(),
            in_port,
            vlan,
        }
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dpid, self.in_port)?;
        if self.vlan != 0 {
            write!(f, ".{}", self.vlan)?;
        }
        Ok(())
    }
}

/// Raw tracer output: one JSON object per step, in traversal order.
///
/// Steps look like `{"in": {"dpid", "port", "vlan"?, "type"}, "out"?: {"port", "vlan"?}}`.
/// The shape is not trusted here; canonicalization validates it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceResult(pub Vec<serde_json::Value>);

impl TraceResult {
    pub fn steps(&self) -> &[serde_json::Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<serde_json::Value>> for TraceResult {
    fn from(steps: Vec<serde_json::Value>) -> Self {
        Self(steps)
    }
}
