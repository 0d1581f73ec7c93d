// ── Switch and flow-table snapshot types ──
//
// Read-only view of what the controller knows about each switch.
// Port and VLAN values arrive either as raw scalars (OpenFlow 1.0) or
// wrapped `{"value": n}` objects (OpenFlow 1.3); `FieldValue` accepts
// both and `scalar()` is the single place they are unwrapped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;

/// Match field carrying the ingress port.
pub const IN_PORT: &str = "in_port";
/// Match field carrying the VLAN id.
pub const VLAN_VID: &str = "vlan_vid";

// ── OfpVersion ──────────────────────────────────────────────────────

/// OpenFlow protocol version negotiated with a switch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum OfpVersion {
    #[serde(rename = "0x01")]
    #[strum(serialize = "0x01")]
    V10,
    #[serde(rename = "0x04")]
    #[strum(serialize = "0x04")]
    V13,
}

impl OfpVersion {
    /// Reserved port number meaning "send to controller".
    pub const fn controller_port(self) -> u32 {
        match self {
            Self::V10 => 0xfffd,
            Self::V13 => 0xffff_fffd,
        }
    }
}

// ── FieldValue ──────────────────────────────────────────────────────

/// A match or action value as reported by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Raw(u32),
    Wrapped { value: u32 },
    /// Non-numeric fields (MAC addresses, masks, ...). Never used as ports.
    Other(serde_json::Value),
}

impl FieldValue {
    /// The raw numeric value, if this field is numeric.
    pub fn scalar(&self) -> Option<u32> {
        match self {
            Self::Raw(v) | Self::Wrapped { value: v } => Some(*v),
            Self::Other(_) => None,
        }
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        Self::Raw(v)
    }
}

/// Reduce a VLAN field to its 12-bit id (drops the OpenFlow 1.3 present bit).
pub fn normalize_vlan(raw: u32) -> u16 {
    u16::try_from(raw & 0x0fff).unwrap_or_default()
}

// ── Action ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<FieldValue>,
}

impl Action {
    pub fn output(port: u32) -> Self {
        Self {
            action_type: "output".into(),
            port: Some(FieldValue::Raw(port)),
            vlan_id: None,
        }
    }

    pub fn set_vlan(vlan_id: u32) -> Self {
        Self {
            action_type: "set_vlan".into(),
            port: None,
            vlan_id: Some(FieldValue::Raw(vlan_id)),
        }
    }

    /// Destination port for `output` actions.
    pub fn output_port(&self) -> Option<u32> {
        if self.action_type == "output" {
            self.port.as_ref()?.scalar()
        } else {
            None
        }
    }
}

// ── Flow ────────────────────────────────────────────────────────────

/// One installed forwarding rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flow {
    #[serde(default)]
    pub priority: u16,
    #[serde(rename = "match", default)]
    pub match_fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl Flow {
    pub fn in_port(&self) -> Option<u32> {
        self.match_fields.get(IN_PORT)?.scalar()
    }

    /// VLAN id from the match, normalized. `None` when the flow matches any VLAN.
    pub fn vlan_vid(&self) -> Option<u16> {
        self.match_fields
            .get(VLAN_VID)?
            .scalar()
            .map(normalize_vlan)
    }

    pub fn output_ports(&self) -> impl Iterator<Item = u32> + '_ {
        self.actions.iter().filter_map(Action::output_port)
    }
}

// ── Switch ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub dpid: String,
    pub ofp_version: OfpVersion,
    /// `None` until the controller has synchronized the flow table.
    #[serde(default)]
    pub flows: Option<Vec<Flow>>,
}

impl Switch {
    /// Installed flows, or `FlowsUnavailable` if not yet synchronized.
    pub fn flows(&self) -> Result<&[Flow], CoreError> {
        self.flows
            .as_deref()
            .ok_or_else(|| CoreError::FlowsUnavailable {
                dpid: self.dpid.clone(),
            })
    }

    pub fn controller_port(&self) -> u32 {
        self.ofp_version.controller_port()
    }
}
