// ── Canonical paths and circuits ──
//
// A CanonicalPath is the comparable form of a trace: one Hop per switch
// visited. Equality across runs is plain structural equality; the
// direction checks below back deduplication.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::trace::TraceEntry;

/// One switch traversal within a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hop {
    pub dpid: String,
    pub in_port: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_vlan: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_port: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_vlan: Option<u16>,
}

impl Hop {
    pub fn new(dpid: impl Into<String>, in_port: u32, out_port: Option<u32>) -> Self {
        Self {
            dpid: dpid.into(),
            in_port,
            in_vlan: None,
            out_port,
            out_vlan: None,
        }
    }

    pub fn with_vlans(mut self, in_vlan: Option<u16>, out_vlan: Option<u16>) -> Self {
        self.in_vlan = in_vlan;
        self.out_vlan = out_vlan;
        self
    }

    /// Whether `other` is this hop traversed in the opposite direction.
    fn mirrors(&self, other: &Self) -> bool {
        self.dpid == other.dpid
            && self.out_port == Some(other.in_port)
            && other.out_port == Some(self.in_port)
            && self.in_vlan == other.out_vlan
            && self.out_vlan == other.in_vlan
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}", self.dpid, self.in_port)?;
        if let Some(v) = self.in_vlan {
            write!(f, ".{v}")?;
        }
        write!(f, "→")?;
        match self.out_port {
            Some(p) => write!(f, "{p}")?,
            None => write!(f, "-")?,
        }
        if let Some(v) = self.out_vlan {
            write!(f, ".{v}")?;
        }
        write!(f, "]")
    }
}

/// Ordered hop sequence of a traced circuit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalPath(pub Vec<Hop>);

impl CanonicalPath {
    pub fn hops(&self) -> &[Hop] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Hop> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Hop> {
        self.0.last()
    }

    /// Whether `other` is the same physical path walked end to start.
    pub fn is_reverse_of(&self, other: &Self) -> bool {
        self.len() == other.len()
            && !self.is_empty()
            && self
                .0
                .iter()
                .zip(other.0.iter().rev())
                .all(|(a, b)| a.mirrors(b))
    }

    /// Whether every hop of this path also appears in `other`, and the two differ.
    pub fn is_subpath_of(&self, other: &Self) -> bool {
        self != other
            && self.len() < other.len()
            && self.0.iter().all(|hop| other.0.contains(hop))
    }

    /// Whether this path ends where `other` begins and vice versa.
    pub fn returns_via(&self, other: &Self) -> bool {
        match (self.first(), self.last(), other.first(), other.last()) {
            (Some(start), Some(end), Some(o_start), Some(o_end)) => {
                start.dpid == o_end.dpid
                    && o_end.out_port == Some(start.in_port)
                    && o_end.out_vlan == start.in_vlan
                    && end.dpid == o_start.dpid
                    && end.out_port == Some(o_start.in_port)
                    && end.out_vlan == o_start.in_vlan
            }
            _ => false,
        }
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hop) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{hop}")?;
        }
        Ok(())
    }
}

impl FromIterator<Hop> for CanonicalPath {
    fn from_iter<I: IntoIterator<Item = Hop>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A discovered circuit: how to trace it, and the path it took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circuit {
    pub entry: TraceEntry,
    pub path: CanonicalPath,
}

impl Circuit {
    pub fn new(entry: TraceEntry, path: CanonicalPath) -> Self {
        Self { entry, path }
    }
}
