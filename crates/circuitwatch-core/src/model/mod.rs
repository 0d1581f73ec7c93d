// ── Domain model ──

pub mod circuit;
pub mod switch;
pub mod trace;

pub use circuit::{CanonicalPath, Circuit, Hop};
pub use switch::{Action, FieldValue, Flow, IN_PORT, OfpVersion, Switch, VLAN_VID, normalize_vlan};
pub use trace::{TraceEntry, TraceResult};
