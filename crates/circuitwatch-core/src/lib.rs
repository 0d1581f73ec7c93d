//! Circuit discovery and drift detection for OpenFlow networks.
//!
//! - **[`CircuitMonitor`]**: scans every switch's flow table for circuit
//!   ingress rules, traces each candidate through the control plane,
//!   collapses the results into distinct circuits and keeps them in a
//!   [`CircuitStore`]. [`run_traces()`](CircuitMonitor::run_traces)
//!   re-traces the stored circuits and reports those whose path changed.
//!
//! - **Collaborator seams** ([`provider`]): [`TopologyProvider`],
//!   [`PathTracer`], [`Canonicalizer`] and [`Deduplicator`]. The stock
//!   implementations are [`SnapshotTopology`] / [`SnapshotTracer`] (JSON
//!   snapshots) plus [`StepCanonicalizer`] and [`PathDeduplicator`].
//!
//! - **[`ImportantCircuitPoller`]**: submits operator-designated circuits
//!   to the external trace service and polls each one until it finishes.

pub mod canonical;
pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod model;
pub mod monitor;
pub mod poller;
pub mod provider;
pub mod snapshot;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use canonical::{PathDeduplicator, StepCanonicalizer};
pub use config::{
    DEFAULT_POLL_INTERVAL, ImportantCircuitSpec, PollerConfig, TlsVerification, TraceServiceConfig,
};
pub use error::CoreError;
pub use monitor::{ChangedCircuit, CircuitMonitor, DriftReason, RevalidationReport};
pub use poller::{ImportantCircuitPoller, PollState, TracePoll};
pub use provider::{Canonicalizer, Deduplicator, PathTracer, TopologyProvider};
pub use snapshot::{Link, LinkEnd, SnapshotTopology, SnapshotTracer};
pub use store::CircuitStore;

pub use model::{
    Action, CanonicalPath, Circuit, FieldValue, Flow, Hop, OfpVersion, Switch, TraceEntry,
    TraceResult,
};
