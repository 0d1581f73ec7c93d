// ── Collaborator seams ──
//
// The engine consumes topology, tracing, and canonicalization through
// these traits. `snapshot` and `canonical` provide the stock
// implementations; tests plug in their own.

use crate::error::CoreError;
use crate::model::{CanonicalPath, Circuit, Switch, TraceEntry, TraceResult};

/// Source of the current switch set and their installed flows.
pub trait TopologyProvider {
    /// Snapshot of every known switch, in provider order.
    fn switches(&self) -> Result<Vec<Switch>, CoreError>;
}

/// Control-plane path tracer.
pub trait PathTracer {
    /// Trace the path a packet matching `entry` would take.
    fn trace_path(&self, entry: &TraceEntry) -> Result<TraceResult, CoreError>;
}

/// Turns raw tracer output into a comparable path.
pub trait Canonicalizer {
    /// Fails with `MalformedTrace` when the result lacks expected fields.
    fn canonicalize(&self, result: &TraceResult) -> Result<CanonicalPath, CoreError>;
}

/// Collapses a candidate batch into the set of distinct circuits.
pub trait Deduplicator {
    fn deduplicate(&self, candidates: Vec<Circuit>, topology: &[Switch]) -> Vec<Circuit>;
}

impl<T: TopologyProvider + ?Sized> TopologyProvider for &T {
    fn switches(&self) -> Result<Vec<Switch>, CoreError> {
        (**self).switches()
    }
}

impl<T: PathTracer + ?Sized> PathTracer for &T {
    fn trace_path(&self, entry: &TraceEntry) -> Result<TraceResult, CoreError> {
        (**self).trace_path(entry)
    }
}
