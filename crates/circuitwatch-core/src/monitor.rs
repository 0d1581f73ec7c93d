// ── Circuit monitor ──
//
// Discovery (filter → trace → canonicalize → deduplicate → store) and
// revalidation (re-trace every stored circuit, compare paths). Both are
// sequential and isolate per-item failures: a bad switch or a failed
// trace never aborts the batch.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::canonical::{PathDeduplicator, StepCanonicalizer};
use crate::error::CoreError;
use crate::filter;
use crate::model::{CanonicalPath, Circuit, TraceEntry};
use crate::provider::{Canonicalizer, Deduplicator, PathTracer, TopologyProvider};
use crate::store::CircuitStore;

// ── Revalidation report ─────────────────────────────────────────────

/// Why a stored circuit was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriftReason {
    /// The trace now takes a different path.
    PathChanged { current: CanonicalPath },
    /// The new trace result could not be canonicalized.
    Unresolvable { error: String },
    /// The tracer itself failed.
    TraceFailed { error: String },
}

impl fmt::Display for DriftReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathChanged { current } => write!(f, "path now {current}"),
            Self::Unresolvable { error } => write!(f, "unresolvable: {error}"),
            Self::TraceFailed { error } => write!(f, "trace failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedCircuit {
    #[serde(flatten)]
    pub circuit: Circuit,
    pub reason: DriftReason,
}

/// Outcome of one revalidation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RevalidationReport {
    /// Changed circuits, in store order.
    pub changed: Vec<ChangedCircuit>,
    /// Number of circuits checked.
    pub total: usize,
}

impl RevalidationReport {
    pub fn is_clean(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn changed_entries(&self) -> Vec<&TraceEntry> {
        self.changed.iter().map(|c| &c.circuit.entry).collect()
    }
}

// ── CircuitMonitor ──────────────────────────────────────────────────

/// Owns the circuit store and drives the tracer over it.
pub struct CircuitMonitor<T, C = StepCanonicalizer, D = PathDeduplicator> {
    tracer: T,
    canonicalizer: C,
    deduplicator: D,
    store: CircuitStore,
}

impl<T: PathTracer> CircuitMonitor<T> {
    /// Empty monitor using the stock canonicalizer and deduplicator.
    pub fn new(tracer: T) -> Self {
        Self::with_parts(tracer, StepCanonicalizer, PathDeduplicator)
    }

    /// Build a monitor and run discovery immediately.
    pub fn discover(tracer: T, topology: &impl TopologyProvider) -> Result<Self, CoreError> {
        let mut monitor = Self::new(tracer);
        monitor.find_circuits(topology)?;
        Ok(monitor)
    }
}

impl<T, C, D> CircuitMonitor<T, C, D>
where
    T: PathTracer,
    C: Canonicalizer,
    D: Deduplicator,
{
    pub fn with_parts(tracer: T, canonicalizer: C, deduplicator: D) -> Self {
        Self {
            tracer,
            canonicalizer,
            deduplicator,
            store: CircuitStore::new(),
        }
    }

    pub fn store(&self) -> &CircuitStore {
        &self.store
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut T {
        &mut self.tracer
    }

    /// Discover every circuit in the topology and rebuild the store.
    ///
    /// Returns the number of circuits stored. Only a failure to list
    /// switches is fatal; per-switch and per-trace problems are logged
    /// and skipped.
    pub fn find_circuits(&mut self, topology: &impl TopologyProvider) -> Result<usize, CoreError> {
        let circuits = self.collect_circuits(topology)?;
        Ok(self.install(circuits))
    }

    /// Rediscover using the tracer's own view of the topology.
    pub fn refresh(&mut self) -> Result<usize, CoreError>
    where
        T: TopologyProvider,
    {
        let circuits = self.collect_circuits(&self.tracer)?;
        Ok(self.install(circuits))
    }

    fn collect_circuits(&self, topology: &impl TopologyProvider) -> Result<Vec<Circuit>, CoreError> {
        let switches = topology.switches()?;

        let mut candidates = Vec::new();
        for switch in &switches {
            for entry in filter::trace_entries(switch) {
                match self.trace_circuit(&entry) {
                    Ok(path) => candidates.push(Circuit::new(entry, path)),
                    Err(e) => warn!(%entry, error = %e, "dropping circuit candidate"),
                }
            }
        }
        debug!(
            switches = switches.len(),
            candidates = candidates.len(),
            "circuit candidates traced"
        );

        Ok(self.deduplicator.deduplicate(candidates, &switches))
    }

    fn install(&mut self, circuits: Vec<Circuit>) -> usize {
        let count = circuits.len();
        self.store.replace(circuits);
        info!(circuits = count, "circuit discovery complete");
        count
    }

    /// Re-trace every stored circuit and report the ones whose path drifted.
    ///
    /// Read-only: stored baselines are left untouched.
    pub fn run_traces(&self) -> RevalidationReport {
        let mut report = RevalidationReport {
            changed: Vec::new(),
            total: self.store.len(),
        };

        for circuit in &self.store {
            if let Some(reason) = self.check_circuit(circuit) {
                report.changed.push(ChangedCircuit {
                    circuit: circuit.clone(),
                    reason,
                });
            }
        }

        for changed in &report.changed {
            info!(
                entry = %changed.circuit.entry,
                path = %changed.circuit.path,
                reason = %changed.reason,
                "circuit changed"
            );
        }
        info!(
            changed = ?report.changed_entries(),
            changed_count = report.changed.len(),
            total = report.total,
            "revalidation complete"
        );
        report
    }

    fn trace_circuit(&self, entry: &TraceEntry) -> Result<CanonicalPath, CoreError> {
        let result = self.tracer.trace_path(entry)?;
        self.canonicalizer.canonicalize(&result)
    }

    fn check_circuit(&self, circuit: &Circuit) -> Option<DriftReason> {
        let result = match self.tracer.trace_path(&circuit.entry) {
            Ok(result) => result,
            Err(e) => {
                debug!(entry = %circuit.entry, error = %e, "re-trace failed");
                return Some(DriftReason::TraceFailed {
                    error: e.to_string(),
                });
            }
        };

        match self.canonicalizer.canonicalize(&result) {
            Ok(current) if current == circuit.path => None,
            Ok(current) => Some(DriftReason::PathChanged { current }),
            Err(e) => Some(DriftReason::Unresolvable {
                error: e.to_string(),
            }),
        }
    }
}
