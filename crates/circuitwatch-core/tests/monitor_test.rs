// Discovery and revalidation tests for `CircuitMonitor` with a scripted tracer.
#![allow(clippy::unwrap_used)]

mod common;

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use circuitwatch_core::{
    CanonicalPath, CircuitMonitor, CoreError, DriftReason, Hop, PathTracer, SnapshotTopology,
    SnapshotTracer, Switch, TopologyProvider, TraceEntry, TraceResult,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// Tracer that answers from a fixed table; unknown entries fail.
#[derive(Default)]
struct ScriptedTracer {
    traces: HashMap<TraceEntry, TraceResult>,
}

impl ScriptedTracer {
    fn with(mut self, entry: TraceEntry, steps: Value) -> Self {
        self.set(entry, steps);
        self
    }

    fn set(&mut self, entry: TraceEntry, steps: Value) {
        self.traces
            .insert(entry, serde_json::from_value(steps).unwrap());
    }

    fn forget(&mut self, entry: &TraceEntry) {
        self.traces.remove(entry);
    }
}

impl PathTracer for ScriptedTracer {
    fn trace_path(&self, entry: &TraceEntry) -> Result<TraceResult, CoreError> {
        self.traces
            .get(entry)
            .cloned()
            .ok_or_else(|| CoreError::Tracer {
                message: format!("no route for {entry}"),
            })
    }
}

struct BrokenTopology;

impl TopologyProvider for BrokenTopology {
    fn switches(&self) -> Result<Vec<Switch>, CoreError> {
        Err(CoreError::Topology {
            message: "controller unreachable".into(),
        })
    }
}

fn topology(doc: Value) -> SnapshotTopology {
    SnapshotTopology::from_json(&doc.to_string()).unwrap()
}

fn step(dpid: &str, in_port: u32, out_port: Option<u32>) -> Value {
    match out_port {
        Some(out) => json!({ "in": { "dpid": dpid, "port": in_port }, "out": { "port": out } }),
        None => json!({ "in": { "dpid": dpid, "port": in_port } }),
    }
}

fn tagged_step(dpid: &str, in_port: u32, out_port: u32, vlan: u16) -> Value {
    json!({
        "in": { "dpid": dpid, "port": in_port, "vlan": vlan },
        "out": { "port": out_port, "vlan": vlan }
    })
}

/// Two independent single-switch circuits on s1 plus an unsynchronized s3.
fn two_circuit_topology() -> SnapshotTopology {
    topology(json!({
        "switches": [
            { "dpid": "s1", "ofp_version": "0x01", "flows": [
                { "match": { "in_port": 1 }, "actions": [{ "action_type": "output", "port": 2 }] },
                { "match": { "in_port": 3 }, "actions": [{ "action_type": "output", "port": 4 }] },
                { "match": { "in_port": 6 }, "actions": [{ "action_type": "output", "port": 65533 }] }
            ] },
            { "dpid": "s3", "ofp_version": "0x04" }
        ]
    }))
}

fn two_circuit_tracer() -> ScriptedTracer {
    ScriptedTracer::default()
        .with(TraceEntry::new("s1", 1, 0), json!([step("s1", 1, Some(2))]))
        .with(TraceEntry::new("s1", 3, 0), json!([step("s1", 3, Some(4))]))
}

// ── Discovery ───────────────────────────────────────────────────────

#[test]
fn discovery_collapses_bidirectional_circuit() {
    // s1:1 ⇄ s2:1 over the s1:2 — s2:5 link, VLAN 100 both ways.
    let topo = topology(json!({
        "switches": [
            { "dpid": "s1", "ofp_version": "0x01", "flows": [
                { "match": { "in_port": 1, "vlan_vid": 100 }, "actions": [{ "action_type": "output", "port": 2 }] },
                { "match": { "in_port": 2, "vlan_vid": 100 }, "actions": [{ "action_type": "output", "port": 1 }] }
            ] },
            { "dpid": "s2", "ofp_version": "0x04", "flows": [
                { "match": { "in_port": { "value": 5 }, "vlan_vid": { "value": 4196 } },
                  "actions": [{ "action_type": "output", "port": { "value": 1 } }] },
                { "match": { "in_port": { "value": 1 }, "vlan_vid": { "value": 4196 } },
                  "actions": [{ "action_type": "output", "port": { "value": 5 } }] }
            ] }
        ]
    }));
    let tracer = ScriptedTracer::default()
        .with(
            TraceEntry::new("s1", 1, 100),
            json!([tagged_step("s1", 1, 2, 100), tagged_step("s2", 5, 1, 100)]),
        )
        .with(
            TraceEntry::new("s1", 2, 100),
            json!([tagged_step("s1", 2, 1, 100)]),
        )
        .with(
            TraceEntry::new("s2", 5, 100),
            json!([tagged_step("s2", 5, 1, 100)]),
        )
        .with(
            TraceEntry::new("s2", 1, 100),
            json!([tagged_step("s2", 1, 5, 100), tagged_step("s1", 2, 1, 100)]),
        );

    let monitor = CircuitMonitor::discover(tracer, &topo).unwrap();

    let circuits = monitor.store().circuits();
    assert_eq!(circuits.len(), 1);
    assert_eq!(circuits[0].entry, TraceEntry::new("s1", 1, 100));
    assert_eq!(circuits[0].path.len(), 2);
}

#[test]
fn discovery_is_deterministic() {
    let topo = two_circuit_topology();
    let mut monitor = CircuitMonitor::new(two_circuit_tracer());

    monitor.find_circuits(&topo).unwrap();
    let first = monitor.store().circuits().to_vec();
    monitor.find_circuits(&topo).unwrap();

    assert_eq!(monitor.store().circuits(), first.as_slice());
    assert_eq!(first.len(), 2);
}

#[test]
fn tracer_failure_drops_only_that_candidate() {
    let mut tracer = two_circuit_tracer();
    tracer.forget(&TraceEntry::new("s1", 3, 0));

    let monitor = CircuitMonitor::discover(tracer, &two_circuit_topology()).unwrap();

    let entries: Vec<_> = monitor.store().iter().map(|c| c.entry.clone()).collect();
    assert_eq!(entries, vec![TraceEntry::new("s1", 1, 0)]);
}

#[test]
fn malformed_trace_drops_candidate_during_discovery() {
    let tracer = two_circuit_tracer().with(
        TraceEntry::new("s1", 3, 0),
        json!([{ "out": { "port": 4 } }]),
    );
    let monitor = CircuitMonitor::discover(tracer, &two_circuit_topology()).unwrap();
    assert_eq!(monitor.store().len(), 1);
}

#[test]
fn topology_failure_is_fatal() {
    let mut monitor = CircuitMonitor::new(two_circuit_tracer());
    let err = monitor.find_circuits(&BrokenTopology).unwrap_err();
    assert!(matches!(err, CoreError::Topology { .. }));
    assert!(monitor.store().rebuilt_at().is_none());
}

#[test]
fn rediscovery_replaces_store() {
    let mut monitor = CircuitMonitor::discover(two_circuit_tracer(), &two_circuit_topology()).unwrap();
    assert_eq!(monitor.store().len(), 2);

    let empty = topology(json!({ "switches": [] }));
    assert_eq!(monitor.find_circuits(&empty).unwrap(), 0);
    assert!(monitor.store().is_empty());
}

// ── Revalidation ────────────────────────────────────────────────────

#[test]
fn revalidation_is_idempotent() {
    let monitor = CircuitMonitor::discover(two_circuit_tracer(), &two_circuit_topology()).unwrap();

    for _ in 0..2 {
        let report = monitor.run_traces();
        assert!(report.is_clean());
        assert_eq!(report.total, 2);
    }
}

#[test]
fn drift_is_reported_and_store_left_alone() {
    let entry = TraceEntry::new("s1", 1, 0);
    let topo = topology(json!({
        "switches": [
            { "dpid": "s1", "ofp_version": "0x01", "flows": [
                { "match": { "in_port": 1 }, "actions": [{ "action_type": "output", "port": 2 }] }
            ] }
        ]
    }));
    let tracer = ScriptedTracer::default().with(
        entry.clone(),
        json!([step("s1", 1, Some(2)), step("s2", 3, Some(5))]),
    );
    let mut monitor = CircuitMonitor::discover(tracer, &topo).unwrap();
    let baseline = monitor.store().circuits()[0].path.clone();

    monitor.tracer_mut().set(
        entry.clone(),
        json!([step("s1", 1, Some(2)), step("s3", 1, None)]),
    );
    let report = monitor.run_traces();

    assert_eq!(report.total, 1);
    assert_eq!(report.changed_entries(), vec![&entry]);
    assert_eq!(
        report.changed[0].reason,
        DriftReason::PathChanged {
            current: CanonicalPath(vec![Hop::new("s1", 1, Some(2)), Hop::new("s3", 1, None)]),
        }
    );
    assert_eq!(monitor.store().circuits()[0].path, baseline);
}

#[test]
fn revalidation_logs_changed_circuits_with_baseline_path() {
    let entry = TraceEntry::new("s1", 1, 0);
    let topo = topology(json!({
        "switches": [
            { "dpid": "s1", "ofp_version": "0x01", "flows": [
                { "match": { "in_port": 1 }, "actions": [{ "action_type": "output", "port": 2 }] },
                { "match": { "in_port": 3 }, "actions": [{ "action_type": "output", "port": 4 }] }
            ] }
        ]
    }));
    let tracer = ScriptedTracer::default()
        .with(entry.clone(), json!([step("s1", 1, Some(2)), step("s2", 5, None)]))
        .with(TraceEntry::new("s1", 3, 0), json!([step("s1", 3, Some(4))]));
    let mut monitor = CircuitMonitor::discover(tracer, &topo).unwrap();
    let baseline = monitor
        .store()
        .circuits()
        .iter()
        .find(|c| c.entry == entry)
        .unwrap()
        .path
        .to_string();

    monitor
        .tracer_mut()
        .set(entry.clone(), json!([step("s1", 1, Some(2)), step("s3", 1, None)]));

    let (logs, _guard) = common::capture_logs();
    let report = monitor.run_traces();
    assert_eq!(report.changed.len(), 1);

    let changed = logs.line("circuit changed").unwrap();
    assert!(changed.contains(&format!("entry={entry}")), "{changed}");
    assert!(changed.contains(&baseline), "{changed}");
    assert!(changed.contains("s2"), "{changed}");

    let summary = logs.line("revalidation complete").unwrap();
    assert!(summary.contains("changed_count=1"), "{summary}");
    assert!(summary.contains("total=2"), "{summary}");
}

#[test]
fn malformed_retrace_counts_as_changed() {
    let mut monitor = CircuitMonitor::discover(two_circuit_tracer(), &two_circuit_topology()).unwrap();
    monitor.tracer_mut().set(
        TraceEntry::new("s1", 3, 0),
        json!([{ "in": { "port": 3 } }]),
    );

    let report = monitor.run_traces();

    assert_eq!(report.changed.len(), 1);
    assert!(matches!(
        report.changed[0].reason,
        DriftReason::Unresolvable { .. }
    ));
}

#[test]
fn failed_retrace_counts_as_changed_in_store_order() {
    let mut monitor = CircuitMonitor::discover(two_circuit_tracer(), &two_circuit_topology()).unwrap();
    monitor.tracer_mut().forget(&TraceEntry::new("s1", 1, 0));
    monitor.tracer_mut().forget(&TraceEntry::new("s1", 3, 0));

    let report = monitor.run_traces();

    assert_eq!(
        report.changed_entries(),
        vec![&TraceEntry::new("s1", 1, 0), &TraceEntry::new("s1", 3, 0)]
    );
    assert!(
        report
            .changed
            .iter()
            .all(|c| matches!(c.reason, DriftReason::TraceFailed { .. }))
    );
}

// ── Snapshot tracer end to end ──────────────────────────────────────

#[test]
fn snapshot_refresh_sees_new_topology() {
    let doc = |s2_out: u32| {
        json!({
            "switches": [
                { "dpid": "s1", "ofp_version": "0x01", "flows": [
                    { "match": { "in_port": 1 }, "actions": [{ "action_type": "output", "port": 2 }] }
                ] },
                { "dpid": "s2", "ofp_version": "0x01", "flows": [
                    { "match": { "in_port": 1 }, "actions": [{ "action_type": "output", "port": s2_out }] }
                ] }
            ],
            "links": [ { "a": { "dpid": "s1", "port": 2 }, "b": { "dpid": "s2", "port": 1 } } ]
        })
    };
    let tracer = SnapshotTracer::new(topology(doc(3)));
    let mut monitor = CircuitMonitor::new(tracer);
    assert_eq!(monitor.refresh().unwrap(), 1);
    assert!(monitor.run_traces().is_clean());

    monitor.tracer_mut().replace_topology(topology(doc(4)));
    let report = monitor.run_traces();
    assert_eq!(report.changed_entries(), vec![&TraceEntry::new("s1", 1, 0)]);
}
