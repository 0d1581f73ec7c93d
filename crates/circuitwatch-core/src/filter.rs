// ── Flow filter ──
//
// Picks the flows that look like circuit ingress points: a concrete
// ingress port, and an output somewhere other than the controller.

use tracing::debug;

use crate::model::{Flow, Switch, TraceEntry};

/// Whether `flow` qualifies as a circuit ingress rule on a switch whose
/// controller port is `controller_port`.
pub fn is_circuit_ingress(flow: &Flow, controller_port: u32) -> bool {
    matches!(flow.in_port(), Some(port) if port != 0)
        && flow.output_ports().any(|port| port != controller_port)
}

/// Ordered subset of the switch's flows that qualify as circuit ingress.
///
/// A switch whose flow table is not synchronized yields nothing.
pub fn circuit_flows(switch: &Switch) -> Vec<&Flow> {
    let flows = match switch.flows() {
        Ok(flows) => flows,
        Err(e) => {
            debug!(dpid = %switch.dpid, error = %e, "skipping switch");
            return Vec::new();
        }
    };

    let controller_port = switch.controller_port();
    flows
        .iter()
        .filter(|flow| is_circuit_ingress(flow, controller_port))
        .collect()
}

/// Build the trace request for a selected flow. Missing VLAN means untagged.
pub fn trace_entry(switch: &Switch, flow: &Flow) -> Option<TraceEntry> {
    let in_port = flow.in_port()?;
    Some(TraceEntry::new(
        switch.dpid.clone(),
        in_port,
        flow.vlan_vid().unwrap_or(0),
    ))
}

/// Trace requests for every qualifying flow on the switch.
pub fn trace_entries(switch: &Switch) -> Vec<TraceEntry> {
    circuit_flows(switch)
        .into_iter()
        .filter_map(|flow| trace_entry(switch, flow))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Action, FieldValue, OfpVersion};
    use pretty_assertions::assert_eq;

    fn flow(in_port: Option<FieldValue>, vlan: Option<u32>, actions: Vec<Action>) -> Flow {
        let mut f = Flow {
            actions,
            ..Flow::default()
        };
        if let Some(p) = in_port {
            f.match_fields.insert("in_port".into(), p);
        }
        if let Some(v) = vlan {
            f.match_fields.insert("vlan_vid".into(), FieldValue::Wrapped { value: v });
        }
        f
    }

    fn switch(version: OfpVersion, flows: Vec<Flow>) -> Switch {
        Switch {
            dpid: "00:00:00:00:00:00:00:01".into(),
            ofp_version: version,
            flows: Some(flows),
        }
    }

    #[test]
    fn zero_ingress_port_is_rejected() {
        let f = flow(Some(FieldValue::Raw(0)), None, vec![Action::output(2)]);
        assert!(!is_circuit_ingress(&f, 0xfffd));
    }

    #[test]
    fn missing_ingress_port_is_rejected() {
        let f = flow(None, None, vec![Action::output(2)]);
        assert!(!is_circuit_ingress(&f, 0xfffd));
    }

    #[test]
    fn controller_only_output_is_rejected() {
        let f = flow(Some(FieldValue::Raw(1)), None, vec![Action::output(0xfffd)]);
        assert!(!is_circuit_ingress(&f, 0xfffd));
    }

    #[test]
    fn any_non_controller_output_qualifies() {
        let f = flow(
            Some(FieldValue::Raw(1)),
            None,
            vec![Action::output(0xfffd), Action::output(3)],
        );
        assert!(is_circuit_ingress(&f, 0xfffd));
    }

    #[test]
    fn non_output_actions_do_not_qualify() {
        let f = flow(Some(FieldValue::Raw(1)), None, vec![Action::set_vlan(10)]);
        assert!(!is_circuit_ingress(&f, 0xfffd));
    }

    #[test]
    fn sentinel_is_version_specific() {
        // 0xfffd is an ordinary port number on OpenFlow 1.3.
        let f = flow(Some(FieldValue::Raw(1)), None, vec![Action::output(0xfffd)]);
        let of10 = switch(OfpVersion::V10, vec![f.clone()]);
        let of13 = switch(OfpVersion::V13, vec![f]);
        assert!(circuit_flows(&of10).is_empty());
        assert_eq!(circuit_flows(&of13).len(), 1);
    }

    #[test]
    fn wrapped_values_are_unwrapped_for_entries() {
        let f = flow(
            Some(FieldValue::Wrapped { value: 7 }),
            Some(0x1000 | 42),
            vec![Action {
                port: Some(FieldValue::Wrapped { value: 8 }),
                ..Action::output(0)
            }],
        );
        let sw = switch(OfpVersion::V13, vec![f]);
        assert_eq!(
            trace_entries(&sw),
            vec![TraceEntry::new("00:00:00:00:00:00:00:01", 7, 42)]
        );
    }

    #[test]
    fn selection_preserves_flow_order() {
        let flows = vec![
            flow(Some(FieldValue::Raw(3)), Some(30), vec![Action::output(1)]),
            flow(Some(FieldValue::Raw(0)), Some(99), vec![Action::output(1)]),
            flow(Some(FieldValue::Raw(1)), None, vec![Action::output(2)]),
        ];
        let sw = switch(OfpVersion::V10, flows);
        let entries: Vec<_> = trace_entries(&sw).into_iter().map(|e| (e.in_port, e.vlan)).collect();
        assert_eq!(entries, vec![(3, 30), (1, 0)]);
    }

    #[test]
    fn unsynchronized_switch_yields_nothing() {
        let sw = Switch {
            dpid: "00:00:00:00:00:00:00:02".into(),
            ofp_version: OfpVersion::V13,
            flows: None,
        };
        assert!(circuit_flows(&sw).is_empty());
    }
}
