// Wire types for the trace service.
//
// Submission:  PUT  /trace       {"trace": {...}}  -> {"result": {"trace_id": ...}}
// Progress:    GET  /trace/{id}                    -> {"result": [{"type": ...}, ...]}

use serde::{Deserialize, Deserializer, Serialize};

/// Progress `type` tag that marks a finished trace.
pub const TERMINAL_TYPE: &str = "last";

/// Body of a trace submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRequest {
    pub trace: TraceRequestBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRequestBody {
    pub switch: TraceSwitch,
    pub eth: TraceEth,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSwitch {
    pub dpid: String,
    pub in_port: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEth {
    pub dl_vlan: u16,
}

impl TraceRequest {
    pub fn new(dpid: impl Into<String>, in_port: u32, dl_vlan: u16) -> Self {
        Self {
            trace: TraceRequestBody {
                switch: TraceSwitch {
                    dpid: dpid.into(),
                    in_port,
                },
                eth: TraceEth { dl_vlan },
            },
        }
    }
}

/// Envelope returned by a trace submission.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    pub result: SubmitResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResult {
    /// Some service versions emit the id as a number.
    #[serde(deserialize_with = "string_or_number")]
    pub trace_id: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

/// Progress of a submitted trace.
///
/// Entries are kept as raw JSON: the service attaches hop details that
/// vary by entry type, and consumers only need the `type` tag of the
/// most recent entry plus the full document for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceProgress {
    #[serde(default)]
    pub result: Vec<serde_json::Value>,
}

impl TraceProgress {
    /// `type` tag of the most recent progress entry.
    pub fn last_type(&self) -> Option<&str> {
        self.result.last()?.get("type")?.as_str()
    }

    /// Whether the most recent entry carries the terminal tag.
    pub fn is_terminal(&self) -> bool {
        self.last_type() == Some(TERMINAL_TYPE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_to_wire_shape() {
        let req = TraceRequest::new("00:00:00:00:00:00:00:01", 1, 100);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "trace": {
                    "switch": { "dpid": "00:00:00:00:00:00:00:01", "in_port": 1 },
                    "eth": { "dl_vlan": 100 }
                }
            })
        );
    }

    #[test]
    fn submit_accepts_numeric_trace_id() {
        let resp: SubmitResponse =
            serde_json::from_value(json!({ "result": { "trace_id": 30001 } })).unwrap();
        assert_eq!(resp.result.trace_id, "30001");
    }

    #[test]
    fn progress_terminal_only_on_last_entry() {
        let running: TraceProgress = serde_json::from_value(json!({
            "result": [{ "type": "starting" }, { "type": "intermediary" }]
        }))
        .unwrap();
        assert_eq!(running.last_type(), Some("intermediary"));
        assert!(!running.is_terminal());

        let done: TraceProgress = serde_json::from_value(json!({
            "result": [{ "type": "starting" }, { "type": "last" }]
        }))
        .unwrap();
        assert!(done.is_terminal());
    }

    #[test]
    fn progress_empty_is_not_terminal() {
        let empty: TraceProgress = serde_json::from_value(json!({ "result": [] })).unwrap();
        assert_eq!(empty.last_type(), None);
        assert!(!empty.is_terminal());
    }
}
