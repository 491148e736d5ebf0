//! Structured log events for demonstration runs.
//!
//! One event is recorded when a run starts, one per block and one when the
//! run finishes. Failed blocks carry the stable error code of the failure.

use serde::{Deserialize, Serialize};

pub const COMPONENT: &str = "object_statics_demo";

/// Structured log event emitted for every demonstration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredLogEvent {
    pub trace_id: String,
    pub component: String,
    pub event: String,
    pub outcome: String,
    pub error_code: Option<String>,
}

impl StructuredLogEvent {
    pub fn success(trace_id: &str, event: &str) -> Self {
        Self {
            trace_id: trace_id.to_string(),
            component: COMPONENT.to_string(),
            event: event.to_string(),
            outcome: "success".to_string(),
            error_code: None,
        }
    }

    pub fn failure(trace_id: &str, event: &str, error_code: &str) -> Self {
        Self {
            trace_id: trace_id.to_string(),
            component: COMPONENT.to_string(),
            event: event.to_string(),
            outcome: "failure".to_string(),
            error_code: Some(error_code.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error_code.is_some()
    }
}

/// Append-only event sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<StructuredLogEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: StructuredLogEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[StructuredLogEvent] {
        &self.events
    }

    pub fn failures(&self) -> impl Iterator<Item = &StructuredLogEvent> {
        self.events.iter().filter(|e| e.is_failure())
    }

    pub fn into_events(self) -> Vec<StructuredLogEvent> {
        self.events
    }

    /// One JSON object per line.
    pub fn to_json_lines(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for event in &self.events {
            out.push_str(&serde_json::to_string(event)?);
            out.push('\n');
        }
        Ok(out)
    }
}
