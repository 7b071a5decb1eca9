//! Engine events and the observer contract.
//!
//! The loop emits an ordered event stream to registered observers. Observers
//! are pure spectators: they have no influence on control flow, and the loop
//! fires each event exactly once, in emission order, without awaiting any
//! observer-side work.

use serde::Serialize;
use uuid::Uuid;

use crate::state::{InvocationOutcome, ToolParams};

/// One event in a query's reasoning trace
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A query entered the loop
    QueryReceived { query_id: Uuid, query: String },
    /// Progress narration for the current step
    StepThinking {
        query_id: Uuid,
        step: u32,
        message: String,
    },
    /// The gate scored the current state
    GateScored {
        query_id: Uuid,
        step: u32,
        score: f32,
        tool_needed: bool,
    },
    /// Retrieval selected a tool from the catalogue
    ToolSelected {
        query_id: Uuid,
        step: u32,
        tool_name: String,
        description: String,
        similarity: f32,
    },
    /// The invocation boundary was handed a call
    ToolCalled {
        query_id: Uuid,
        step: u32,
        tool_name: String,
        parameters: ToolParams,
    },
    /// The call returned (result text or failure)
    ToolResult {
        query_id: Uuid,
        step: u32,
        tool_name: String,
        outcome: InvocationOutcome,
    },
    /// A generated token was folded into the answer
    TokenEmitted {
        query_id: Uuid,
        step: u32,
        token: String,
    },
    /// The loop terminated with its final answer
    FinalResult { query_id: Uuid, answer: String },
}

/// Observer of the engine's event stream.
///
/// Handling must be bounded and fast; the loop proceeds as soon as the call
/// returns.
pub trait EngineObserver: Send + Sync {
    fn on_event(&self, event: &AgentEvent);
}

/// Observer that buffers every event, for tests and trace capture
#[derive(Default)]
pub struct RecordingObserver {
    events: std::sync::Mutex<Vec<AgentEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().expect("event buffer lock poisoned").clone()
    }
}

impl EngineObserver for RecordingObserver {
    fn on_event(&self, event: &AgentEvent) {
        self.events
            .lock()
            .expect("event buffer lock poisoned")
            .push(event.clone());
    }
}
