//! Reasoning state threaded through the loop.
//!
//! The state is created per query, mutated once per loop iteration and read
//! out at termination. The transcript is append-only: no increment is ever
//! removed or reordered.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A parameter value passed to a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Num(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => write!(f, "{s}"),
            ParamValue::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Num(value)
    }
}

/// Parameter mapping for a tool call, ordered for deterministic rendering
pub type ToolParams = BTreeMap<String, ParamValue>;

/// Outcome of a tool invocation: result text or a failure marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum InvocationOutcome {
    Success(String),
    Failure(String),
}

impl InvocationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success(_))
    }
}

/// Record of one tool round-trip, appended to the state and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRecord {
    /// Display name the tool was invoked by
    pub tool_name: String,
    /// Parameters handed to the invocation boundary
    pub parameters: ToolParams,
    /// Result text or failure marker
    pub outcome: InvocationOutcome,
}

/// Mutable context for one query's reasoning loop
#[derive(Debug, Clone)]
pub struct ReasoningState {
    query: String,
    transcript: Vec<String>,
    answer: String,
    tool_usage: Vec<ToolInvocationRecord>,
}

impl ReasoningState {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            transcript: Vec::new(),
            answer: String::new(),
            tool_usage: Vec::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Append context that is not part of the answer (the reasoning preamble)
    pub fn seed_context(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }

    /// Fold an increment into both the transcript and the answer buffer
    pub fn fold(&mut self, text: &str) {
        self.transcript.push(text.to_string());
        self.answer.push_str(text);
    }

    /// The full running context, increments concatenated in order
    pub fn context(&self) -> String {
        self.transcript.concat()
    }

    /// The most recent increment, or the empty string before any fold
    pub fn last_increment(&self) -> &str {
        self.transcript.last().map(String::as_str).unwrap_or("")
    }

    pub fn increments(&self) -> &[String] {
        &self.transcript
    }

    pub fn contains_marker(&self, marker: &str) -> bool {
        self.transcript.iter().any(|inc| inc.contains(marker))
    }

    pub fn record_tool(&mut self, record: ToolInvocationRecord) {
        self.tool_usage.push(record);
    }

    pub fn tool_usage(&self) -> &[ToolInvocationRecord] {
        &self.tool_usage
    }

    /// The accumulated answer, stripped of leading/trailing whitespace
    pub fn final_answer(&self) -> String {
        self.answer.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_grows_monotonically() {
        let mut state = ReasoningState::new("q");
        state.seed_context("preamble ");
        state.fold("first ");
        state.fold("second");
        assert_eq!(state.increments().len(), 3);
        assert_eq!(state.context(), "preamble first second");
    }

    #[test]
    fn preamble_is_excluded_from_the_answer() {
        let mut state = ReasoningState::new("q");
        state.seed_context("Let's think step by step.\n");
        state.fold("  the answer  ");
        assert_eq!(state.final_answer(), "the answer");
    }

    #[test]
    fn marker_detection_spans_any_increment() {
        let mut state = ReasoningState::new("q");
        state.fold("working on it");
        assert!(!state.contains_marker("Therefore, the answer is:"));
        state.fold("Therefore, the answer is: done");
        assert!(state.contains_marker("Therefore, the answer is:"));
    }

    #[test]
    fn tool_records_accumulate_in_order() {
        let mut state = ReasoningState::new("q");
        for name in ["WeatherAPI", "CapitalAPI"] {
            state.record_tool(ToolInvocationRecord {
                tool_name: name.to_string(),
                parameters: ToolParams::new(),
                outcome: InvocationOutcome::Success("ok".to_string()),
            });
        }
        let names: Vec<_> = state.tool_usage().iter().map(|r| r.tool_name.as_str()).collect();
        assert_eq!(names, ["WeatherAPI", "CapitalAPI"]);
    }

    #[test]
    fn param_values_render_for_display() {
        assert_eq!(ParamValue::from("Paris").to_string(), "Paris");
        assert_eq!(ParamValue::from(84.0).to_string(), "84");
    }
}
