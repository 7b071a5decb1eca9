//! Tool-need gate.
//!
//! At each reasoning step the gate scores how strongly the current state
//! suggests a tool invocation. Scoring is a weighted lexical-signal model: a
//! fixed table maps trigger phrases to base confidences, and the score is the
//! maximum confidence among phrases found in the lower-cased state text.
//! Taking the maximum instead of summing avoids double-counting overlapping
//! cues and keeps the score monotonic: additional matching phrases never
//! decrease it.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::trace;

use crate::errors::ConfigError;

/// Bound on the perturbation added to the lexical score
const DEFAULT_PERTURBATION: f32 = 0.1;

/// Trigger phrases with their base confidences.
///
/// Matched as substrings of the lower-cased snapshot text.
const TOOL_TRIGGERS: &[(&str, f32)] = &[
    // Weather
    ("weather", 0.8),
    ("temperature", 0.75),
    ("forecast", 0.85),
    ("climate", 0.7),
    // Location
    ("location", 0.75),
    ("capital", 0.9),
    ("country", 0.7),
    ("city", 0.65),
    // Calculation
    ("calculate", 0.95),
    ("compute", 0.9),
    ("solve", 0.8),
    ("equation", 0.85),
    ("formula", 0.85),
    // Translation
    ("translate", 0.95),
    ("language", 0.75),
    ("french", 0.7),
    ("spanish", 0.7),
    ("german", 0.7),
    // Web search
    ("search", 0.9),
    ("find information", 0.85),
    ("look up", 0.8),
    ("find out", 0.75),
    // News
    ("news", 0.8),
    ("recent", 0.7),
    ("latest", 0.75),
    ("current events", 0.9),
    // Web content
    ("website", 0.85),
    ("webpage", 0.85),
    ("url", 0.9),
    ("link", 0.8),
    // Project files
    ("project file", 0.95),
    ("project schedule", 0.95),
    ("mpp", 0.95),
    ("xer", 0.95),
    ("critical path", 0.9),
    ("tasks", 0.8),
    ("resources", 0.8),
    ("project management", 0.85),
];

/// Snapshot of the reasoning state consumed by the gate.
///
/// `Text` carries the transcript produced so far; `Opaque` is a handle to a
/// state the gate cannot inspect lexically (e.g. a raw model hidden state).
#[derive(Debug, Clone, PartialEq)]
pub enum StateSnapshot {
    Text(String),
    Opaque(u64),
}

/// A gate score: the confidence in [0, 1] and the threshold decision
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GateScore {
    /// Confidence that a tool must be invoked next
    pub value: f32,
    /// Whether the confidence exceeds the configured threshold
    pub tool_needed: bool,
}

/// Decides, per reasoning step, whether a tool call is warranted
pub struct ToolGate {
    threshold: f32,
    perturbation: f32,
    rng: Mutex<StdRng>,
}

impl ToolGate {
    /// Create a gate with the given threshold and perturbation seed.
    ///
    /// Thresholds outside [0, 1] are rejected at construction.
    pub fn new(threshold: f32, seed: u64) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&threshold) || !threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            perturbation: DEFAULT_PERTURBATION,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        })
    }

    /// Override the perturbation bound (0.0 disables perturbation entirely)
    pub fn with_perturbation(mut self, bound: f32) -> Self {
        self.perturbation = bound.max(0.0);
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// The deterministic lexical component of the score.
    ///
    /// Maximum base confidence among matching trigger phrases; zero when none
    /// match. Monotonic in the set of matched phrases.
    pub fn lexical_score(&self, text: &str) -> f32 {
        let content = text.to_lowercase();
        TOOL_TRIGGERS
            .iter()
            .filter(|(phrase, _)| content.contains(phrase))
            .map(|&(_, confidence)| confidence)
            .fold(0.0, f32::max)
    }

    /// Score the snapshot, clamped to [0, 1].
    ///
    /// Text snapshots get the lexical score plus a bounded perturbation that
    /// emulates model uncertainty. An opaque snapshot carries no lexical
    /// signal, so the gate falls back to a uniform sample from its seeded
    /// source; the loop must always receive a valid score.
    pub fn score(&self, snapshot: &StateSnapshot) -> GateScore {
        let mut rng = self.rng.lock().expect("gate rng lock poisoned");
        let value = match snapshot {
            StateSnapshot::Text(text) => {
                let base = self.lexical_score(text);
                let noise = if self.perturbation > 0.0 {
                    rng.gen_range(-self.perturbation..=self.perturbation)
                } else {
                    0.0
                };
                (base + noise).clamp(0.0, 1.0)
            }
            StateSnapshot::Opaque(handle) => {
                trace!(handle, "Scoring opaque snapshot via uniform fallback");
                rng.gen_range(0.0f32..=1.0f32)
            }
        };
        GateScore {
            value,
            tool_needed: value > self.threshold,
        }
    }

    /// Threshold decision for the snapshot
    pub fn decide(&self, snapshot: &StateSnapshot) -> bool {
        self.score(snapshot).tool_needed
    }
}

impl std::fmt::Debug for ToolGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolGate")
            .field("threshold", &self.threshold)
            .field("perturbation", &self.perturbation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ToolGate {
        ToolGate::new(0.5, 42).unwrap().with_perturbation(0.0)
    }

    #[test]
    fn invalid_threshold_is_rejected_at_construction() {
        assert!(matches!(
            ToolGate::new(-0.1, 0),
            Err(ConfigError::InvalidThreshold(_))
        ));
        assert!(matches!(
            ToolGate::new(1.1, 0),
            Err(ConfigError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn calculate_trigger_crosses_default_threshold() {
        let gate = gate();
        let snapshot = StateSnapshot::Text("calculate 12*7".to_string());
        let score = gate.score(&snapshot);
        assert!((score.value - 0.95).abs() < f32::EPSILON);
        assert!(score.tool_needed);
        assert!(gate.decide(&snapshot));
    }

    #[test]
    fn unmatched_text_scores_zero() {
        let gate = gate();
        let score = gate.score(&StateSnapshot::Text("hello there".to_string()));
        assert_eq!(score.value, 0.0);
        assert!(!score.tool_needed);
    }

    #[test]
    fn adding_a_matching_phrase_never_decreases_the_score() {
        let gate = gate();
        let base = gate.lexical_score("what is the city of lights");
        let extended = gate.lexical_score("what is the city of lights, please calculate");
        assert!(extended >= base);
        assert!((extended - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn score_is_clamped_with_perturbation_enabled() {
        let gate = ToolGate::new(0.5, 7).unwrap();
        for _ in 0..100 {
            let score = gate.score(&StateSnapshot::Text("calculate translate mpp".into()));
            assert!((0.0..=1.0).contains(&score.value));
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        let gate = gate();
        assert!((gate.lexical_score("CALCULATE THIS") - 0.95).abs() < f32::EPSILON);
    }

    #[test]
    fn opaque_snapshot_yields_valid_deterministic_score() {
        let a = ToolGate::new(0.5, 11).unwrap();
        let b = ToolGate::new(0.5, 11).unwrap();
        let score_a = a.score(&StateSnapshot::Opaque(1));
        let score_b = b.score(&StateSnapshot::Opaque(1));
        assert!((0.0..=1.0).contains(&score_a.value));
        assert_eq!(score_a.value, score_b.value);
    }
}
