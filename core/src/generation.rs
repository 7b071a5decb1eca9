//! Generation collaborator contract.
//!
//! The underlying text-generation model is external to the core: given a
//! context it produces the next increment of text, and an opaque state
//! snapshot consumed only by the tool-need gate. Failures are recoverable:
//! the loop folds a notice and continues.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::gate::StateSnapshot;

/// Contract between the reasoning loop and the text-generation collaborator
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce the next increment of reasoning text for the context
    async fn next_increment(&self, context: &str) -> Result<String>;

    /// Produce a state snapshot for the context, consumed only by the gate
    async fn state_snapshot(&self, context: &str) -> Result<StateSnapshot>;
}

/// Scripted generator producing a fixed sequence of reasoning fragments.
///
/// Stands in for a model-backed generator in the demo and in tests: each
/// `next_increment` call pops the next fragment; once the script is
/// exhausted it keeps emitting a filler token, leaving termination to the
/// loop's step bound. Snapshots expose the context as lexical text so the
/// gate can score it.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<String>>,
    filler: String,
}

impl ScriptedGenerator {
    pub fn new(fragments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            script: Mutex::new(fragments.into_iter().map(Into::into).collect()),
            filler: ".".to_string(),
        }
    }

    /// The demonstration script mirroring a worked weather-and-capital query
    pub fn demo() -> Self {
        Self::new([
            "First, I need to understand what information we're looking for. ",
            "Based on the query, we need to find: (1) the weather in a destination city \
             yesterday, and (2) the capital of that country.",
            "Let's determine what the destination city is from the context.",
            "Now that we have the weather information, let's find the capital of the country.",
            "To summarize the information we've found:",
            "Therefore, the answer is: The weather in Paris yesterday was cloudy and 65°F, \
             and Paris is the capital of France.",
        ])
    }

    /// Remaining fragments not yet emitted
    pub fn remaining(&self) -> usize {
        self.script.lock().expect("script lock poisoned").len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn next_increment(&self, _context: &str) -> Result<String> {
        let mut script = self.script.lock().expect("script lock poisoned");
        Ok(script.pop_front().unwrap_or_else(|| self.filler.clone()))
    }

    async fn state_snapshot(&self, context: &str) -> Result<StateSnapshot> {
        Ok(StateSnapshot::Text(context.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fragments_are_emitted_in_order_then_filler() {
        let generator = ScriptedGenerator::new(["one", "two"]);
        assert_eq!(generator.next_increment("").await.unwrap(), "one");
        assert_eq!(generator.next_increment("").await.unwrap(), "two");
        assert_eq!(generator.next_increment("").await.unwrap(), ".");
        assert_eq!(generator.remaining(), 0);
    }

    #[tokio::test]
    async fn snapshot_carries_the_context_text() {
        let generator = ScriptedGenerator::new(Vec::<String>::new());
        let snapshot = generator.state_snapshot("some context").await.unwrap();
        assert_eq!(snapshot, StateSnapshot::Text("some context".to_string()));
    }
}
