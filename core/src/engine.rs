//! The reasoning loop state machine.
//!
//! Per query the engine alternates between generation increments and tool
//! round-trips: score the current state through the gate, branch into
//! generating or retrieving, fold the outcome back into the running context,
//! then check termination. Steps are strictly sequential (each step's
//! snapshot reflects all prior folds) and the loop is bounded by a hard
//! maximum step count so it terminates even when the model never emits a
//! completion marker.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalogue::ToolCatalogue;
use crate::config::AgentConfig;
use crate::encoder::{Encoder, ProjectionEncoder};
use crate::errors::EngineError;
use crate::events::{AgentEvent, EngineObserver};
use crate::gate::ToolGate;
use crate::generation::TextGenerator;
use crate::invoker::ToolInvoker;
use crate::state::{
    InvocationOutcome, ParamValue, ReasoningState, ToolInvocationRecord, ToolParams,
};
use crate::store::InteractionLog;

/// Phases of the loop state machine.
///
/// `Init` is entered once per query; `Terminated` is the sole terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Init,
    Generating,
    Retrieving,
    Folding,
    Terminated,
}

/// Result of one processed query
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub query_id: Uuid,
    /// Final answer, stripped of leading/trailing whitespace
    pub answer: String,
    /// Reasoning steps executed
    pub steps: u32,
    /// Tool round-trips in invocation order
    pub tools_used: Vec<ToolInvocationRecord>,
}

/// Orchestrates the generation/gating/retrieval/invocation cycle for queries.
///
/// One engine serves many queries; each `process_query` call owns its own
/// [`ReasoningState`] and runs its steps sequentially. The shared catalogue
/// supports concurrent similarity reads across queries.
pub struct ReasoningEngine {
    config: AgentConfig,
    generator: Arc<dyn TextGenerator>,
    gate: ToolGate,
    catalogue: Arc<ToolCatalogue>,
    query_encoder: Arc<dyn Encoder>,
    invoker: Arc<dyn ToolInvoker>,
    interaction_log: Option<Arc<dyn InteractionLog>>,
    observers: Vec<Arc<dyn EngineObserver>>,
}

impl ReasoningEngine {
    /// Build an engine, validating the configuration.
    ///
    /// Misconfiguration (dimension, threshold, step bounds) fails here, before
    /// any query is served.
    pub fn new(
        config: AgentConfig,
        generator: Arc<dyn TextGenerator>,
        catalogue: Arc<ToolCatalogue>,
        invoker: Arc<dyn ToolInvoker>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let gate = ToolGate::new(config.gate_threshold, config.gate_seed)?
            .with_perturbation(config.gate_perturbation);
        let query_encoder: Arc<dyn Encoder> = Arc::new(ProjectionEncoder::for_queries(&config)?);
        Ok(Self {
            config,
            generator,
            gate,
            catalogue,
            query_encoder,
            invoker,
            interaction_log: None,
            observers: Vec::new(),
        })
    }

    /// Attach the interaction log sink
    pub fn with_interaction_log(mut self, log: Arc<dyn InteractionLog>) -> Self {
        self.interaction_log = Some(log);
        self
    }

    /// Register an observer for the event stream
    pub fn with_observer(mut self, observer: Arc<dyn EngineObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &Arc<ToolCatalogue> {
        &self.catalogue
    }

    /// Process a query to completion
    pub async fn process_query(&self, query: &str) -> Result<QueryOutcome, EngineError> {
        self.process_query_with_cancel(query, CancellationToken::new())
            .await
    }

    /// Process a query with cooperative cancellation.
    ///
    /// Cancellation is checked at the top of each loop iteration, never
    /// mid-step; an in-flight tool call runs to completion (or its own
    /// timeout) before the loop observes the token. A cancelled query still
    /// finalizes: whatever the answer buffer holds is trimmed, logged and
    /// returned.
    pub async fn process_query_with_cancel(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<QueryOutcome, EngineError> {
        let query_id = Uuid::new_v4();
        info!(%query_id, "Processing query");
        debug!(%query_id, phase = ?LoopPhase::Init, "Preparing initial input");
        self.emit(&AgentEvent::QueryReceived {
            query_id,
            query: query.to_string(),
        });

        let mut state = ReasoningState::new(query);
        state.seed_context(&initial_prompt(query));
        self.emit(&AgentEvent::StepThinking {
            query_id,
            step: 0,
            message: "Initial prompt prepared with chain-of-thought structure.".to_string(),
        });

        let mut step = 0u32;
        while step < self.config.max_steps {
            if cancel.is_cancelled() {
                info!(%query_id, step, "Query cancelled between steps");
                break;
            }
            step += 1;
            self.emit(&AgentEvent::StepThinking {
                query_id,
                step,
                message: "Checking if a tool is needed at this step...".to_string(),
            });

            let context = state.context();
            match self.generator.state_snapshot(&context).await {
                Ok(snapshot) => {
                    let gate_score = self.gate.score(&snapshot);
                    self.emit(&AgentEvent::GateScored {
                        query_id,
                        step,
                        score: gate_score.value,
                        tool_needed: gate_score.tool_needed,
                    });

                    if gate_score.tool_needed {
                        debug!(%query_id, step, phase = ?LoopPhase::Retrieving, "Decision: tool required");
                        self.tool_round_trip(query_id, step, &mut state).await?;
                    } else {
                        debug!(%query_id, step, phase = ?LoopPhase::Generating, "Decision: no tool needed");
                        match self.generator.next_increment(&context).await {
                            Ok(fragment) => {
                                for token in fragment.split_whitespace() {
                                    self.emit(&AgentEvent::TokenEmitted {
                                        query_id,
                                        step,
                                        token: token.to_string(),
                                    });
                                }
                                state.fold(&fragment);
                            }
                            Err(e) => {
                                warn!(%query_id, step, "Generation failed: {e:#}");
                                state.fold("\n[Generation was unavailable at this step.]\n");
                            }
                        }
                    }
                }
                Err(e) => {
                    // A snapshot failure is a generation-collaborator failure:
                    // recoverable, folded, survived.
                    warn!(%query_id, step, "State snapshot failed: {e:#}");
                    state.fold("\n[Reasoning state was unavailable at this step.]\n");
                }
            }

            debug!(%query_id, step, phase = ?LoopPhase::Folding, "Step folded");
            if state.contains_marker(&self.config.completion_marker)
                && step >= self.config.min_steps
            {
                debug!(%query_id, step, "Completion marker reached after minimum steps");
                break;
            }
        }

        debug!(%query_id, step, phase = ?LoopPhase::Terminated, "Loop terminated");
        let answer = state.final_answer();
        self.emit(&AgentEvent::FinalResult {
            query_id,
            answer: answer.clone(),
        });

        if let Some(log) = &self.interaction_log {
            if let Err(e) = log.append(query, &answer, state.tool_usage()).await {
                warn!(%query_id, "Failed to append interaction log: {e}");
            }
        }

        info!(
            %query_id,
            steps = step,
            tools_used = state.tool_usage().len(),
            "Query finished"
        );
        Ok(QueryOutcome {
            query_id,
            answer,
            steps: step,
            tools_used: state.tool_usage().to_vec(),
        })
    }

    /// One RETRIEVING branch: encode the retrieval intent, pick the most
    /// similar tool, invoke it and fold the outcome.
    ///
    /// The best match is invoked regardless of its similarity score. Tool
    /// failures fold a notice and continue; only a catalogue dimensionality
    /// mismatch aborts the query.
    async fn tool_round_trip(
        &self,
        query_id: Uuid,
        step: u32,
        state: &mut ReasoningState,
    ) -> Result<(), EngineError> {
        let retrieval_prompt = format!(
            "Based on the context: '{}', what tool is needed?",
            state.context()
        );
        let query_vector = self.query_encoder.encode(&retrieval_prompt);
        let Some((entry, similarity)) = self.catalogue.find_similar(&query_vector).await? else {
            warn!(%query_id, step, "Tool catalogue is empty; continuing without a tool");
            state.fold("\n[No tool was available for this step.]\n");
            return Ok(());
        };

        self.emit(&AgentEvent::ToolSelected {
            query_id,
            step,
            tool_name: entry.name.clone(),
            description: entry.description.clone(),
            similarity,
        });

        let params = self.step_parameters(state);
        self.emit(&AgentEvent::ToolCalled {
            query_id,
            step,
            tool_name: entry.name.clone(),
            parameters: params.clone(),
        });

        let outcome = match self.invoker.invoke(&entry.name, &params).await {
            Ok(result) => {
                state.fold(&format!("\nUsing a tool, I found: {result}\n"));
                InvocationOutcome::Success(result)
            }
            Err(e) => {
                warn!(%query_id, step, tool = %entry.name, "Tool invocation failed: {e}");
                state.fold(&format!(
                    "\n[Tool {} failed: {e}. Continuing without its result.]\n",
                    entry.name
                ));
                InvocationOutcome::Failure(e.to_string())
            }
        };

        self.emit(&AgentEvent::ToolResult {
            query_id,
            step,
            tool_name: entry.name.clone(),
            outcome: outcome.clone(),
        });
        state.record_tool(ToolInvocationRecord {
            tool_name: entry.name,
            parameters: params,
            outcome,
        });
        Ok(())
    }

    /// Step-appropriate parameters: the original query plus the most recent
    /// context increment. Capabilities extract what they need.
    fn step_parameters(&self, state: &ReasoningState) -> ToolParams {
        let mut params = ToolParams::new();
        params.insert("query".to_string(), ParamValue::from(state.query()));
        let context_tail = state.last_increment().trim();
        if !context_tail.is_empty() {
            params.insert("context".to_string(), ParamValue::from(context_tail));
        }
        params
    }

    fn emit(&self, event: &AgentEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

impl std::fmt::Debug for ReasoningEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningEngine")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

/// Format the query with the chain-of-thought preamble
fn initial_prompt(query: &str) -> String {
    format!(
        "Let's think step by step to answer the following question:\n{query}\n\n\
         I'll break this down to determine what we need to know:\n"
    )
}
