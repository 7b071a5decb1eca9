//! CoTools Core
//!
//! The chain-of-tools reasoning core: at each step of the loop the engine
//! decides whether continuing requires an external capability, retrieves the
//! best-matching tool by embedding similarity when one is warranted, invokes
//! it through the boundary contract and folds the result back into the
//! running context. The generation model, the concrete tool capabilities and
//! the persistence layer are external collaborators behind the contracts in
//! this crate.

pub mod catalogue;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod errors;
pub mod events;
pub mod gate;
pub mod generation;
pub mod invoker;
pub mod state;
pub mod store;

pub use catalogue::{ToolCatalogue, ToolEntry, DEFAULT_TOOLS};
pub use config::AgentConfig;
pub use encoder::{Embedding, Encoder, ProjectionEncoder};
pub use engine::{LoopPhase, QueryOutcome, ReasoningEngine};
pub use errors::{
    CatalogueError, ConfigError, EmbeddingError, EngineError, InvokeError, StoreError,
};
pub use events::{AgentEvent, EngineObserver, RecordingObserver};
pub use gate::{GateScore, StateSnapshot, ToolGate};
pub use generation::{ScriptedGenerator, TextGenerator};
pub use invoker::ToolInvoker;
pub use state::{
    InvocationOutcome, ParamValue, ReasoningState, ToolInvocationRecord, ToolParams,
};
pub use store::{CatalogueStore, InteractionLog, StoredTool};
