//! Typed errors for the reasoning core.
//!
//! The taxonomy follows three kinds: configuration-fatal errors raised at
//! construction ([`ConfigError`]), fatal runtime misconfiguration surfaced as
//! [`CatalogueError::DimensionMismatch`], and recoverable/not-found failures
//! ([`InvokeError`], [`StoreError`]) that the reasoning loop converts into
//! transcript content instead of letting them escape to the caller.

use thiserror::Error;

/// Configuration errors, raised at construction and never at query time
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Embedding dimension must be positive, got {0}")]
    InvalidDimension(usize),

    #[error("Gate threshold must be within [0.0, 1.0], got {0}")]
    InvalidThreshold(f32),

    #[error("Invalid step bounds: min_steps={min} must not exceed max_steps={max}, both positive")]
    InvalidStepBounds { min: u32, max: u32 },

    #[error("Completion marker must not be empty")]
    EmptyCompletionMarker,
}

/// Errors from embedding operations
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors from the tool catalogue
#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the tool invocation boundary
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("Unknown tool: '{0}'")]
    UnknownTool(String),

    #[error("Tool execution failed: {tool} - {message}")]
    Execution { tool: String, message: String },

    #[error("Tool '{tool}' timed out after {timeout_secs}s")]
    Timeout { tool: String, timeout_secs: u64 },
}

/// Errors from the persistence collaborators (catalogue store, interaction log)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store query failed: {0}")]
    Query(String),
}

/// Fatal errors from the reasoning engine.
///
/// Recoverable failures (generation errors, tool execution errors, log append
/// errors) never surface here; the loop folds them into the transcript and
/// continues. Only misconfiguration aborts a query.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}
