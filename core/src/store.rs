//! Persistence contracts for the catalogue and the interaction log.
//!
//! Storage is an external collaborator: the catalogue hydrates from and
//! flushes to it as two explicit operations, and the interaction log is
//! append-only. The core never issues per-mutation writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::state::ToolInvocationRecord;

/// A tool row as persisted by a catalogue store.
///
/// An absent embedding means "not yet computed"; the catalogue computes and
/// caches it on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTool {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

/// Catalogue persistence contract
#[async_trait]
pub trait CatalogueStore: Send + Sync {
    /// Load every persisted tool row
    async fn load_all(&self) -> Result<Vec<StoredTool>, StoreError>;

    /// Persist one tool, returning the store-assigned id
    async fn insert(
        &self,
        name: &str,
        description: &str,
        embedding: Option<&[f32]>,
    ) -> Result<i64, StoreError>;
}

/// Append-only interaction log contract
#[async_trait]
pub trait InteractionLog: Send + Sync {
    /// Record a completed interaction, returning the log entry id
    async fn append(
        &self,
        query: &str,
        answer: &str,
        tools_used: &[ToolInvocationRecord],
    ) -> Result<i64, StoreError>;
}
