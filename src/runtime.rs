//! Agent runtime wiring.
//!
//! Builds the long-lived pieces once (catalogue, executor, store) and a fresh
//! engine per query. The scripted generator stands in for a model-backed
//! generation collaborator, so each query gets its own copy with a full
//! script.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

use cotools_core::{
    AgentConfig, CatalogueStore, ProjectionEncoder, QueryOutcome, ReasoningEngine,
    ScriptedGenerator, ToolCatalogue,
};
use cotools_databases::SqliteStore;
use cotools_tools::ToolExecutor;

use crate::console::ConsoleObserver;

/// Long-lived agent state shared across queries
pub struct AgentRuntime {
    config: AgentConfig,
    catalogue: Arc<ToolCatalogue>,
    executor: Arc<ToolExecutor>,
    store: Option<Arc<SqliteStore>>,
}

impl AgentRuntime {
    /// Initialize the runtime: open the store (degrading to memory-only on
    /// failure), bootstrap the catalogue and register the built-in tools.
    pub async fn initialize(config: AgentConfig) -> Result<Self> {
        config.validate()?;

        let store = match SqliteStore::open(&config.database_path) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!("Database warning: {e:#}. Continuing with in-memory catalogue.");
                None
            }
        };

        let description_encoder = Arc::new(ProjectionEncoder::for_descriptions(&config)?);
        let catalogue = Arc::new(ToolCatalogue::new(description_encoder));
        catalogue
            .bootstrap(store.as_deref().map(|s| s as &dyn CatalogueStore))
            .await?;

        let executor = Arc::new(ToolExecutor::with_builtin_tools(Duration::from_secs(
            config.tool_timeout_secs,
        )));

        Ok(Self {
            config,
            catalogue,
            executor,
            store,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &Arc<ToolCatalogue> {
        &self.catalogue
    }

    /// Build a fresh engine around the shared catalogue and executor
    pub fn engine(&self) -> Result<ReasoningEngine> {
        let generator = Arc::new(ScriptedGenerator::demo());
        let mut engine = ReasoningEngine::new(
            self.config.clone(),
            generator,
            self.catalogue.clone(),
            self.executor.clone(),
        )?
        .with_observer(Arc::new(ConsoleObserver::new()));
        if let Some(store) = &self.store {
            engine = engine.with_interaction_log(store.clone());
        }
        Ok(engine)
    }

    /// Process one query to completion
    pub async fn process(&self, query: &str) -> Result<QueryOutcome> {
        Ok(self.engine()?.process_query(query).await?)
    }
}
