//! Tool catalogue with embedding-based retrieval.
//!
//! The catalogue owns the registered tool entries and answers similarity
//! queries over their description embeddings. Reads (similarity search,
//! lookups) may run concurrently across queries; writes (registration,
//! hydration) are serialized behind the same lock. Registrations are rare
//! relative to lookups, so a single-writer/multiple-reader discipline
//! suffices.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::encoder::{Embedding, Encoder};
use crate::errors::CatalogueError;
use crate::store::CatalogueStore;

/// Default tool set seeded into an empty catalogue.
///
/// Guarantees similarity search never degenerates to "no tools" in normal
/// operation.
pub const DEFAULT_TOOLS: &[(&str, &str)] = &[
    ("WeatherAPI", "Get current weather information for a location."),
    ("CapitalAPI", "Find the capital city of a country."),
    ("SearchAPI", "Search for information on the web."),
    ("CalculatorAPI", "Perform mathematical calculations."),
    ("TranslateAPI", "Translate text from one language to another."),
    ("WebSearch", "Search the web for information."),
    ("NewsSearch", "Search for news articles with date filtering."),
    ("WebContentFetcher", "Fetch content from a URL."),
    (
        "ProjectFileProcessor",
        "Process and analyze project management files.",
    ),
];

/// A registered tool: stable id, unique display name, description and the
/// description's embedding.
///
/// The catalogue owns its entries; callers always receive clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEntry {
    /// Identifier, unique and stable for the process lifetime
    pub id: i64,
    /// Display name, the external contract tools are invoked by
    pub name: String,
    /// Free-text description the embedding is derived from
    pub description: String,
    /// Unit-normalized description embedding
    pub embedding: Embedding,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct CatalogueInner {
    /// Ordered by id so similarity ties resolve to the lowest identifier
    entries: BTreeMap<i64, ToolEntry>,
    by_name: HashMap<String, i64>,
    /// Ids already present in (or flushed to) the backing store
    persisted: BTreeSet<i64>,
    next_id: i64,
}

/// In-memory registry of tools supporting similarity-based retrieval
pub struct ToolCatalogue {
    encoder: Arc<dyn Encoder>,
    inner: RwLock<CatalogueInner>,
}

impl ToolCatalogue {
    /// Create an empty catalogue using the given description encoder
    pub fn new(encoder: Arc<dyn Encoder>) -> Self {
        Self {
            encoder,
            inner: RwLock::new(CatalogueInner {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Register a tool, computing its description embedding.
    ///
    /// Names are the external contract tools are invoked by, so they must be
    /// unique; descriptions need not be. A duplicate name leaves the
    /// catalogue unchanged.
    pub async fn register(&self, name: &str, description: &str) -> Result<ToolEntry, CatalogueError> {
        let embedding = self.encoder.encode(description);
        let mut inner = self.inner.write().await;
        if inner.by_name.contains_key(name) {
            return Err(CatalogueError::DuplicateTool(name.to_string()));
        }
        let id = inner.next_id;
        inner.next_id += 1;
        let entry = ToolEntry {
            id,
            name: name.to_string(),
            description: description.to_string(),
            embedding,
            created_at: Utc::now(),
        };
        inner.by_name.insert(entry.name.clone(), id);
        inner.entries.insert(id, entry.clone());
        debug!("Registered tool '{}' with id {}", entry.name, id);
        Ok(entry)
    }

    /// Look up an entry by id
    pub async fn get(&self, id: i64) -> Option<ToolEntry> {
        self.inner.read().await.entries.get(&id).cloned()
    }

    /// Look up an entry by display name
    pub async fn get_by_name(&self, name: &str) -> Option<ToolEntry> {
        let inner = self.inner.read().await;
        inner
            .by_name
            .get(name)
            .and_then(|id| inner.entries.get(id))
            .cloned()
    }

    /// Find the entry most similar to the query vector.
    ///
    /// Similarity is the dot product of unit vectors. The maximum score wins;
    /// exact ties resolve to the lowest id for determinism. An empty
    /// catalogue yields `Ok(None)`. A dimensionality mismatch is a
    /// deployment error and fails fast.
    pub async fn find_similar(
        &self,
        query: &Embedding,
    ) -> Result<Option<(ToolEntry, f32)>, CatalogueError> {
        let inner = self.inner.read().await;
        let mut best: Option<(&ToolEntry, f32)> = None;
        for entry in inner.entries.values() {
            let score = query.dot(&entry.embedding)?;
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((entry, score)),
            }
        }
        Ok(best.map(|(entry, score)| (entry.clone(), score)))
    }

    /// Seed the default tool set into an empty catalogue.
    ///
    /// Returns the number of tools added; a non-empty catalogue is left
    /// untouched.
    pub async fn seed_defaults(&self) -> Result<usize, CatalogueError> {
        if !self.is_empty().await {
            return Ok(0);
        }
        for (name, description) in DEFAULT_TOOLS {
            self.register(name, description).await?;
        }
        info!("Seeded catalogue with {} default tools", DEFAULT_TOOLS.len());
        Ok(DEFAULT_TOOLS.len())
    }

    /// Hydrate the catalogue from the store, returning the number of rows
    /// loaded.
    ///
    /// Rows without a stored embedding get one computed from their
    /// description. A stored embedding whose dimensionality disagrees with
    /// the encoder is a configuration error, not a degraded-mode condition.
    pub async fn load_from_store(
        &self,
        store: &dyn CatalogueStore,
    ) -> Result<usize, CatalogueError> {
        let rows = store.load_all().await?;
        let mut inner = self.inner.write().await;
        let mut loaded = 0;
        for row in rows {
            if inner.by_name.contains_key(&row.name) {
                warn!("Skipping duplicate stored tool '{}'", row.name);
                continue;
            }
            let embedding = match row.embedding {
                Some(values) => {
                    let embedding = Embedding::from_normalized(values);
                    if embedding.dim() != self.encoder.dim() {
                        return Err(crate::errors::EmbeddingError::DimensionMismatch {
                            expected: self.encoder.dim(),
                            actual: embedding.dim(),
                        }
                        .into());
                    }
                    embedding
                }
                None => self.encoder.encode(&row.description),
            };
            let entry = ToolEntry {
                id: row.id,
                name: row.name,
                description: row.description,
                embedding,
                created_at: row.created_at,
            };
            inner.by_name.insert(entry.name.clone(), entry.id);
            inner.persisted.insert(entry.id);
            inner.next_id = inner.next_id.max(entry.id + 1);
            inner.entries.insert(entry.id, entry);
            loaded += 1;
        }
        info!("Hydrated catalogue with {loaded} tools from store");
        Ok(loaded)
    }

    /// Flush entries not yet persisted to the store.
    ///
    /// Store-assigned ids may differ from in-memory ids on a non-empty
    /// store; in-memory ids stay authoritative for the process lifetime.
    pub async fn persist_to_store(
        &self,
        store: &dyn CatalogueStore,
    ) -> Result<usize, CatalogueError> {
        let pending: Vec<ToolEntry> = {
            let inner = self.inner.read().await;
            inner
                .entries
                .values()
                .filter(|entry| !inner.persisted.contains(&entry.id))
                .cloned()
                .collect()
        };
        let mut flushed = 0;
        for entry in pending {
            store
                .insert(
                    &entry.name,
                    &entry.description,
                    Some(entry.embedding.as_slice()),
                )
                .await?;
            self.inner.write().await.persisted.insert(entry.id);
            flushed += 1;
        }
        if flushed > 0 {
            debug!("Persisted {flushed} catalogue entries to store");
        }
        Ok(flushed)
    }

    /// Initialize the working set: hydrate from the store when available,
    /// seed defaults otherwise.
    ///
    /// Store unavailability degrades to purely in-memory operation with the
    /// seeded defaults; only a dimensionality mismatch is fatal.
    pub async fn bootstrap(
        &self,
        store: Option<&dyn CatalogueStore>,
    ) -> Result<(), CatalogueError> {
        match store {
            Some(store) => match self.load_from_store(store).await {
                Ok(0) => {
                    self.seed_defaults().await?;
                    if let Err(e) = self.persist_to_store(store).await {
                        warn!("Could not persist seeded tools: {e}. Continuing in memory.");
                    }
                }
                Ok(_) => {}
                Err(CatalogueError::Store(e)) => {
                    warn!("Catalogue store unavailable: {e}. Using in-memory defaults.");
                    self.seed_defaults().await?;
                }
                Err(fatal) => return Err(fatal),
            },
            None => {
                self.seed_defaults().await?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ToolCatalogue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolCatalogue").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::ProjectionEncoder;
    use crate::errors::{EmbeddingError, StoreError};
    use crate::store::StoredTool;
    use async_trait::async_trait;

    fn catalogue(dim: usize) -> ToolCatalogue {
        ToolCatalogue::new(Arc::new(ProjectionEncoder::new(dim, 0x7001).unwrap()))
    }

    #[tokio::test]
    async fn register_assigns_ascending_ids() {
        let catalogue = catalogue(32);
        let first = catalogue.register("WeatherAPI", "Weather info.").await.unwrap();
        let second = catalogue.register("CapitalAPI", "Capitals.").await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(catalogue.len().await, 2);
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_and_catalogue_unchanged() {
        let catalogue = catalogue(32);
        catalogue.register("WeatherAPI", "Weather info.").await.unwrap();
        let err = catalogue
            .register("WeatherAPI", "Different description.")
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogueError::DuplicateTool(name) if name == "WeatherAPI"));
        assert_eq!(catalogue.len().await, 1);
        let kept = catalogue.get_by_name("WeatherAPI").await.unwrap();
        assert_eq!(kept.description, "Weather info.");
    }

    #[tokio::test]
    async fn find_similar_on_empty_catalogue_returns_none() {
        let catalogue = catalogue(32);
        let query = ProjectionEncoder::new(32, 1).unwrap().encode("anything");
        assert!(catalogue.find_similar(&query).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn find_similar_returns_maximal_dot_product() {
        let encoder = Arc::new(ProjectionEncoder::new(64, 0x7002).unwrap());
        let catalogue = ToolCatalogue::new(encoder.clone());
        for (name, description) in DEFAULT_TOOLS {
            catalogue.register(name, description).await.unwrap();
        }
        let query = encoder.encode("Get current weather information for a location.");
        let (winner, score) = catalogue.find_similar(&query).await.unwrap().unwrap();
        // The query is the WeatherAPI description itself, so it must win with
        // similarity 1.
        assert_eq!(winner.name, "WeatherAPI");
        assert!((score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn similarity_ties_resolve_to_the_lowest_id() {
        let catalogue = catalogue(16);
        // Identical descriptions embed identically, forcing an exact tie.
        let first = catalogue.register("FirstTool", "Same description.").await.unwrap();
        catalogue.register("SecondTool", "Same description.").await.unwrap();
        let query = catalogue.get(first.id).await.unwrap().embedding;
        let (winner, _) = catalogue.find_similar(&query).await.unwrap().unwrap();
        assert_eq!(winner.id, first.id);
        assert_eq!(winner.name, "FirstTool");
    }

    #[tokio::test]
    async fn mismatched_query_dimension_fails_fast() {
        let catalogue = catalogue(32);
        catalogue.register("WeatherAPI", "Weather info.").await.unwrap();
        let query = ProjectionEncoder::new(16, 1).unwrap().encode("weather");
        let err = catalogue.find_similar(&query).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogueError::Embedding(EmbeddingError::DimensionMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn seed_defaults_fills_empty_catalogue_once() {
        let catalogue = catalogue(32);
        assert_eq!(catalogue.seed_defaults().await.unwrap(), DEFAULT_TOOLS.len());
        assert_eq!(catalogue.seed_defaults().await.unwrap(), 0);
        assert_eq!(catalogue.len().await, DEFAULT_TOOLS.len());
    }

    struct FailingStore;

    #[async_trait]
    impl CatalogueStore for FailingStore {
        async fn load_all(&self) -> Result<Vec<StoredTool>, StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }

        async fn insert(
            &self,
            _name: &str,
            _description: &str,
            _embedding: Option<&[f32]>,
        ) -> Result<i64, StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn bootstrap_degrades_to_memory_when_store_is_unavailable() {
        let catalogue = catalogue(32);
        catalogue.bootstrap(Some(&FailingStore)).await.unwrap();
        assert_eq!(catalogue.len().await, DEFAULT_TOOLS.len());
    }

    #[tokio::test]
    async fn bootstrap_without_store_seeds_defaults() {
        let catalogue = catalogue(32);
        catalogue.bootstrap(None).await.unwrap();
        assert!(catalogue.get_by_name("CalculatorAPI").await.is_some());
    }
}
