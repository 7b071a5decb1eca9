//! SQLite store for tools and interaction logs.
//!
//! Backs the catalogue store and interaction log contracts with a single
//! embedded database. Embeddings and tool-usage records are serialized into
//! JSON text columns; timestamps are RFC 3339 text.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cotools_core::{CatalogueStore, InteractionLog, StoreError, StoredTool, ToolInvocationRecord};
use rusqlite::{params, Connection};
use tracing::{debug, info};

/// SQLite-backed catalogue store and interaction log
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
    db_path: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created database directory: {}", parent.display());
            }
        }

        let db_path = path.to_string_lossy().to_string();
        info!("Opening SQLite store at {db_path}");
        let conn = Connection::open(path)
            .map_err(|e| anyhow::anyhow!("Failed to open SQLite database: {e}"))?;
        conn.busy_timeout(std::time::Duration::from_secs(30))
            .map_err(|e| anyhow::anyhow!("Failed to set busy timeout: {e}"))?;

        Self::init_schema(&conn)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(conn)),
            db_path,
        })
    }

    /// Open an in-memory database, for tests and ephemeral runs
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| anyhow::anyhow!("Failed to open in-memory database: {e}"))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(conn)),
            db_path: ":memory:".to_string(),
        })
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tools (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL,
                vector_data TEXT,
                created_at TEXT NOT NULL
            );",
            [],
        )
        .map_err(|e| anyhow::anyhow!("Failed to create tools table: {e}"))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY,
                timestamp TEXT NOT NULL,
                user_query TEXT,
                agent_response TEXT,
                tools_used TEXT
            );",
            [],
        )
        .map_err(|e| anyhow::anyhow!("Failed to create logs table: {e}"))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tools_name ON tools(name);",
            [],
        )
        .map_err(|e| anyhow::anyhow!("Failed to create tools name index: {e}"))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs(timestamp);",
            [],
        )
        .map_err(|e| anyhow::anyhow!("Failed to create logs timestamp index: {e}"))?;

        Ok(())
    }

    /// Number of interaction log entries, for inspection and tests
    pub fn log_count(&self) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("Connection lock poisoned: {e}")))
    }
}

#[async_trait]
impl CatalogueStore for SqliteStore {
    async fn load_all(&self) -> Result<Vec<StoredTool>, StoreError> {
        let conn = self.conn()?;
        let mut statement = conn
            .prepare("SELECT id, name, description, vector_data, created_at FROM tools ORDER BY id")
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let rows = statement
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut tools = Vec::new();
        for row in rows {
            let (id, name, description, vector_data, created_at) =
                row.map_err(|e| StoreError::Query(e.to_string()))?;
            let embedding = match vector_data {
                Some(json) => Some(
                    serde_json::from_str::<Vec<f32>>(&json)
                        .map_err(|e| StoreError::Query(format!("Bad vector for tool {id}: {e}")))?,
                ),
                None => None,
            };
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| StoreError::Query(format!("Bad timestamp for tool {id}: {e}")))?
                .with_timezone(&Utc);
            tools.push(StoredTool {
                id,
                name,
                description,
                embedding,
                created_at,
            });
        }
        debug!("Loaded {} tools from store", tools.len());
        Ok(tools)
    }

    async fn insert(
        &self,
        name: &str,
        description: &str,
        embedding: Option<&[f32]>,
    ) -> Result<i64, StoreError> {
        let vector_json = embedding
            .map(|values| {
                serde_json::to_string(values).map_err(|e| StoreError::Query(e.to_string()))
            })
            .transpose()?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO tools (name, description, vector_data, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, description, vector_json, Utc::now().to_rfc3339()],
        )
        .map_err(|e| StoreError::Query(e.to_string()))?;
        let id = conn.last_insert_rowid();
        debug!("Inserted tool '{name}' with store id {id}");
        Ok(id)
    }
}

#[async_trait]
impl InteractionLog for SqliteStore {
    async fn append(
        &self,
        query: &str,
        answer: &str,
        tools_used: &[ToolInvocationRecord],
    ) -> Result<i64, StoreError> {
        let tools_json = if tools_used.is_empty() {
            None
        } else {
            Some(serde_json::to_string(tools_used).map_err(|e| StoreError::Query(e.to_string()))?)
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO logs (timestamp, user_query, agent_response, tools_used) VALUES (?1, ?2, ?3, ?4)",
            params![Utc::now().to_rfc3339(), query, answer, tools_json],
        )
        .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cotools_core::{InvocationOutcome, ToolParams};

    #[tokio::test]
    async fn insert_then_load_round_trips_tools() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store
            .insert("WeatherAPI", "Weather info.", Some(&[0.6, 0.8]))
            .await
            .unwrap();
        let absent = store.insert("CapitalAPI", "Capitals.", None).await.unwrap();
        assert!(absent > id);

        let tools = store.load_all().await.unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "WeatherAPI");
        assert_eq!(tools[0].embedding.as_deref(), Some(&[0.6f32, 0.8][..]));
        assert_eq!(tools[1].name, "CapitalAPI");
        assert!(tools[1].embedding.is_none());
    }

    #[tokio::test]
    async fn load_all_on_fresh_database_is_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn interaction_log_appends_with_ascending_ids() {
        let store = SqliteStore::open_in_memory().unwrap();
        let record = ToolInvocationRecord {
            tool_name: "SearchAPI".to_string(),
            parameters: ToolParams::new(),
            outcome: InvocationOutcome::Failure("boom".to_string()),
        };
        let first = store.append("q1", "a1", &[record]).await.unwrap();
        let second = store.append("q2", "a2", &[]).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn open_creates_the_database_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/agent_data.db");
        let store = SqliteStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(store.load_all().await.unwrap().is_empty());
    }
}
