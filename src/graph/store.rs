//! Graph persistence.
//!
//! The graph is stored as a single JSON document. Every operation loads
//! the whole graph, mutates it, and saves it back, so the store is the
//! only place that touches disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::error::{Result, StorageError};
use crate::graph::types::KnowledgeGraph;

/// Persistence gateway for the knowledge graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Load the full graph. A store with no previous contents yields an
    /// empty graph rather than an error.
    async fn load(&self) -> Result<KnowledgeGraph>;

    /// Persist the full graph, replacing previous contents.
    async fn save(&self, graph: &KnowledgeGraph) -> Result<()>;
}

// ============================================================================
// File-backed store
// ============================================================================

/// JSON-file-backed store.
///
/// Writes go to a temporary sibling file first and are renamed into
/// place, so a crash mid-write never leaves a truncated graph behind.
pub struct FileGraphStore {
    path: PathBuf,
}

impl FileGraphStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl GraphStore for FileGraphStore {
    async fn load(&self) -> Result<KnowledgeGraph> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(KnowledgeGraph::default());
            }
            Err(e) => {
                return Err(StorageError::Read {
                    path: self.path.display().to_string(),
                    source: e,
                }
                .into());
            }
        };

        match serde_json::from_str(&data) {
            Ok(graph) => Ok(graph),
            Err(e) => {
                // An unreadable document is treated as a fresh start; the
                // next save overwrites it.
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "graph file is not valid JSON, starting with an empty graph"
                );
                Ok(KnowledgeGraph::default())
            }
        }
    }

    async fn save(&self, graph: &KnowledgeGraph) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Write {
                    path: parent.display().to_string(),
                    source: e,
                })?;
        }

        let json = serde_json::to_string_pretty(graph)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| StorageError::Write {
                path: tmp.display().to_string(),
                source: e,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Write {
                path: self.path.display().to_string(),
                source: e,
            })?;

        info!(
            path = %self.path.display(),
            entities = graph.entities.len(),
            relations = graph.relations.len(),
            "saved graph"
        );
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory store, used by tests and the library API when no file
/// backing is wanted.
#[derive(Default)]
pub struct MemoryGraphStore {
    graph: RwLock<KnowledgeGraph>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_graph(graph: KnowledgeGraph) -> Self {
        Self {
            graph: RwLock::new(graph),
        }
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn load(&self) -> Result<KnowledgeGraph> {
        Ok(self.graph.read().await.clone())
    }

    async fn save(&self, graph: &KnowledgeGraph) -> Result<()> {
        *self.graph.write().await = graph.clone();
        Ok(())
    }
}
