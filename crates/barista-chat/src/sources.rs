//! Collaborators the engine reads from: the catalog and the knowledge base.
//!
//! The SQLite adapters run the blocking repository calls on tokio's blocking
//! pool so a slow query never stalls the async runtime.

use std::sync::Arc;

use async_trait::async_trait;

use barista_core::error::BaristaError;
use barista_core::query::QuerySpec;
use barista_core::types::{ArtItem, CatalogItem, Workshop};
use barista_storage::{CatalogRepository, KnowledgeIndex};

use crate::error::ChatError;

/// Number of knowledge hits requested per search. Only the best is used.
const KNOWLEDGE_CANDIDATES: u64 = 3;

/// A knowledge-base hit.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch {
    pub response: String,
    /// Higher is better.
    pub score: f64,
}

/// Read-only catalog access.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_menu_items(&self, spec: &QuerySpec) -> Result<Vec<CatalogItem>, ChatError>;
    async fn list_art_items(&self, available_only: bool) -> Result<Vec<ArtItem>, ChatError>;
    async fn list_workshops(&self) -> Result<Vec<Workshop>, ChatError>;
}

/// Free-text search over canned answers, best match first.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn search(&self, text: &str) -> Result<Vec<RankedMatch>, ChatError>;
}

// =============================================================================
// SQLite adapters
// =============================================================================

async fn run_blocking<T, F>(f: F) -> Result<T, ChatError>
where
    F: FnOnce() -> Result<T, BaristaError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ChatError::CatalogQuery(format!("catalog task failed: {}", e)))?
        .map_err(|e| ChatError::CatalogQuery(e.to_string()))
}

/// [`CatalogStore`] backed by the SQLite catalog repository.
#[derive(Clone)]
pub struct SqliteCatalog {
    repo: Arc<CatalogRepository>,
}

impl SqliteCatalog {
    pub fn new(repo: Arc<CatalogRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn list_menu_items(&self, spec: &QuerySpec) -> Result<Vec<CatalogItem>, ChatError> {
        let repo = Arc::clone(&self.repo);
        let spec = spec.clone();
        run_blocking(move || repo.list_menu_items(&spec)).await
    }

    async fn list_art_items(&self, available_only: bool) -> Result<Vec<ArtItem>, ChatError> {
        let repo = Arc::clone(&self.repo);
        run_blocking(move || repo.list_art_items(available_only)).await
    }

    async fn list_workshops(&self) -> Result<Vec<Workshop>, ChatError> {
        let repo = Arc::clone(&self.repo);
        run_blocking(move || repo.list_workshops()).await
    }
}

/// [`KnowledgeBase`] backed by the FTS5 knowledge index.
#[derive(Clone)]
pub struct SqliteKnowledge {
    index: Arc<KnowledgeIndex>,
}

impl SqliteKnowledge {
    pub fn new(index: Arc<KnowledgeIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl KnowledgeBase for SqliteKnowledge {
    async fn search(&self, text: &str) -> Result<Vec<RankedMatch>, ChatError> {
        if !self.index.is_ready() {
            return Err(ChatError::KnowledgeUnavailable(
                "index has not been built".to_string(),
            ));
        }
        let index = Arc::clone(&self.index);
        let text = text.to_string();
        let matches = tokio::task::spawn_blocking(move || index.search(&text, KNOWLEDGE_CANDIDATES))
            .await
            .map_err(|e| ChatError::KnowledgeUnavailable(format!("search task failed: {}", e)))?
            .map_err(|e| ChatError::KnowledgeUnavailable(e.to_string()))?;

        Ok(matches
            .into_iter()
            .map(|m| RankedMatch {
                response: m.answer,
                score: m.score,
            })
            .collect())
    }
}
