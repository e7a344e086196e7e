//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use barista_chat::{ChatOrchestrator, ShardedSessionStore, SqliteCatalog, SqliteKnowledge};
use barista_core::config::BaristaConfig;
use barista_storage::{CatalogRepository, Database, KnowledgeIndex};

/// Shared application state.
///
/// Every field is behind an `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<BaristaConfig>,
    pub catalog: Arc<CatalogRepository>,
    /// Shared with the orchestrator; rebuilt at startup.
    pub knowledge: Arc<KnowledgeIndex>,
    /// Shared with the orchestrator; pruned periodically by the binary.
    pub sessions: Arc<ShardedSessionStore>,
    pub orchestrator: Arc<ChatOrchestrator>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Wire the SQLite-backed catalog, knowledge index and session store
    /// into a chat orchestrator.
    pub fn new(config: BaristaConfig, database: Arc<Database>) -> Self {
        let catalog = Arc::new(CatalogRepository::new(Arc::clone(&database)));
        let knowledge = Arc::new(KnowledgeIndex::new(Arc::clone(&database)));
        let sessions = Arc::new(ShardedSessionStore::from_config(&config.sessions));

        let orchestrator = ChatOrchestrator::new(
            config.chat.clone(),
            sessions.clone(),
            Arc::new(SqliteCatalog::new(Arc::clone(&catalog))),
            Arc::new(SqliteKnowledge::new(Arc::clone(&knowledge))),
        );

        Self {
            config: Arc::new(config),
            catalog,
            knowledge,
            sessions,
            orchestrator: Arc::new(orchestrator),
            start_time: Instant::now(),
        }
    }
}
