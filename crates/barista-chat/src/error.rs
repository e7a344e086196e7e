//! Error types for the recommendation engine.
//!
//! None of these reach the transport: the orchestrator converts each into a
//! degraded reply.

/// Errors raised by the engine's collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("catalog query failed: {0}")]
    CatalogQuery(String),
    #[error("catalog query timed out after {0} ms")]
    CatalogTimeout(u64),
    #[error("knowledge index unavailable: {0}")]
    KnowledgeUnavailable(String),
}
