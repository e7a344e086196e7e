//! Conversational barista for the coffee shop.
//!
//! Classifies free-text messages, carries menu context across turns of a
//! session, looks up the catalog, and falls back to canned knowledge or
//! generic help when the catalog has nothing to offer.

pub mod classifier;
pub mod context;
pub mod error;
pub mod orchestrator;
pub mod query_builder;
pub mod response;
pub mod session;
pub mod sources;
pub mod types;

pub use classifier::IntentClassifier;
pub use context::ContextResolver;
pub use error::ChatError;
pub use orchestrator::ChatOrchestrator;
pub use query_builder::{select_art_piece, CatalogQueryBuilder};
pub use response::ResponseComposer;
pub use session::{SessionStore, ShardedSessionStore};
pub use sources::{CatalogStore, KnowledgeBase, RankedMatch, SqliteCatalog, SqliteKnowledge};
pub use types::{
    ChatReply, ChatRequest, ChatResponseBody, ContextSource, Domain, PriceSort, ReplySource,
    ResolvedContext, SessionState, Signals,
};
