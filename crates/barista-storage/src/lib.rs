//! Barista storage crate - SQLite catalog store and knowledge base.
//!
//! Provides a WAL-mode SQLite database with migrations, the read-mostly
//! catalog repository (menu, gallery, workshops) with typed query
//! translation, an FTS5 knowledge index, and demo seeding.

pub mod catalog;
pub mod db;
pub mod knowledge;
pub mod migrations;
pub mod seed;

pub use catalog::{CatalogRepository, NewArtItem, NewMenuItem, NewWorkshop};
pub use db::Database;
pub use knowledge::{build_fts_query, KnowledgeIndex, KnowledgeMatch};
pub use seed::{apply_seed, SeedData, SeedReport};
