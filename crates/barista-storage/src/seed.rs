//! Demo catalog seeding.
//!
//! The demo data ships inside the binary as TOML and is only written into
//! tables that are still empty, so reseeding an existing database is a no-op.

use serde::Deserialize;
use tracing::info;

use barista_core::error::BaristaError;

use crate::catalog::{CatalogRepository, NewArtItem, NewMenuItem, NewWorkshop};
use crate::knowledge::KnowledgeIndex;

const DEMO_SEED: &str = include_str!("seed.toml");

/// A canned question/answer pair.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeSeed {
    pub question: String,
    pub answer: String,
}

/// Parsed seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub menu: Vec<NewMenuItem>,
    #[serde(default)]
    pub art: Vec<NewArtItem>,
    #[serde(default)]
    pub workshops: Vec<NewWorkshop>,
    #[serde(default)]
    pub knowledge: Vec<KnowledgeSeed>,
}

impl SeedData {
    /// The built-in demo catalog.
    pub fn demo() -> Result<Self, BaristaError> {
        Self::from_toml(DEMO_SEED)
    }

    pub fn from_toml(content: &str) -> Result<Self, BaristaError> {
        Ok(toml::from_str(content)?)
    }
}

/// Rows written by [`apply_seed`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub menu: usize,
    pub art: usize,
    pub workshops: usize,
    pub knowledge: usize,
}

/// Write `data` into every table that is currently empty, then rebuild the
/// knowledge index.
pub fn apply_seed(
    data: &SeedData,
    catalog: &CatalogRepository,
    knowledge: &KnowledgeIndex,
) -> Result<SeedReport, BaristaError> {
    let (menu_count, art_count, workshop_count) = catalog.counts()?;
    let mut report = SeedReport::default();

    if menu_count == 0 {
        for item in &data.menu {
            catalog.insert_menu_item(item)?;
        }
        report.menu = data.menu.len();
    }
    if art_count == 0 {
        for item in &data.art {
            catalog.insert_art_item(item)?;
        }
        report.art = data.art.len();
    }
    if workshop_count == 0 {
        for workshop in &data.workshops {
            catalog.insert_workshop(workshop)?;
        }
        report.workshops = data.workshops.len();
    }

    let indexed = knowledge.rebuild()?;
    if indexed == 0 {
        for entry in &data.knowledge {
            knowledge.insert_entry(&entry.question, &entry.answer)?;
        }
        report.knowledge = data.knowledge.len();
        knowledge.rebuild()?;
    }

    info!(
        menu = report.menu,
        art = report.art,
        workshops = report.workshops,
        knowledge = report.knowledge,
        "Seed applied"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::Database;
    use barista_core::query::{OrderBy, QuerySpec};

    fn make_repos() -> (CatalogRepository, KnowledgeIndex) {
        let db = Arc::new(Database::in_memory().unwrap());
        (
            CatalogRepository::new(Arc::clone(&db)),
            KnowledgeIndex::new(db),
        )
    }

    #[test]
    fn test_demo_seed_parses() {
        let data = SeedData::demo().unwrap();
        assert!(data.menu.len() >= 10);
        assert!(!data.art.is_empty());
        assert!(!data.workshops.is_empty());
        assert!(!data.knowledge.is_empty());
        assert!(data.art.iter().any(|a| !a.available));
    }

    #[test]
    fn test_apply_seed_into_empty_db() {
        let (catalog, knowledge) = make_repos();
        let data = SeedData::demo().unwrap();
        let report = apply_seed(&data, &catalog, &knowledge).unwrap();

        assert_eq!(report.menu, data.menu.len());
        assert_eq!(report.knowledge, data.knowledge.len());
        assert!(knowledge.is_ready());

        let all = catalog
            .list_menu_items(&QuerySpec {
                clauses: vec![],
                order_by: OrderBy::PriceAsc,
                limit: 100,
            })
            .unwrap();
        assert_eq!(all.len(), data.menu.len());
        assert!(!knowledge.search("wifi", 1).unwrap().is_empty());
    }

    #[test]
    fn test_apply_seed_twice_is_noop() {
        let (catalog, knowledge) = make_repos();
        let data = SeedData::demo().unwrap();
        apply_seed(&data, &catalog, &knowledge).unwrap();
        let second = apply_seed(&data, &catalog, &knowledge).unwrap();

        assert_eq!(second, SeedReport::default());
        let (menu, art, workshops) = catalog.counts().unwrap();
        assert_eq!(menu as usize, data.menu.len());
        assert_eq!(art as usize, data.art.len());
        assert_eq!(workshops as usize, data.workshops.len());
    }

    #[test]
    fn test_from_toml_partial() {
        let data = SeedData::from_toml(
            r#"
            [[menu]]
            name = "Plain Water"
            category = "Drink"
            price = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(data.menu.len(), 1);
        assert!(data.menu[0].tags.is_empty());
        assert!(data.art.is_empty());
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = SeedData::from_toml("[[menu]]\nname = 3").unwrap_err();
        assert!(matches!(err, BaristaError::Config(_)));
    }
}
