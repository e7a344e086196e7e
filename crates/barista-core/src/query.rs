//! Typed menu query specification.
//!
//! A [`QuerySpec`] is an ordered list of filter clauses (all of which must
//! hold) plus an explicit ordering and row limit. Catalog stores translate it
//! into their own query mechanism; [`QuerySpec::matches`] is the reference
//! semantics every translation must agree with.

use serde::{Deserialize, Serialize};

use crate::types::{CaffeineLevel, CatalogItem, SubCategory};

/// Words that mark a row as food when found in its category or tags.
pub const FOOD_MARKERS: &[&str] = &["food", "snack", "meal"];

/// Category families counted as coffee.
pub const COFFEE_FAMILIES: &[&str] = &["robusta", "blend"];

/// A single filter clause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Clause {
    /// Caffeine level is one of the listed levels.
    CaffeineIn(Vec<CaffeineLevel>),
    /// Category or tags signal food/snack/meal.
    Food,
    /// Category does not signal food/snack/meal.
    NotFood,
    /// Drink sub-category restriction.
    SubCategory(SubCategory),
    /// At least one of the tags is present (OR semantics).
    AnyTag(Vec<String>),
}

impl Clause {
    /// Evaluate this clause against a single row.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            Clause::CaffeineIn(levels) => levels.contains(&item.caffeine_level),
            Clause::Food => is_food(item),
            Clause::NotFood => !FOOD_MARKERS.iter().any(|m| item.category_contains(m)),
            Clause::SubCategory(SubCategory::Coffee) => {
                COFFEE_FAMILIES.iter().any(|f| item.category_contains(f)) || item.has_tag("coffee")
            }
            Clause::SubCategory(SubCategory::Tea) => {
                item.category_contains("tea") || item.has_tag("tea")
            }
            Clause::SubCategory(SubCategory::Shake) => {
                item.category_contains("shake") || item.has_tag("milk")
            }
            Clause::AnyTag(tags) => tags.iter().any(|t| item.has_tag(t)),
        }
    }
}

fn is_food(item: &CatalogItem) -> bool {
    FOOD_MARKERS
        .iter()
        .any(|m| item.category_contains(m) || item.has_tag(m))
}

/// Result ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    Random,
    PriceAsc,
    PriceDesc,
}

/// Filter, ordering and limit for one menu lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub clauses: Vec<Clause>,
    pub order_by: OrderBy,
    pub limit: usize,
}

impl QuerySpec {
    /// True when every clause holds for `item`.
    pub fn matches(&self, item: &CatalogItem) -> bool {
        self.clauses.iter().all(|c| c.matches(item))
    }

    /// Apply the spec to an in-memory slice. `Random` keeps the input order;
    /// callers that need real shuffling do it before calling.
    pub fn apply(&self, items: &[CatalogItem]) -> Vec<CatalogItem> {
        let mut rows: Vec<CatalogItem> = items.iter().filter(|i| self.matches(i)).cloned().collect();
        match self.order_by {
            OrderBy::Random => {}
            OrderBy::PriceAsc => rows.sort_by(|a, b| a.price.total_cmp(&b.price)),
            OrderBy::PriceDesc => rows.sort_by(|a, b| b.price.total_cmp(&a.price)),
        }
        rows.truncate(self.limit);
        rows
    }
}
