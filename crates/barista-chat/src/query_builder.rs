//! Catalog query construction.
//!
//! Builds the menu [`QuerySpec`] for a turn from its signals and resolved
//! context, and picks a single art piece when the gallery is asked for a
//! recommendation.

use rand::seq::IndexedRandom;
use rand::Rng;

use barista_core::query::{Clause, OrderBy, QuerySpec};
use barista_core::types::{ArtItem, CaffeineLevel, Context};

use crate::types::{Domain, PriceSort, ResolvedContext, Signals};

/// Caffeine levels that count as an energy pick.
pub const ENERGY_LEVELS: &[CaffeineLevel] = &[CaffeineLevel::VeryHigh, CaffeineLevel::Extreme];

/// Builds menu queries.
#[derive(Debug, Clone)]
pub struct CatalogQueryBuilder {
    default_limit: usize,
}

impl CatalogQueryBuilder {
    pub fn new(default_limit: usize) -> Self {
        Self {
            default_limit: default_limit.max(1),
        }
    }

    /// Whether the turn warrants a menu lookup at all.
    pub fn should_query(&self, signals: &Signals, resolved: &ResolvedContext) -> bool {
        signals.domain == Domain::Menu
            && (signals.is_rec_trigger
                || signals.is_price_sort()
                || signals.is_follow_up
                || resolved.context.is_some()
                || signals.is_tired)
    }

    /// Build the menu query, or `None` when the turn is not a menu lookup.
    pub fn build(&self, signals: &Signals, resolved: &ResolvedContext) -> Option<QuerySpec> {
        if !self.should_query(signals, resolved) {
            return None;
        }

        let mut clauses = Vec::new();
        let mut order_by = OrderBy::Random;
        let mut limit = self.default_limit;

        if signals.is_tired {
            clauses.push(Clause::CaffeineIn(ENERGY_LEVELS.to_vec()));
            limit = 1;
        }

        match resolved.context {
            Some(Context::Food) => clauses.push(Clause::Food),
            Some(Context::Drink) => {
                clauses.push(Clause::NotFood);
                if let Some(sub) = resolved.sub_category {
                    clauses.push(Clause::SubCategory(sub));
                }
            }
            None => {}
        }

        if let Some(sort) = signals.price_sort() {
            limit = 1;
            order_by = match sort {
                PriceSort::Cheapest => OrderBy::PriceAsc,
                PriceSort::Expensive => OrderBy::PriceDesc,
            };
        }

        if !signals.flavor_keywords.is_empty() {
            clauses.push(Clause::AnyTag(
                signals.flavor_keywords.iter().cloned().collect(),
            ));
        }

        Some(QuerySpec {
            clauses,
            order_by,
            limit,
        })
    }
}

/// Pick one art piece: cheapest or priciest when a price sort was asked for,
/// otherwise uniformly at random.
pub fn select_art_piece<'a, R>(
    items: &'a [ArtItem],
    signals: &Signals,
    rng: &mut R,
) -> Option<&'a ArtItem>
where
    R: Rng + ?Sized,
{
    match signals.price_sort() {
        Some(PriceSort::Cheapest) => items.iter().min_by(|a, b| a.price.total_cmp(&b.price)),
        Some(PriceSort::Expensive) => items.iter().max_by(|a, b| a.price.total_cmp(&b.price)),
        None => items.choose(rng),
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use barista_core::types::{CatalogItem, SubCategory};

    use super::*;
    use crate::classifier::IntentClassifier;
    use crate::context::ContextResolver;
    use crate::types::{ContextSource, SessionState};

    fn build_for(text: &str, session: Option<&SessionState>) -> Option<QuerySpec> {
        let signals = IntentClassifier::new().classify(text);
        let resolved = ContextResolver::new().resolve(&signals, session);
        CatalogQueryBuilder::new(3).build(&signals, &resolved)
    }

    fn menu_item(id: i64, category: &str, tags: &[&str]) -> CatalogItem {
        CatalogItem {
            id,
            name: format!("item {}", id),
            category: category.to_string(),
            price: 4.0,
            caffeine_level: CaffeineLevel::None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn art(id: i64, price: f64) -> ArtItem {
        ArtItem {
            id,
            title: format!("piece {}", id),
            artist: "A. Artist".to_string(),
            price,
            available: true,
        }
    }

    // ---- Gate ----

    #[test]
    fn test_no_trigger_no_query() {
        assert!(build_for("hello there", None).is_none());
        assert!(build_for("what time do you open", None).is_none());
    }

    #[test]
    fn test_art_and_workshop_never_build_menu_query() {
        assert!(build_for("recommend an art piece", None).is_none());
        assert!(build_for("suggest a workshop", None).is_none());
    }

    #[test]
    fn test_context_alone_opens_gate() {
        let spec = build_for("a snack", None).unwrap();
        assert_eq!(spec.clauses, vec![Clause::Food]);
    }

    #[test]
    fn test_gate_with_unset_context() {
        let signals = IntentClassifier::new().classify("hello");
        let resolved = ResolvedContext {
            context: None,
            sub_category: None,
            source: ContextSource::Unset,
        };
        assert!(!CatalogQueryBuilder::new(3).should_query(&signals, &resolved));
    }

    // ---- Defaults ----

    #[test]
    fn test_default_random_limit() {
        let spec = build_for("suggest something", None).unwrap();
        assert!(spec.clauses.is_empty());
        assert_eq!(spec.order_by, OrderBy::Random);
        assert_eq!(spec.limit, 3);
    }

    #[test]
    fn test_configured_default_limit() {
        let signals = IntentClassifier::new().classify("suggest something");
        let resolved = ContextResolver::new().resolve(&signals, None);
        let spec = CatalogQueryBuilder::new(5).build(&signals, &resolved).unwrap();
        assert_eq!(spec.limit, 5);
    }

    // ---- Energy ----

    #[test]
    fn test_tired_query() {
        let spec = build_for("I'm tired", None).unwrap();
        assert_eq!(
            spec.clauses,
            vec![
                Clause::CaffeineIn(vec![CaffeineLevel::VeryHigh, CaffeineLevel::Extreme]),
                Clause::NotFood,
            ]
        );
        assert_eq!(spec.limit, 1);
        assert_eq!(spec.order_by, OrderBy::Random);
    }

    #[test]
    fn test_tired_after_food_session() {
        let session = SessionState {
            last_context: Some(Context::Food),
            last_sub_category: None,
        };
        let spec = build_for("I'm tired", Some(&session)).unwrap();
        assert!(spec
            .clauses
            .contains(&Clause::CaffeineIn(ENERGY_LEVELS.to_vec())));
        assert!(!spec.clauses.contains(&Clause::Food));
        assert_eq!(spec.limit, 1);
    }

    // ---- Context filter ----

    #[test]
    fn test_drink_with_sub_category() {
        let spec = build_for("suggest a coffee", None).unwrap();
        assert_eq!(
            spec.clauses,
            vec![Clause::NotFood, Clause::SubCategory(SubCategory::Coffee)]
        );
    }

    #[test]
    fn test_food_drops_sub_category() {
        let session = SessionState {
            last_context: Some(Context::Drink),
            last_sub_category: Some(SubCategory::Tea),
        };
        let spec = build_for("what about a snack", Some(&session)).unwrap();
        assert_eq!(spec.clauses, vec![Clause::Food]);
    }

    // ---- Price sort ----

    #[test]
    fn test_cheapest_sort() {
        let spec = build_for("cheapest coffee", None).unwrap();
        assert_eq!(spec.order_by, OrderBy::PriceAsc);
        assert_eq!(spec.limit, 1);
    }

    #[test]
    fn test_expensive_sort() {
        let spec = build_for("most expensive drink", None).unwrap();
        assert_eq!(spec.order_by, OrderBy::PriceDesc);
        assert_eq!(spec.limit, 1);
    }

    #[test]
    fn test_both_price_words_sort_ascending() {
        let spec = build_for("least expensive drink", None).unwrap();
        assert_eq!(spec.order_by, OrderBy::PriceAsc);
    }

    // ---- Flavors ----

    #[test]
    fn test_flavors_are_one_or_clause() {
        let spec = build_for("suggest a spicy savory snack", None).unwrap();
        assert_eq!(
            spec.clauses,
            vec![
                Clause::Food,
                Clause::AnyTag(vec!["savory".to_string(), "spicy".to_string()]),
            ]
        );
    }

    #[test]
    fn test_flavor_query_matches_spicy_row_only() {
        let spec = build_for("suggest a spicy savory snack", None).unwrap();
        let spicy = menu_item(1, "Snack", &["spicy", "savory"]);
        let sweet = menu_item(2, "Snack", &["sweet", "milky"]);
        assert!(spec.matches(&spicy));
        assert!(!spec.matches(&sweet));
    }

    // ---- Art selection ----

    #[test]
    fn test_select_cheapest_and_priciest_art() {
        let items = vec![art(1, 300.0), art(2, 90.0), art(3, 450.0)];
        let mut rng = StdRng::seed_from_u64(7);
        let classifier = IntentClassifier::new();

        let cheap = classifier.classify("cheapest painting");
        assert_eq!(select_art_piece(&items, &cheap, &mut rng).unwrap().id, 2);

        let pricey = classifier.classify("most expensive painting");
        assert_eq!(select_art_piece(&items, &pricey, &mut rng).unwrap().id, 3);
    }

    #[test]
    fn test_select_random_art_is_from_list() {
        let items = vec![art(1, 300.0), art(2, 90.0)];
        let mut rng = StdRng::seed_from_u64(42);
        let signals = IntentClassifier::new().classify("recommend a painting");
        for _ in 0..10 {
            let picked = select_art_piece(&items, &signals, &mut rng).unwrap();
            assert!(items.contains(picked));
        }
    }

    #[test]
    fn test_select_from_empty_gallery() {
        let mut rng = StdRng::seed_from_u64(1);
        let signals = IntentClassifier::new().classify("recommend a painting");
        assert!(select_art_piece(&[], &signals, &mut rng).is_none());
    }
}
