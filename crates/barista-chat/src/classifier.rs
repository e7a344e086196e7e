//! Keyword intent classifier.
//!
//! Every flag is a substring check of the lowercased message against a fixed
//! vocabulary. Matching is deliberately literal: "and" also fires inside
//! "sandwich" and "art" inside "start".

use std::collections::BTreeSet;

use barista_core::types::{Context, SubCategory};

use crate::types::{Domain, Signals};

// =============================================================================
// Vocabulary
// =============================================================================

static ART_KEYWORDS: &[&str] = &["art", "gallery", "painting", "artist", "piece"];

static WORKSHOP_KEYWORDS: &[&str] = &["workshop", "class", "learn", "course"];

static REC_KEYWORDS: &[&str] = &[
    "suggest", "recommend", "good", "want", "like", "try", "need", "ordering", "have",
];

static TIRED_KEYWORDS: &[&str] = &["tired", "sleepy", "wake", "energy", "caffeine", "buzz"];

static FOLLOW_UP_KEYWORDS: &[&str] = &["then", "what about", "how about", "and"];

static CHEAP_KEYWORDS: &[&str] = &["cheap", "lowest", "least"];

static EXPENSIVE_KEYWORDS: &[&str] = &["expensive", "highest", "most"];

static FLAVOR_KEYWORDS: &[&str] = &[
    "strong", "sweet", "cold", "hot", "fruity", "milky", "creamy", "chocolate", "spicy",
    "savory",
];

static FOOD_KEYWORDS: &[&str] = &[
    "food", "eat", "snack", "hungry", "meal", "bite", "sandwich", "pastry", "cake", "cookie",
    "breakfast", "lunch",
];

static DRINK_KEYWORDS: &[&str] = &["drink", "beverage", "thirsty", "sip"];

/// Sub-category vocabularies in evaluation order.
static SUB_CATEGORY_KEYWORDS: &[(SubCategory, &[&str])] = &[
    (
        SubCategory::Coffee,
        &["coffee", "espresso", "latte", "cappuccino", "americano", "brew"],
    ),
    (SubCategory::Tea, &["tea", "chai", "matcha"]),
    (SubCategory::Shake, &["shake", "smoothie", "frappe"]),
];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

// =============================================================================
// IntentClassifier
// =============================================================================

/// Turns raw text into a [`Signals`] bundle. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a message. Case-insensitive; never fails.
    pub fn classify(&self, text: &str) -> Signals {
        let lowered = text.to_lowercase();
        let t = lowered.as_str();

        let is_art = contains_any(t, ART_KEYWORDS);
        let is_workshop = contains_any(t, WORKSHOP_KEYWORDS);
        let domain = if is_art {
            Domain::Art
        } else if is_workshop {
            Domain::Workshop
        } else {
            Domain::Menu
        };

        let current_context = if contains_any(t, FOOD_KEYWORDS) {
            Some(Context::Food)
        } else if contains_any(t, DRINK_KEYWORDS) {
            Some(Context::Drink)
        } else {
            None
        };

        let sub_category = SUB_CATEGORY_KEYWORDS
            .iter()
            .find(|(_, words)| contains_any(t, words))
            .map(|(sub, _)| *sub);

        let flavor_keywords: BTreeSet<String> = FLAVOR_KEYWORDS
            .iter()
            .filter(|k| t.contains(*k))
            .map(|k| k.to_string())
            .collect();

        Signals {
            domain,
            is_art,
            is_workshop,
            is_rec_trigger: contains_any(t, REC_KEYWORDS),
            is_cheapest: contains_any(t, CHEAP_KEYWORDS),
            is_expensive: contains_any(t, EXPENSIVE_KEYWORDS),
            is_tired: contains_any(t, TIRED_KEYWORDS),
            is_follow_up: contains_any(t, FOLLOW_UP_KEYWORDS),
            current_context,
            sub_category,
            flavor_keywords,
            mentions_menu: t.contains("menu"),
        }
    }
}
