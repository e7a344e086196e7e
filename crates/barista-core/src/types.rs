use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::BaristaError;

// =============================================================================
// Enums
// =============================================================================

/// General menu category a turn is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Context {
    Food,
    Drink,
}

impl Context {
    /// Lowercase label used in replies ("food", "drink").
    pub fn label(&self) -> &'static str {
        match self {
            Context::Food => "food",
            Context::Drink => "drink",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Finer drink classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubCategory {
    Tea,
    Coffee,
    Shake,
}

impl SubCategory {
    pub fn label(&self) -> &'static str {
        match self {
            SubCategory::Tea => "tea",
            SubCategory::Coffee => "coffee",
            SubCategory::Shake => "shake",
        }
    }
}

impl fmt::Display for SubCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Caffeine content of a menu item, ordered from none to extreme.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CaffeineLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    VeryHigh,
    Extreme,
}

impl CaffeineLevel {
    /// Storage representation (matches the serde name).
    pub fn as_str(&self) -> &'static str {
        match self {
            CaffeineLevel::None => "none",
            CaffeineLevel::Low => "low",
            CaffeineLevel::Medium => "medium",
            CaffeineLevel::High => "high",
            CaffeineLevel::VeryHigh => "very_high",
            CaffeineLevel::Extreme => "extreme",
        }
    }

    /// Human wording used in replies ("very high").
    pub fn descriptor(&self) -> &'static str {
        match self {
            CaffeineLevel::None => "caffeine-free",
            CaffeineLevel::Low => "low",
            CaffeineLevel::Medium => "medium",
            CaffeineLevel::High => "high",
            CaffeineLevel::VeryHigh => "very high",
            CaffeineLevel::Extreme => "extreme",
        }
    }
}

impl FromStr for CaffeineLevel {
    type Err = BaristaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CaffeineLevel::None),
            "low" => Ok(CaffeineLevel::Low),
            "medium" => Ok(CaffeineLevel::Medium),
            "high" => Ok(CaffeineLevel::High),
            "very_high" | "very high" | "veryhigh" => Ok(CaffeineLevel::VeryHigh),
            "extreme" => Ok(CaffeineLevel::Extreme),
            other => Err(BaristaError::Serialization(format!(
                "unknown caffeine level: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// Catalog rows
// =============================================================================

/// A menu item as seen by the recommendation engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub name: String,
    /// Free-form category, e.g. "Robusta", "House Blend", "Tea", "Snack".
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub caffeine_level: CaffeineLevel,
    /// Lowercase descriptive tags in display order.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogItem {
    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Case-insensitive substring match on the category.
    pub fn category_contains(&self, needle: &str) -> bool {
        self.category
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }
}

/// A gallery piece hanging in the shop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtItem {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub price: f64,
    pub available: bool,
}

/// A scheduled workshop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workshop {
    pub id: i64,
    pub title: String,
    pub datetime: NaiveDateTime,
    pub seats: i64,
    pub booked: i64,
    pub price: f64,
}

impl Workshop {
    /// Seats still open. May be negative when overbooked.
    pub fn remaining(&self) -> i64 {
        self.seats - self.booked
    }

    pub fn is_sold_out(&self) -> bool {
        self.remaining() <= 0
    }
}
