//! Read-mostly catalog repository: menu items, gallery pieces, workshops.
//!
//! Menu lookups take a [`QuerySpec`] and translate it into a parameterised
//! SQL statement. The translation must agree with [`QuerySpec::matches`].

use std::sync::Arc;

use chrono::NaiveDateTime;
use rusqlite::types::ToSql;
use serde::Deserialize;

use barista_core::error::BaristaError;
use barista_core::query::{Clause, OrderBy, QuerySpec, COFFEE_FAMILIES, FOOD_MARKERS};
use barista_core::types::{ArtItem, CaffeineLevel, CatalogItem, SubCategory, Workshop};

use crate::db::Database;

/// Storage format for workshop start times.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A menu item to insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub caffeine_level: CaffeineLevel,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A gallery piece to insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewArtItem {
    pub title: String,
    pub artist: String,
    pub price: f64,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// A workshop to insert.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWorkshop {
    pub title: String,
    /// Start time in `YYYY-MM-DD HH:MM:SS`.
    pub starts_at: String,
    pub seats: i64,
    #[serde(default)]
    pub booked: i64,
    pub price: f64,
}

/// Catalog repository backed by SQLite.
pub struct CatalogRepository {
    db: Arc<Database>,
}

impl CatalogRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    /// List menu items matching `spec`, ordered and limited as it says.
    pub fn list_menu_items(&self, spec: &QuerySpec) -> Result<Vec<CatalogItem>, BaristaError> {
        let (sql, params_vec) = build_menu_sql(spec);

        self.db.with_conn(|conn| {
            let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| BaristaError::Storage(format!("Menu query prepare: {}", e)))?;

            let rows = stmt
                .query_map(params_refs.as_slice(), |row| {
                    let id: i64 = row.get(0)?;
                    let name: String = row.get(1)?;
                    let category: String = row.get(2)?;
                    let price: f64 = row.get(3)?;
                    let caffeine: String = row.get(4)?;
                    let tags: String = row.get(5)?;
                    Ok((id, name, category, price, caffeine, tags))
                })
                .map_err(|e| BaristaError::Storage(format!("Menu query: {}", e)))?;

            let mut results = Vec::new();
            for row in rows {
                let (id, name, category, price, caffeine, tags) =
                    row.map_err(|e| BaristaError::Storage(e.to_string()))?;
                results.push(CatalogItem {
                    id,
                    name,
                    category,
                    price,
                    caffeine_level: caffeine.parse()?,
                    tags: serde_json::from_str(&tags)?,
                });
            }
            Ok(results)
        })
    }

    /// List gallery pieces, optionally only those still for sale.
    pub fn list_art_items(&self, available_only: bool) -> Result<Vec<ArtItem>, BaristaError> {
        let sql = if available_only {
            "SELECT id, title, artist, price, available FROM art_items
             WHERE available = 1 ORDER BY id"
        } else {
            "SELECT id, title, artist, price, available FROM art_items ORDER BY id"
        };

        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(sql)
                .map_err(|e| BaristaError::Storage(format!("Art query prepare: {}", e)))?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ArtItem {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        artist: row.get(2)?,
                        price: row.get(3)?,
                        available: row.get::<_, i64>(4)? != 0,
                    })
                })
                .map_err(|e| BaristaError::Storage(format!("Art query: {}", e)))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| BaristaError::Storage(e.to_string()))
        })
    }

    /// List every workshop, sold out ones included, in insertion order.
    pub fn list_workshops(&self) -> Result<Vec<Workshop>, BaristaError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, starts_at, seats, booked, price
                     FROM workshops ORDER BY id",
                )
                .map_err(|e| BaristaError::Storage(format!("Workshop query prepare: {}", e)))?;
            let rows = stmt
                .query_map([], |row| {
                    let id: i64 = row.get(0)?;
                    let title: String = row.get(1)?;
                    let starts_at: String = row.get(2)?;
                    let seats: i64 = row.get(3)?;
                    let booked: i64 = row.get(4)?;
                    let price: f64 = row.get(5)?;
                    Ok((id, title, starts_at, seats, booked, price))
                })
                .map_err(|e| BaristaError::Storage(format!("Workshop query: {}", e)))?;

            let mut results = Vec::new();
            for row in rows {
                let (id, title, starts_at, seats, booked, price) =
                    row.map_err(|e| BaristaError::Storage(e.to_string()))?;
                let datetime = NaiveDateTime::parse_from_str(&starts_at, DATETIME_FORMAT)
                    .map_err(|e| {
                        BaristaError::Storage(format!("Invalid workshop start '{}': {}", starts_at, e))
                    })?;
                results.push(Workshop {
                    id,
                    title,
                    datetime,
                    seats,
                    booked,
                    price,
                });
            }
            Ok(results)
        })
    }

    /// Count rows in each catalog table: (menu, art, workshops).
    pub fn counts(&self) -> Result<(u64, u64, u64), BaristaError> {
        self.db.with_conn(|conn| {
            let count = |table: &str| -> Result<u64, BaristaError> {
                let n: i64 = conn
                    .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                        row.get(0)
                    })
                    .map_err(|e| BaristaError::Storage(format!("Count {}: {}", table, e)))?;
                Ok(n as u64)
            };
            Ok((count("menu_items")?, count("art_items")?, count("workshops")?))
        })
    }

    // -----------------------------------------------------------------
    // Writes (seeding and tests)
    // -----------------------------------------------------------------

    pub fn insert_menu_item(&self, item: &NewMenuItem) -> Result<i64, BaristaError> {
        let tags: Vec<String> = item.tags.iter().map(|t| t.trim().to_lowercase()).collect();
        let tags_json = serde_json::to_string(&tags)?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO menu_items (name, category, price, caffeine_level, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    item.name,
                    item.category,
                    item.price,
                    item.caffeine_level.as_str(),
                    tags_json
                ],
            )
            .map_err(|e| BaristaError::Storage(format!("Insert menu item: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn insert_art_item(&self, item: &NewArtItem) -> Result<i64, BaristaError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO art_items (title, artist, price, available) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![item.title, item.artist, item.price, item.available],
            )
            .map_err(|e| BaristaError::Storage(format!("Insert art item: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn insert_workshop(&self, workshop: &NewWorkshop) -> Result<i64, BaristaError> {
        NaiveDateTime::parse_from_str(&workshop.starts_at, DATETIME_FORMAT).map_err(|e| {
            BaristaError::Storage(format!(
                "Invalid workshop start '{}': {}",
                workshop.starts_at, e
            ))
        })?;
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO workshops (title, starts_at, seats, booked, price)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    workshop.title,
                    workshop.starts_at,
                    workshop.seats,
                    workshop.booked,
                    workshop.price
                ],
            )
            .map_err(|e| BaristaError::Storage(format!("Insert workshop: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }
}

// =============================================================================
// QuerySpec -> SQL
// =============================================================================

type SqlParams = Vec<Box<dyn ToSql>>;

/// Build the SELECT statement and its positional parameters for `spec`.
pub fn build_menu_sql(spec: &QuerySpec) -> (String, SqlParams) {
    let mut params: SqlParams = Vec::new();
    let mut sql = String::from(
        "SELECT m.id, m.name, m.category, m.price, m.caffeine_level, m.tags
         FROM menu_items m",
    );

    let predicates: Vec<String> = spec
        .clauses
        .iter()
        .map(|c| clause_sql(c, &mut params))
        .collect();
    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }

    sql.push_str(match spec.order_by {
        OrderBy::Random => " ORDER BY RANDOM()",
        OrderBy::PriceAsc => " ORDER BY m.price ASC, m.id ASC",
        OrderBy::PriceDesc => " ORDER BY m.price DESC, m.id ASC",
    });

    sql.push_str(" LIMIT ?");
    params.push(Box::new(spec.limit as i64));

    (sql, params)
}

fn clause_sql(clause: &Clause, params: &mut SqlParams) -> String {
    match clause {
        Clause::CaffeineIn(levels) => {
            if levels.is_empty() {
                return "0".to_string();
            }
            for level in levels {
                params.push(Box::new(level.as_str()));
            }
            format!("m.caffeine_level IN ({})", placeholders(levels.len()))
        }
        Clause::Food => format!(
            "({} OR {})",
            category_like_any(FOOD_MARKERS, params),
            tag_in(FOOD_MARKERS, params)
        ),
        Clause::NotFood => format!("NOT {}", category_like_any(FOOD_MARKERS, params)),
        Clause::SubCategory(SubCategory::Coffee) => format!(
            "({} OR {})",
            category_like_any(COFFEE_FAMILIES, params),
            tag_in(&["coffee"], params)
        ),
        Clause::SubCategory(SubCategory::Tea) => format!(
            "({} OR {})",
            category_like_any(&["tea"], params),
            tag_in(&["tea"], params)
        ),
        Clause::SubCategory(SubCategory::Shake) => format!(
            "({} OR {})",
            category_like_any(&["shake"], params),
            tag_in(&["milk"], params)
        ),
        Clause::AnyTag(tags) => {
            if tags.is_empty() {
                return "0".to_string();
            }
            let refs: Vec<&str> = tags.iter().map(String::as_str).collect();
            tag_in(&refs, params)
        }
    }
}

fn category_like_any(needles: &[&str], params: &mut SqlParams) -> String {
    let parts: Vec<&str> = needles
        .iter()
        .map(|n| {
            params.push(Box::new(format!("%{}%", n.to_lowercase())));
            "LOWER(m.category) LIKE ?"
        })
        .collect();
    format!("({})", parts.join(" OR "))
}

fn tag_in(tags: &[&str], params: &mut SqlParams) -> String {
    for tag in tags {
        params.push(Box::new(tag.to_lowercase()));
    }
    format!(
        "EXISTS (SELECT 1 FROM json_each(m.tags) WHERE LOWER(json_each.value) IN ({}))",
        placeholders(tags.len())
    )
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
