//! Canned question/answer knowledge base with FTS5 search.
//!
//! Free text is reduced to its content words and matched with prefix terms
//! against the `knowledge_fts` index, ranked by BM25. The index is external
//! content and must be rebuilt after entries change; until the first rebuild
//! searches report that the index is unavailable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::info;

use barista_core::error::BaristaError;

use crate::db::Database;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("Invalid word regex"));

static STOP_WORDS: &[&str] = &[
    "the", "and", "are", "you", "your", "for", "with", "what", "when", "where", "which",
    "who", "how", "can", "could", "would", "should", "does", "did", "have", "has", "this",
    "that", "there", "about", "any", "some", "please", "tell", "give", "from", "into", "our",
    "its", "was", "were", "will", "not", "but", "all", "just", "get",
];

/// A ranked knowledge-base hit.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeMatch {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// Negated BM25 rank; higher is more relevant.
    pub score: f64,
}

/// Build an FTS5 query from free text: `"word"* OR "word"* ...`.
///
/// Returns `None` when the text has no searchable words.
pub fn build_fts_query(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let mut terms: Vec<String> = Vec::new();
    for m in WORD_RE.find_iter(&lowered) {
        let word = m.as_str();
        if word.chars().count() < 3 || STOP_WORDS.contains(&word) {
            continue;
        }
        let term = format!("\"{}\"*", word);
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

/// Knowledge base repository and search index.
pub struct KnowledgeIndex {
    db: Arc<Database>,
    ready: AtomicBool,
}

impl KnowledgeIndex {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            ready: AtomicBool::new(false),
        }
    }

    /// Whether the index has been built since this handle was created.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Add an entry. It becomes searchable after the next [`rebuild`](Self::rebuild).
    pub fn insert_entry(&self, question: &str, answer: &str) -> Result<i64, BaristaError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO knowledge_entries (question, answer) VALUES (?1, ?2)",
                rusqlite::params![question, answer],
            )
            .map_err(|e| BaristaError::Storage(format!("Insert knowledge entry: {}", e)))?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Rebuild the FTS index from `knowledge_entries` and mark it ready.
    ///
    /// Returns the number of indexed entries.
    pub fn rebuild(&self) -> Result<u64, BaristaError> {
        self.ready.store(false, Ordering::Release);
        let count = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO knowledge_fts(knowledge_fts) VALUES ('rebuild')",
                [],
            )
            .map_err(|e| BaristaError::Search(format!("Knowledge index rebuild failed: {}", e)))?;
            let n: i64 = conn
                .query_row("SELECT COUNT(*) FROM knowledge_entries", [], |row| row.get(0))
                .map_err(|e| BaristaError::Storage(e.to_string()))?;
            Ok(n as u64)
        })?;
        self.ready.store(true, Ordering::Release);
        info!(entries = count, "Knowledge index rebuilt");
        Ok(count)
    }

    /// Search the knowledge base with free text, best match first.
    pub fn search(&self, text: &str, limit: u64) -> Result<Vec<KnowledgeMatch>, BaristaError> {
        if !self.is_ready() {
            return Err(BaristaError::Search("knowledge index not ready".to_string()));
        }
        let Some(fts_query) = build_fts_query(text) else {
            return Ok(Vec::new());
        };

        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT e.id, e.question, e.answer, bm25(knowledge_fts, 2.0, 1.0) AS score
                     FROM knowledge_fts
                     JOIN knowledge_entries e ON e.id = knowledge_fts.rowid
                     WHERE knowledge_fts MATCH ?1
                     ORDER BY score
                     LIMIT ?2",
                )
                .map_err(|e| BaristaError::Search(format!("Knowledge query prepare: {}", e)))?;

            let rows = stmt
                .query_map(rusqlite::params![fts_query, limit as i64], |row| {
                    let score: f64 = row.get(3)?;
                    Ok(KnowledgeMatch {
                        id: row.get(0)?,
                        question: row.get(1)?,
                        answer: row.get(2)?,
                        // BM25 is lower-is-better; negate so higher is better.
                        score: -score,
                    })
                })
                .map_err(|e| BaristaError::Search(format!("Knowledge query: {}", e)))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| BaristaError::Search(e.to_string()))
        })
    }
}
