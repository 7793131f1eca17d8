//! Append-only fact repository used as conversational memory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DbPool;
use crate::{Error, Result};

/// Column list for all fact SELECT queries
const FACT_COLUMNS: &str = "id, subject_id, content, created_at";

/// A fact stored in the database
///
/// A short free-text sentence believed true about the user. Facts have no
/// versioning: they are created once, read on every request, and never
/// updated or deleted for the lifetime of the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub id: String,
    /// Optional subject scope. `None` means the fact is globally shared.
    pub subject_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Fact {
    /// Create a new fact
    #[must_use]
    pub fn new(subject_id: Option<String>, content: String) -> Self {
        Self {
            id: format!("fact_{}", Uuid::new_v4()),
            subject_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Map a database row to a `Fact`
fn row_to_fact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Fact> {
    let created_at: String = row.get(3)?;
    Ok(Fact {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        content: row.get(2)?,
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
    })
}

/// Fact repository for database operations
///
/// The repository is append-only: callers can insert and snapshot, nothing
/// else. Retrieval takes a full snapshot per request and never mutates.
#[derive(Debug, Clone)]
pub struct FactRepo {
    pool: DbPool,
}

impl FactRepo {
    /// Create a new fact repository
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new fact
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn insert(&self, fact: &Fact) -> Result<()> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO facts (id, subject_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                fact.id,
                fact.subject_id,
                fact.content,
                fact.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    /// Snapshot all facts for a subject, in insertion order
    ///
    /// `None` returns the globally shared (NULL-subject) facts.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list(&self, subject_id: Option<&str>) -> Result<Vec<Fact>> {
        let conn = self.pool.get().map_err(|e| Error::Database(e.to_string()))?;

        let facts = if let Some(subject) = subject_id {
            let sql = format!(
                "SELECT {FACT_COLUMNS} FROM facts WHERE subject_id = ?1 ORDER BY rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([subject], row_to_fact)?;
            rows.flatten().collect()
        } else {
            let sql =
                format!("SELECT {FACT_COLUMNS} FROM facts WHERE subject_id IS NULL ORDER BY rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_fact)?;
            rows.flatten().collect()
        };

        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_insert_and_list_preserves_order() {
        let pool = db::init_memory().unwrap();
        let repo = FactRepo::new(pool);

        repo.insert(&Fact::new(None, "The user's name is alice.".to_string()))
            .unwrap();
        repo.insert(&Fact::new(None, "The user likes hiking.".to_string()))
            .unwrap();

        let facts = repo.list(None).unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0].content, "The user's name is alice.");
        assert_eq!(facts[1].content, "The user likes hiking.");
    }

    #[test]
    fn test_list_scopes_by_subject() {
        let pool = db::init_memory().unwrap();
        let repo = FactRepo::new(pool);

        repo.insert(&Fact::new(None, "global fact".to_string()))
            .unwrap();
        repo.insert(&Fact::new(
            Some("user-1".to_string()),
            "scoped fact".to_string(),
        ))
        .unwrap();

        let global = repo.list(None).unwrap();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].content, "global fact");

        let scoped = repo.list(Some("user-1")).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].content, "scoped fact");

        assert!(repo.list(Some("user-2")).unwrap().is_empty());
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let pool = db::init_memory().unwrap();
        let repo = FactRepo::new(pool);
        assert!(repo.list(None).unwrap().is_empty());
    }
}
