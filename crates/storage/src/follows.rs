//! Durable follow relationships
//!
//! This module defines the follow record, the store contract the follow
//! registry synchronizes against, and the SQLite implementation of that
//! contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::database::SqliteDatabase;
use crate::error::{decode_timestamp, StorageReadError, StorageWriteError};

/// SQL creating the follows table.
///
/// `comedian` is the natural key; the UNIQUE constraint keeps the table
/// duplicate-free even if two writers race. The autoincrement id is
/// bookkeeping only and is never surfaced.
pub const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS follows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    comedian TEXT NOT NULL UNIQUE,
    followed_at TEXT NOT NULL
)";

/// A durable follow relationship
///
/// Follows are keyed by the comedian's display name, and callers must pass a
/// stable canonical name: equality is exact (case-sensitive, untrimmed), so a
/// renamed or duplicated stage name silently merges or orphans follow state.
/// The empty string is a legal, tracked name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRecord {
    /// Name of the followed comedian (natural key)
    pub comedian: String,

    /// When the follow was created; never mutated afterwards
    pub followed_at: DateTime<Utc>,
}

impl FollowRecord {
    /// Create a record stamped with the current time
    pub fn new(comedian: impl Into<String>) -> Self {
        FollowRecord { comedian: comedian.into(), followed_at: Utc::now() }
    }
}

/// Contract between the follow registry and durable storage
///
/// All operations are durable on success: a committed insert or delete
/// survives process restart.
#[async_trait]
pub trait FollowStore: Send + Sync {
    /// Fetch every follow record currently stored
    async fn fetch_all(&self) -> Result<Vec<FollowRecord>, StorageReadError>;

    /// Persist a new follow record
    async fn insert(&self, record: FollowRecord) -> Result<(), StorageWriteError>;

    /// Delete any records for the given comedian; zero matches is success
    async fn delete_where(&self, comedian: &str) -> Result<(), StorageWriteError>;
}

/// SQLite-backed follow store
pub struct SqliteFollowStore {
    pool: SqlitePool,
}

impl SqliteFollowStore {
    /// Create a store over an open database
    pub fn new(db: &SqliteDatabase) -> Self {
        SqliteFollowStore { pool: db.pool().clone() }
    }
}

#[async_trait]
impl FollowStore for SqliteFollowStore {
    async fn fetch_all(&self) -> Result<Vec<FollowRecord>, StorageReadError> {
        let rows = sqlx::query("SELECT comedian, followed_at FROM follows ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| -> Result<FollowRecord, StorageReadError> {
                let raw: String = row.try_get("followed_at")?;
                Ok(FollowRecord {
                    comedian: row.try_get("comedian")?,
                    followed_at: decode_timestamp("followed_at", &raw)?,
                })
            })
            .collect()
    }

    async fn insert(&self, record: FollowRecord) -> Result<(), StorageWriteError> {
        sqlx::query(
            "INSERT INTO follows (comedian, followed_at) VALUES (?, ?)
             ON CONFLICT(comedian) DO NOTHING",
        )
        .bind(&record.comedian)
        .bind(record.followed_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_where(&self, comedian: &str) -> Result<(), StorageWriteError> {
        sqlx::query("DELETE FROM follows WHERE comedian = ?")
            .bind(comedian)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_store() -> SqliteFollowStore {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.migrate(&crate::migrations()).await.unwrap();
        SqliteFollowStore::new(&db)
    }

    #[tokio::test]
    async fn test_insert_and_fetch_round_trip() {
        let store = open_store().await;

        store.insert(FollowRecord::new("Amy Park")).await.unwrap();
        store.insert(FollowRecord::new("Dev Okafor")).await.unwrap();

        let records = store.fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].comedian, "Amy Park");
        assert_eq!(records[1].comedian, "Dev Okafor");
    }

    #[tokio::test]
    async fn test_duplicate_insert_keeps_one_record() {
        let store = open_store().await;

        let first = FollowRecord::new("Amy Park");
        let original_timestamp = first.followed_at;
        store.insert(first).await.unwrap();
        store.insert(FollowRecord::new("Amy Park")).await.unwrap();

        let records = store.fetch_all().await.unwrap();
        assert_eq!(records.len(), 1);
        // The original row wins the conflict
        assert_eq!(records[0].followed_at, original_timestamp);
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = open_store().await;

        store.insert(FollowRecord::new("Amy Park")).await.unwrap();
        store.delete_where("Amy Park").await.unwrap();

        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_with_no_matches_is_success() {
        let store = open_store().await;
        store.delete_where("Nobody In Particular").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_name_is_a_legal_key() {
        let store = open_store().await;

        store.insert(FollowRecord::new("")).await.unwrap();

        let records = store.fetch_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].comedian, "");

        store.delete_where("").await.unwrap();
        assert!(store.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_names_are_case_sensitive() {
        let store = open_store().await;

        store.insert(FollowRecord::new("amy park")).await.unwrap();
        store.insert(FollowRecord::new("Amy Park")).await.unwrap();

        assert_eq!(store.fetch_all().await.unwrap().len(), 2);

        store.delete_where("AMY PARK").await.unwrap();
        assert_eq!(store.fetch_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_timestamps_survive_round_trip() {
        let store = open_store().await;

        let record = FollowRecord::new("Amy Park");
        store.insert(record.clone()).await.unwrap();

        let fetched = store.fetch_all().await.unwrap();
        assert_eq!(fetched[0], record);
    }
}
