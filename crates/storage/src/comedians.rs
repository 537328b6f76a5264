//! Durable comedian profiles
//!
//! The browsable catalog's durable side: one row per comedian, keyed by
//! name like the follows table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::database::SqliteDatabase;
use crate::error::{decode_timestamp, StorageReadError, StorageWriteError};

/// SQL creating the comedians table.
pub const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS comedians (
    name TEXT PRIMARY KEY,
    bio TEXT,
    hometown TEXT,
    avatar_url TEXT,
    created_at TEXT NOT NULL
)";

/// A comedian profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComedianRecord {
    /// Display name (natural key, shared with the follows table)
    pub name: String,

    /// Short biography
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    /// Hometown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hometown: Option<String>,

    /// Avatar image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// When the profile was first stored
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed comedian store
pub struct SqliteComedianStore {
    pool: SqlitePool,
}

impl SqliteComedianStore {
    /// Create a store over an open database
    pub fn new(db: &SqliteDatabase) -> Self {
        SqliteComedianStore { pool: db.pool().clone() }
    }

    /// Insert a profile, replacing the mutable fields if the name exists
    pub async fn upsert(&self, record: &ComedianRecord) -> Result<(), StorageWriteError> {
        sqlx::query(
            "INSERT INTO comedians (name, bio, hometown, avatar_url, created_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET
                 bio = excluded.bio,
                 hometown = excluded.hometown,
                 avatar_url = excluded.avatar_url",
        )
        .bind(&record.name)
        .bind(&record.bio)
        .bind(&record.hometown)
        .bind(&record.avatar_url)
        .bind(record.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch every profile, ordered by name
    pub async fn fetch_all(&self) -> Result<Vec<ComedianRecord>, StorageReadError> {
        let rows = sqlx::query(
            "SELECT name, bio, hometown, avatar_url, created_at FROM comedians ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(from_row).collect()
    }

    /// Look up a single profile by exact name
    pub async fn get(&self, name: &str) -> Result<Option<ComedianRecord>, StorageReadError> {
        let row = sqlx::query(
            "SELECT name, bio, hometown, avatar_url, created_at FROM comedians WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(from_row).transpose()
    }
}

fn from_row(row: sqlx::sqlite::SqliteRow) -> Result<ComedianRecord, StorageReadError> {
    let raw: String = row.try_get("created_at")?;
    Ok(ComedianRecord {
        name: row.try_get("name")?,
        bio: row.try_get("bio")?,
        hometown: row.try_get("hometown")?,
        avatar_url: row.try_get("avatar_url")?,
        created_at: decode_timestamp("created_at", &raw)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_profile(name: &str) -> ComedianRecord {
        ComedianRecord {
            name: name.to_string(),
            bio: Some(format!("{name} has been on the circuit for a decade.")),
            hometown: Some("Chicago".to_string()),
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    async fn open_store() -> SqliteComedianStore {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.migrate(&crate::migrations()).await.unwrap();
        SqliteComedianStore::new(&db)
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = open_store().await;
        let profile = make_profile("Amy Park");

        store.upsert(&profile).await.unwrap();

        let fetched = store.get("Amy Park").await.unwrap().unwrap();
        assert_eq!(fetched, profile);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let store = open_store().await;
        assert!(store.get("Amy Park").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_profile_fields() {
        let store = open_store().await;

        let mut profile = make_profile("Amy Park");
        store.upsert(&profile).await.unwrap();

        profile.bio = Some("New bio".to_string());
        store.upsert(&profile).await.unwrap();

        let all = store.fetch_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].bio.as_deref(), Some("New bio"));
    }

    #[tokio::test]
    async fn test_fetch_all_is_name_ordered() {
        let store = open_store().await;

        store.upsert(&make_profile("Dev Okafor")).await.unwrap();
        store.upsert(&make_profile("Amy Park")).await.unwrap();

        let names: Vec<String> =
            store.fetch_all().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Amy Park", "Dev Okafor"]);
    }
}
