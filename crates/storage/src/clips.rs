//! Durable clip metadata
//!
//! Video clips attached to a comedian are stored as metadata rows only;
//! nothing in this layer opens, plays, or uploads the referenced media.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::database::SqliteDatabase;
use crate::error::{decode_timestamp, StorageReadError, StorageWriteError};

/// SQL creating the clips table.
pub const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS clips (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    comedian TEXT NOT NULL,
    title TEXT NOT NULL,
    uri TEXT NOT NULL,
    duration_secs INTEGER,
    created_at TEXT NOT NULL
)";

/// Parameters for attaching a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClip {
    /// Name of the comedian the clip belongs to
    pub comedian: String,
    /// Clip title
    pub title: String,
    /// Location of the media (local path or remote URL; never dereferenced here)
    pub uri: String,
    /// Duration in seconds, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
}

/// A stored clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipRecord {
    /// Row id
    pub id: i64,
    /// Name of the comedian the clip belongs to
    pub comedian: String,
    /// Clip title
    pub title: String,
    /// Location of the media
    pub uri: String,
    /// Duration in seconds, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    /// When the clip was attached
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed clip store
pub struct SqliteClipStore {
    pool: SqlitePool,
}

impl SqliteClipStore {
    /// Create a store over an open database
    pub fn new(db: &SqliteDatabase) -> Self {
        SqliteClipStore { pool: db.pool().clone() }
    }

    /// Store clip metadata, returning its row id
    pub async fn insert(&self, clip: &NewClip) -> Result<i64, StorageWriteError> {
        let result = sqlx::query(
            "INSERT INTO clips (comedian, title, uri, duration_secs, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&clip.comedian)
        .bind(&clip.title)
        .bind(&clip.uri)
        .bind(clip.duration_secs.map(i64::from))
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch a comedian's clips, oldest first
    pub async fn fetch_for(&self, comedian: &str) -> Result<Vec<ClipRecord>, StorageReadError> {
        let rows = sqlx::query(
            "SELECT id, comedian, title, uri, duration_secs, created_at FROM clips
             WHERE comedian = ? ORDER BY id",
        )
        .bind(comedian)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<ClipRecord, StorageReadError> {
                let duration: Option<i64> = row.try_get("duration_secs")?;
                let duration_secs = duration
                    .map(|d| {
                        u32::try_from(d).map_err(|_| StorageReadError::Decode {
                            column: "duration_secs",
                            message: format!("{d} is out of range"),
                        })
                    })
                    .transpose()?;
                let raw: String = row.try_get("created_at")?;
                Ok(ClipRecord {
                    id: row.try_get("id")?,
                    comedian: row.try_get("comedian")?,
                    title: row.try_get("title")?,
                    uri: row.try_get("uri")?,
                    duration_secs,
                    created_at: decode_timestamp("created_at", &raw)?,
                })
            })
            .collect()
    }

    /// Delete a clip by row id; zero matches is success
    pub async fn delete(&self, id: i64) -> Result<(), StorageWriteError> {
        sqlx::query("DELETE FROM clips WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
