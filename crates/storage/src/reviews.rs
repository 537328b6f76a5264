//! Durable reviews

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};

use crate::database::SqliteDatabase;
use crate::error::{decode_timestamp, StorageReadError, StorageWriteError};

/// SQL creating the reviews table.
pub const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    comedian TEXT NOT NULL,
    rating INTEGER NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL
)";

/// Parameters for storing a review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// Name of the reviewed comedian
    pub comedian: String,
    /// Star rating, 1-5
    pub rating: u8,
    /// Review text
    pub body: String,
}

/// A stored review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// Row id
    pub id: i64,
    /// Name of the reviewed comedian
    pub comedian: String,
    /// Star rating, 1-5
    pub rating: u8,
    /// Review text
    pub body: String,
    /// When the review was stored
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed review store
pub struct SqliteReviewStore {
    pool: SqlitePool,
}

impl SqliteReviewStore {
    /// Create a store over an open database
    pub fn new(db: &SqliteDatabase) -> Self {
        SqliteReviewStore { pool: db.pool().clone() }
    }

    /// Store a review, returning its row id
    pub async fn insert(&self, review: &NewReview) -> Result<i64, StorageWriteError> {
        let result = sqlx::query(
            "INSERT INTO reviews (comedian, rating, body, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&review.comedian)
        .bind(i64::from(review.rating))
        .bind(&review.body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch a comedian's reviews, newest first
    pub async fn fetch_for(&self, comedian: &str) -> Result<Vec<ReviewRecord>, StorageReadError> {
        let rows = sqlx::query(
            "SELECT id, comedian, rating, body, created_at FROM reviews
             WHERE comedian = ? ORDER BY id DESC",
        )
        .bind(comedian)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<ReviewRecord, StorageReadError> {
                let rating: i64 = row.try_get("rating")?;
                let rating = u8::try_from(rating).map_err(|_| StorageReadError::Decode {
                    column: "rating",
                    message: format!("{rating} is out of range"),
                })?;
                let raw: String = row.try_get("created_at")?;
                Ok(ReviewRecord {
                    id: row.try_get("id")?,
                    comedian: row.try_get("comedian")?,
                    rating,
                    body: row.try_get("body")?,
                    created_at: decode_timestamp("created_at", &raw)?,
                })
            })
            .collect()
    }

    /// Delete a review by row id; zero matches is success
    pub async fn delete(&self, id: i64) -> Result<(), StorageWriteError> {
        sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_review(comedian: &str, rating: u8, body: &str) -> NewReview {
        NewReview { comedian: comedian.to_string(), rating, body: body.to_string() }
    }

    async fn open_store() -> SqliteReviewStore {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.migrate(&crate::migrations()).await.unwrap();
        SqliteReviewStore::new(&db)
    }

    #[tokio::test]
    async fn test_insert_and_fetch_for() {
        let store = open_store().await;

        let id = store.insert(&make_review("Amy Park", 5, "Killed it.")).await.unwrap();

        let reviews = store.fetch_for("Amy Park").await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].id, id);
        assert_eq!(reviews[0].rating, 5);
        assert_eq!(reviews[0].body, "Killed it.");
    }

    #[tokio::test]
    async fn test_fetch_for_is_newest_first() {
        let store = open_store().await;

        store.insert(&make_review("Amy Park", 3, "Fine set")).await.unwrap();
        store.insert(&make_review("Amy Park", 5, "Much better tonight")).await.unwrap();
        store.insert(&make_review("Dev Okafor", 4, "Solid crowd work")).await.unwrap();

        let reviews = store.fetch_for("Amy Park").await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].body, "Much better tonight");
        assert_eq!(reviews[1].body, "Fine set");
    }

    #[tokio::test]
    async fn test_delete_review() {
        let store = open_store().await;

        let id = store.insert(&make_review("Amy Park", 2, "Off night")).await.unwrap();
        store.delete(id).await.unwrap();

        assert!(store.fetch_for("Amy Park").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_review_is_success() {
        let store = open_store().await;
        store.delete(9999).await.unwrap();
    }
}
