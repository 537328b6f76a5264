//! Comedian reviews
//!
//! Leaving a review and listing a comedian's reviews. Validation happens
//! here; persistence is delegated to the storage layer.

use std::sync::Arc;
use thiserror::Error;

use storage::{NewReview, ReviewRecord, SqliteReviewStore, StorageReadError, StorageWriteError};

/// Longest review body accepted, in characters.
pub const MAX_BODY_CHARS: usize = 2000;

/// Review error types
#[derive(Debug, Error)]
pub enum ReviewError {
    /// The rating was outside the 1-5 star range
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// The review body was empty
    #[error("review body must not be empty")]
    EmptyBody,

    /// The review body exceeded the length bound
    #[error("review body must be at most {MAX_BODY_CHARS} characters, got {0}")]
    BodyTooLong(usize),

    /// Loading from storage failed
    #[error(transparent)]
    Read(#[from] StorageReadError),

    /// Writing to storage failed
    #[error(transparent)]
    Write(#[from] StorageWriteError),
}

/// Result type for review operations
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Review service for leaving and browsing reviews
pub struct ReviewService {
    store: Arc<SqliteReviewStore>,
}

impl ReviewService {
    /// Create a new review service
    pub fn new(store: Arc<SqliteReviewStore>) -> Self {
        ReviewService { store }
    }

    /// Leave a review, returning its id
    ///
    /// The rating must be 1-5 stars and the body non-empty and within
    /// [`MAX_BODY_CHARS`]. The comedian name is taken as given; reviews for
    /// names not present in the catalog are allowed.
    pub async fn leave(&self, review: NewReview) -> Result<i64> {
        if !(1..=5).contains(&review.rating) {
            return Err(ReviewError::InvalidRating(review.rating));
        }
        if review.body.is_empty() {
            return Err(ReviewError::EmptyBody);
        }
        let chars = review.body.chars().count();
        if chars > MAX_BODY_CHARS {
            return Err(ReviewError::BodyTooLong(chars));
        }

        let id = self.store.insert(&review).await?;
        tracing::debug!(comedian = %review.comedian, rating = review.rating, "review stored");

        Ok(id)
    }

    /// List a comedian's reviews, newest first
    pub async fn list_for(&self, comedian: &str) -> Result<Vec<ReviewRecord>> {
        Ok(self.store.fetch_for(comedian).await?)
    }
}
