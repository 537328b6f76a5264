//! Comedian catalog
//!
//! This module provides browsing-facing access to comedian profiles:
//! adding a profile, listing the catalog, and looking one up by name.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use storage::{ComedianRecord, SqliteComedianStore, StorageReadError, StorageWriteError};

/// Catalog error types
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The profile name was empty
    #[error("comedian name must not be empty")]
    EmptyName,

    /// No profile with that name exists
    #[error("comedian not found: {0}")]
    NotFound(String),

    /// Loading from storage failed
    #[error(transparent)]
    Read(#[from] StorageReadError),

    /// Writing to storage failed
    #[error(transparent)]
    Write(#[from] StorageWriteError),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Parameters for adding a comedian to the catalog
#[derive(Debug, Clone, Default)]
pub struct NewComedian {
    /// Display name; also the key the follow registry uses
    pub name: String,
    /// Short biography
    pub bio: Option<String>,
    /// Hometown
    pub hometown: Option<String>,
    /// Avatar image URL
    pub avatar_url: Option<String>,
}

/// Catalog service for browsing comedian profiles
pub struct CatalogService {
    store: Arc<SqliteComedianStore>,
}

impl CatalogService {
    /// Create a new catalog service
    pub fn new(store: Arc<SqliteComedianStore>) -> Self {
        CatalogService { store }
    }

    /// Add a comedian, or refresh the profile fields of an existing one
    ///
    /// The name must be non-empty; it is stored exactly as given, with no
    /// trimming or case folding, because it doubles as the follow key.
    pub async fn add(&self, comedian: NewComedian) -> Result<ComedianRecord> {
        if comedian.name.is_empty() {
            return Err(CatalogError::EmptyName);
        }

        let record = ComedianRecord {
            name: comedian.name,
            bio: comedian.bio,
            hometown: comedian.hometown,
            avatar_url: comedian.avatar_url,
            created_at: Utc::now(),
        };
        self.store.upsert(&record).await?;
        tracing::debug!(name = %record.name, "comedian profile stored");

        Ok(record)
    }

    /// List every comedian in the catalog, ordered by name
    pub async fn list(&self) -> Result<Vec<ComedianRecord>> {
        Ok(self.store.fetch_all().await?)
    }

    /// Look up a comedian by exact name
    pub async fn get(&self, name: &str) -> Result<ComedianRecord> {
        self.store
            .get(name)
            .await?
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }
}
