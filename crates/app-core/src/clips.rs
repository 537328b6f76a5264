//! Attached clip metadata
//!
//! Attaching, listing, and removing the clip metadata shown on a comedian's
//! profile. Only the metadata passes through here; the referenced media is
//! never opened, played, or uploaded by this layer.

use std::sync::Arc;
use thiserror::Error;

use storage::{ClipRecord, NewClip, SqliteClipStore, StorageReadError, StorageWriteError};

/// Clip error types
#[derive(Debug, Error)]
pub enum ClipError {
    /// The clip title was empty
    #[error("clip title must not be empty")]
    EmptyTitle,

    /// The clip uri was empty
    #[error("clip uri must not be empty")]
    EmptyUri,

    /// Loading from storage failed
    #[error(transparent)]
    Read(#[from] StorageReadError),

    /// Writing to storage failed
    #[error(transparent)]
    Write(#[from] StorageWriteError),
}

/// Result type for clip operations
pub type Result<T> = std::result::Result<T, ClipError>;

/// Clip service for managing attached clip metadata
pub struct ClipService {
    store: Arc<SqliteClipStore>,
}

impl ClipService {
    /// Create a new clip service
    pub fn new(store: Arc<SqliteClipStore>) -> Self {
        ClipService { store }
    }

    /// Attach a clip, returning its id
    ///
    /// The title and uri must be non-empty. The uri is stored as given and
    /// never dereferenced.
    pub async fn attach(&self, clip: NewClip) -> Result<i64> {
        if clip.title.is_empty() {
            return Err(ClipError::EmptyTitle);
        }
        if clip.uri.is_empty() {
            return Err(ClipError::EmptyUri);
        }

        let id = self.store.insert(&clip).await?;
        tracing::debug!(comedian = %clip.comedian, title = %clip.title, "clip attached");

        Ok(id)
    }

    /// List a comedian's clips, oldest first
    pub async fn list_for(&self, comedian: &str) -> Result<Vec<ClipRecord>> {
        Ok(self.store.fetch_for(comedian).await?)
    }

    /// Remove a clip by id; removing an id with no record is a no-op
    pub async fn remove(&self, id: i64) -> Result<()> {
        self.store.delete(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::SqliteDatabase;

    fn make_clip(title: &str, uri: &str) -> NewClip {
        NewClip {
            comedian: "Amy Park".to_string(),
            title: title.to_string(),
            uri: uri.to_string(),
            duration_secs: Some(240),
        }
    }

    async fn open_service() -> ClipService {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.migrate(&storage::migrations()).await.unwrap();
        ClipService::new(Arc::new(SqliteClipStore::new(&db)))
    }

    #[tokio::test]
    async fn test_attach_and_list() {
        let service = open_service().await;

        let id = service
            .attach(make_clip("Closer at the Cellar", "file:///clips/closer.mp4"))
            .await
            .unwrap();

        let clips = service.list_for("Amy Park").await.unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].id, id);
        assert_eq!(clips[0].title, "Closer at the Cellar");
        assert_eq!(clips[0].uri, "file:///clips/closer.mp4");
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected() {
        let service = open_service().await;

        let result = service.attach(make_clip("", "file:///clips/closer.mp4")).await;
        assert!(matches!(result, Err(ClipError::EmptyTitle)));
    }

    #[tokio::test]
    async fn test_empty_uri_is_rejected() {
        let service = open_service().await;

        let result = service.attach(make_clip("Closer", "")).await;
        assert!(matches!(result, Err(ClipError::EmptyUri)));
        assert!(service.list_for("Amy Park").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_clip() {
        let service = open_service().await;

        let id = service.attach(make_clip("Opener", "file:///clips/opener.mp4")).await.unwrap();
        service.remove(id).await.unwrap();

        assert!(service.list_for("Amy Park").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_clip_is_a_no_op() {
        let service = open_service().await;
        service.remove(9999).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_keeps_attachment_order() {
        let service = open_service().await;

        service.attach(make_clip("Opener", "file:///clips/1.mp4")).await.unwrap();
        service.attach(make_clip("Crowd work", "file:///clips/2.mp4")).await.unwrap();
        service.attach(make_clip("Closer", "file:///clips/3.mp4")).await.unwrap();

        let titles: Vec<String> =
            service.list_for("Amy Park").await.unwrap().into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["Opener", "Crowd work", "Closer"]);
    }
}
