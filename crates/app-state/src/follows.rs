//! Follow registry
//!
//! This module provides the session-scoped source of truth for "is comedian
//! N followed": an in-memory set mirroring the durable follows table, with
//! storage-backed mutation and watch-channel publication of every change.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

use storage::{FollowRecord, FollowStore, StorageReadError, StorageWriteError};

/// Session-scoped registry of followed comedians
///
/// The registry owns the authoritative in-memory set for its session scope
/// and mirrors it to the durable store: the set is populated by a full scan
/// at construction, and afterwards changes only as a side effect of a
/// successful durable write or delete — never optimistically ahead of
/// storage. A failed store operation leaves the set at its last-known-good
/// value.
///
/// Subscribers receive the new full set (not a diff) after every successful
/// mutation, via [`subscribe`](Self::subscribe).
///
/// # Concurrency
///
/// The registry performs no internal locking: mutating operations take
/// `&mut self`, so a multi-threaded embedder must serialize access
/// externally (an actor task, a mutex, or single-task affinity).
/// [`is_following`](Self::is_following) is a pure lookup and never suspends;
/// the mutating operations suspend during durable I/O.
///
/// Two registries constructed over the same store do not observe each
/// other's writes until one calls [`reload`](Self::reload). Screens that
/// outlive another screen's mutations should reload when they resume.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use app_state::FollowRegistry;
/// use storage::{SqliteDatabase, SqliteFollowStore};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = SqliteDatabase::in_memory().await?;
///     db.migrate(&storage::migrations()).await?;
///
///     let store = Arc::new(SqliteFollowStore::new(&db));
///     let mut registry = FollowRegistry::new(store).await?;
///
///     let mut rx = registry.subscribe();
///     registry.follow("Amy Park").await?;
///     assert!(registry.is_following("Amy Park"));
///     assert!(rx.borrow_and_update().contains("Amy Park"));
///     Ok(())
/// }
/// ```
pub struct FollowRegistry {
    /// Durable collaborator; shared with other registries and the whole app
    store: Arc<dyn FollowStore>,
    /// Working cache of followed names
    followed: HashSet<String>,
    /// Publishes the full set after each change
    followed_tx: watch::Sender<HashSet<String>>,
}

impl FollowRegistry {
    /// Create a registry, populating the set with a full scan of the store
    ///
    /// A scan failure surfaces the error and no registry is produced; an
    /// empty set would be indistinguishable from "follows nobody".
    pub async fn new(store: Arc<dyn FollowStore>) -> Result<Self, StorageReadError> {
        let records = store.fetch_all().await?;
        let followed: HashSet<String> = records.into_iter().map(|r| r.comedian).collect();
        tracing::debug!(count = followed.len(), "follow registry loaded");

        let (followed_tx, _) = watch::channel(followed.clone());

        Ok(FollowRegistry { store, followed, followed_tx })
    }

    /// Resynchronize the set with the store's current contents
    ///
    /// Replaces the set wholesale and always publishes the result, even when
    /// nothing changed. On failure the set keeps its previous value.
    pub async fn reload(&mut self) -> Result<(), StorageReadError> {
        let records = self.store.fetch_all().await?;
        self.followed = records.into_iter().map(|r| r.comedian).collect();
        tracing::debug!(count = self.followed.len(), "follow registry reloaded");

        self.followed_tx.send_replace(self.followed.clone());
        Ok(())
    }

    /// Check whether a comedian is followed
    ///
    /// Pure lookup against the in-memory set; no I/O. Returns `false` for
    /// names never seen, including the empty string. Matching is exact:
    /// case-sensitive, untrimmed.
    pub fn is_following(&self, comedian: &str) -> bool {
        self.followed.contains(comedian)
    }

    /// Follow a comedian
    ///
    /// A no-op when already followed: no duplicate record is written and no
    /// notification is published. Otherwise the follow is persisted first;
    /// only a successful persist updates the set and notifies subscribers.
    pub async fn follow(&mut self, comedian: &str) -> Result<(), StorageWriteError> {
        if self.is_following(comedian) {
            return Ok(());
        }

        self.store.insert(FollowRecord::new(comedian)).await?;

        self.followed.insert(comedian.to_string());
        tracing::debug!(comedian, "follow recorded");
        self.followed_tx.send_replace(self.followed.clone());
        Ok(())
    }

    /// Unfollow a comedian
    ///
    /// Always issues the delete; a name with no stored records succeeds as a
    /// no-op. Subscribers are notified only when the set actually changed.
    pub async fn unfollow(&mut self, comedian: &str) -> Result<(), StorageWriteError> {
        self.store.delete_where(comedian).await?;

        if self.followed.remove(comedian) {
            tracing::debug!(comedian, "follow removed");
            self.followed_tx.send_replace(self.followed.clone());
        }
        Ok(())
    }

    /// Toggle follow state, returning whether the comedian is now followed
    ///
    /// Compound and non-atomic: between the membership read and the
    /// resulting write there is no transactional guarantee against a
    /// concurrent mutation of the same name through another registry.
    pub async fn toggle_follow(&mut self, comedian: &str) -> Result<bool, StorageWriteError> {
        if self.is_following(comedian) {
            self.unfollow(comedian).await?;
            Ok(false)
        } else {
            self.follow(comedian).await?;
            Ok(true)
        }
    }

    /// The current set of followed names
    pub fn followed(&self) -> &HashSet<String> {
        &self.followed
    }

    /// Subscribe to set changes
    ///
    /// Each notification carries the new full set. A fresh receiver's
    /// initial value is the set as of subscription time.
    pub fn subscribe(&self) -> watch::Receiver<HashSet<String>> {
        self.followed_tx.subscribe()
    }
}
