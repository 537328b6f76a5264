//! Storage layer for Greenroom
//!
//! This crate provides the SQLite database abstraction and the durable
//! record stores for follows, comedian profiles, reviews, and clip metadata.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clips;
pub mod comedians;
pub mod database;
pub mod error;
pub mod follows;
pub mod reviews;

pub use clips::{ClipRecord, NewClip, SqliteClipStore};
pub use comedians::{ComedianRecord, SqliteComedianStore};
pub use database::{DatabaseConfig, MigrationDefinition, SqliteDatabase, SynchronousMode};
pub use error::{StorageReadError, StorageWriteError};
pub use follows::{FollowRecord, FollowStore, SqliteFollowStore};
pub use reviews::{NewReview, ReviewRecord, SqliteReviewStore};

/// Schema migrations for every Greenroom table, in application order.
pub fn migrations() -> Vec<MigrationDefinition> {
    vec![
        MigrationDefinition::new(1, "Create follows table", follows::CREATE_TABLE_SQL),
        MigrationDefinition::new(2, "Create comedians table", comedians::CREATE_TABLE_SQL),
        MigrationDefinition::new(3, "Create reviews table", reviews::CREATE_TABLE_SQL),
        MigrationDefinition::new(4, "Create clips table", clips::CREATE_TABLE_SQL),
    ]
}
