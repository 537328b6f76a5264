//! Application state management for Greenroom
//!
//! This crate provides the reactive, session-scoped state the UI observes.
//! Its centerpiece is the follow registry, which keeps an in-memory view of
//! the followed-comedian set consistent with durable storage.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod follows;

pub use follows::FollowRegistry;
