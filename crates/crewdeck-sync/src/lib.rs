// File: crewdeck-sync/src/lib.rs
// Purpose: Main entry point for the crewdeck-sync library

//! # crewdeck-sync
//!
//! Document store gateway with live snapshot subscriptions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crewdeck_sync::{Gateway, MemoryGateway};
//!
//! let gateway = MemoryGateway::new();
//!
//! // Subscribe before writing: the first delivery is the current state,
//! // every mutation after that delivers a fresh full snapshot.
//! let mut sub = gateway.subscribe("tasks", None, None).await?;
//!
//! gateway.create("tasks", fields).await?;
//! let snapshot = sub.next().await.unwrap();
//! ```

pub mod gateway;
pub mod memory;
pub mod sqlite;
pub mod subscription;

// Re-export main types
pub use gateway::{Direction, FilterExpr, Gateway, OrderExpr};
pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;
pub use subscription::{SnapshotStream, Subscription};
