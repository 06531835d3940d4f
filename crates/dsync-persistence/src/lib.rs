//! Owner-scoped storage for dataset records.
//!
//! # Features
//!
//! - **Tenant isolation**: every operation takes the caller's [`OwnerId`](dsync_model::OwnerId);
//!   foreign records look exactly like missing ones
//! - **Atomic replace**: content swaps are whole-document writes
//! - **Two backends**: [`MemoryStore`] for embedding and tests,
//!   [`JsonFileStore`] for a durable directory of JSON documents
//!
//! # Architecture
//!
//! - `store.rs` - The [`DatasetStore`] contract and shared helpers
//! - `memory.rs` - In-memory backend
//! - `file/` - JSON document backend (atomic temp + rename writes)
//! - `error.rs` - Error types with user-friendly messages

mod error;
mod file;
mod memory;
mod store;

pub use error::{PersistenceError, Result};
pub use file::{JsonFileStore, STALE_TEMP_AGE};
pub use memory::MemoryStore;
pub use store::DatasetStore;
