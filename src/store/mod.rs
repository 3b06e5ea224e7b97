//! Persistence boundary for consent records.
//!
//! The engine depends only on the [`ConsentStore`] trait. Two adapters are
//! provided: [`MemoryStore`] for tests and the demo flow, and [`FileStore`]
//! for the CLI, which keeps all records in a single JSON document file.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::state_machine::{ConsentRecord, ConsentState};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write violated `consent_id` uniqueness.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A conditional write found the record in a different state than the
    /// writer observed. Of two racing writers, the loser lands here.
    #[error("consent {consent_id}: expected state {expected}, found {found}")]
    StateConflict {
        consent_id: String,
        expected: ConsentState,
        found: ConsentState,
    },

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Document-store boundary keyed by the business `consent_id`.
#[async_trait]
pub trait ConsentStore: Send + Sync {
    /// Look up a record by consent id.
    async fn get(&self, consent_id: &str) -> StoreResult<Option<ConsentRecord>>;

    /// Insert a new record, enforcing `consent_id` uniqueness. Returns the
    /// stored record. Creation glue only; the engine never inserts.
    async fn insert(&self, record: ConsentRecord) -> StoreResult<ConsentRecord>;

    /// Conditional state change: re-checks the current state under the
    /// store's own lock and fails with [`StoreError::StateConflict`] when the
    /// record no longer matches `expected_from`. `state` and `updated_at`
    /// move together or not at all.
    async fn update_state(
        &self,
        consent_id: &str,
        expected_from: ConsentState,
        to: ConsentState,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// All stored records, unordered.
    async fn list(&self) -> StoreResult<Vec<ConsentRecord>>;
}
