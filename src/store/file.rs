//! JSON-document file store used by the CLI.
//!
//! All records live in one JSON array on disk. Every operation runs a full
//! load → mutate → rewrite cycle under a process-wide mutex, and the rewrite
//! goes through a sibling temp file plus rename; readers never observe a
//! half-written document.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ConsentStore, StoreError, StoreResult};
use crate::state_machine::{ConsentRecord, ConsentState};

/// File-backed consent store.
pub struct FileStore {
    path: PathBuf,
    // Serializes load-mutate-rewrite cycles within the process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> StoreResult<Vec<ConsentRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn rewrite(&self, records: &[ConsentRecord]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn guard(&self) -> StoreResult<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ConsentStore for FileStore {
    async fn get(&self, consent_id: &str) -> StoreResult<Option<ConsentRecord>> {
        let _guard = self.guard()?;
        let records = self.load()?;
        Ok(records.into_iter().find(|r| r.consent_id == consent_id))
    }

    async fn insert(&self, record: ConsentRecord) -> StoreResult<ConsentRecord> {
        let _guard = self.guard()?;
        let mut records = self.load()?;

        if records.iter().any(|r| r.consent_id == record.consent_id) {
            return Err(StoreError::Conflict(format!(
                "consent {} already exists",
                record.consent_id
            )));
        }

        records.push(record.clone());
        self.rewrite(&records)?;
        Ok(record)
    }

    async fn update_state(
        &self,
        consent_id: &str,
        expected_from: ConsentState,
        to: ConsentState,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let _guard = self.guard()?;
        let mut records = self.load()?;

        let record = records
            .iter_mut()
            .find(|r| r.consent_id == consent_id)
            .ok_or_else(|| StoreError::NotFound(format!("consent {consent_id} not found")))?;

        if record.state != expected_from {
            return Err(StoreError::StateConflict {
                consent_id: consent_id.to_string(),
                expected: expected_from,
                found: record.state,
            });
        }

        record.state = to;
        record.updated_at = updated_at;
        self.rewrite(&records)
    }

    async fn list(&self) -> StoreResult<Vec<ConsentRecord>> {
        let _guard = self.guard()?;
        self.load()
    }
}
