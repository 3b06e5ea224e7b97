//! In-memory store adapter. Deterministic and test-friendly; the demo flow
//! runs on it as well.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ConsentStore, StoreError, StoreResult};
use crate::state_machine::{ConsentRecord, ConsentState};

/// In-memory consent store keyed by `consent_id`.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, ConsentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConsentStore for MemoryStore {
    async fn get(&self, consent_id: &str) -> StoreResult<Option<ConsentRecord>> {
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;
        Ok(guard.get(consent_id).cloned())
    }

    async fn insert(&self, record: ConsentRecord) -> StoreResult<ConsentRecord> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;

        if guard.contains_key(&record.consent_id) {
            return Err(StoreError::Conflict(format!(
                "consent {} already exists",
                record.consent_id
            )));
        }

        guard.insert(record.consent_id.clone(), record.clone());
        Ok(record)
    }

    async fn update_state(
        &self,
        consent_id: &str,
        expected_from: ConsentState,
        to: ConsentState,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;

        let record = guard
            .get_mut(consent_id)
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
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<ConsentRecord>> {
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::Backend("records lock poisoned".to_string()))?;
        Ok(guard.values().cloned().collect())
    }
}
