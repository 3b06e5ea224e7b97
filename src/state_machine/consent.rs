use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::ConsentState;

/// A consent record as persisted in the store.
///
/// `consent_id` is the business identifier every engine operation is keyed
/// by; it is unique and immutable once created. The engine only ever mutates
/// `state` and `updated_at`, and always both together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Opaque storage key. Carries no business meaning.
    pub internal_id: String,
    /// Externally supplied business identifier, unique across all records.
    pub consent_id: String,
    pub state: ConsentState,
    pub created_at: DateTime<Utc>,
    /// Instant after which an `Authorised` record becomes eligible for expiry.
    pub expires_at: DateTime<Utc>,
    /// Instant of the last state change.
    pub updated_at: DateTime<Utc>,
}

impl ConsentRecord {
    /// Build a new record in the given initial state, expiring `ttl` from now.
    pub fn new(consent_id: impl Into<String>, state: ConsentState, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            internal_id: Uuid::new_v4().to_string(),
            consent_id: consent_id.into(),
            state,
            created_at: now,
            expires_at: now + ttl,
            updated_at: now,
        }
    }
}
