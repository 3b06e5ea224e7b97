use thiserror::Error;

use crate::state_machine::{ConsentEvent, ConsentState};
use crate::store::StoreError;

/// Failures surfaced by the transition engine.
///
/// Every variant reaches the immediate caller; nothing is swallowed. The
/// engine never retries; redelivery belongs to whoever feeds it.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The consent identifier was empty or whitespace.
    #[error("consent id must not be blank")]
    BlankConsentId,

    /// No record exists for the given consent id.
    #[error("consent not found: {0}")]
    NotFound(String),

    /// The record is in a state that permits no transition. This is the
    /// expected outcome for duplicate or late redelivery of an already
    /// finalized consent, and is distinguishable from a genuine failure.
    #[error("consent {consent_id} in state {state} permits no transition")]
    InvalidState {
        consent_id: String,
        state: ConsentState,
    },

    /// The transition table rejected an event the temporal gate selected.
    /// Indicates an inconsistency between gate and table.
    #[error("transition from {state} on {event} failed for consent {consent_id}")]
    TransitionFailed {
        consent_id: String,
        state: ConsentState,
        event: ConsentEvent,
    },

    /// The store read or write did not complete.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),
}
