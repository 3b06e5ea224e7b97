//! The transition engine: load, validate, gate on wall-clock time, apply the
//! transition table, persist.
//!
//! One invocation per delivered consent id, with no engine state held
//! between calls. Each call performs exactly one store read and at most one
//! conditional store write.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::state_machine::{ConsentEvent, ConsentRecord, ConsentState, StateMachine};
use crate::store::{ConsentStore, StoreError};
use crate::validator;

/// What a `process_consent` call did to the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A transition was applied and persisted.
    Transitioned {
        from: ConsentState,
        to: ConsentState,
    },
    /// No temporal rule applied; the record was left exactly as it was.
    Unchanged,
}

/// Drives a single consent through at most one state transition per call.
pub struct TransitionEngine {
    store: Arc<dyn ConsentStore>,
}

impl TransitionEngine {
    pub fn new(store: Arc<dyn ConsentStore>) -> Self {
        Self { store }
    }

    /// Process one consent identifier.
    ///
    /// Loads the record, refuses terminal states, selects the applicable
    /// event from the temporal rules, applies the transition table and
    /// persists the result with a conditional write. A record for which no
    /// rule fires is a successful no-op.
    ///
    /// Redelivery of an already finalized consent surfaces as
    /// [`EngineError::InvalidState`], both when the terminal state is read
    /// directly and when a concurrent delivery finalizes the record between
    /// this call's read and its write.
    pub async fn process_consent(&self, consent_id: &str) -> Result<Outcome, EngineError> {
        if consent_id.trim().is_empty() {
            return Err(EngineError::BlankConsentId);
        }

        let record = self
            .store
            .get(consent_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(consent_id.to_string()))?;

        validator::assert_transitionable(&record)?;

        let now = Utc::now();
        let Some(event) = applicable_event(&record, now) else {
            return Ok(Outcome::Unchanged);
        };

        let next =
            StateMachine::apply(record.state, event).map_err(|_| EngineError::TransitionFailed {
                consent_id: record.consent_id.clone(),
                state: record.state,
                event,
            })?;

        match self
            .store
            .update_state(consent_id, record.state, next, now)
            .await
        {
            Ok(()) => Ok(Outcome::Transitioned {
                from: record.state,
                to: next,
            }),
            // A concurrent delivery finalized the record between our read
            // and write; same outcome as reading it already terminal.
            Err(StoreError::StateConflict { found, .. }) => Err(EngineError::InvalidState {
                consent_id: record.consent_id,
                state: found,
            }),
            Err(other) => Err(EngineError::Persistence(other)),
        }
    }
}

/// Select the event the temporal rules fire for this record, if any.
///
/// Evaluated in fixed order: expiry first, then rejection. The two
/// predicates are independent per state. An awaiting record whose
/// `created_at` is in the past is rejected immediately; there is no grace
/// window between creation and rejection.
fn applicable_event(record: &ConsentRecord, now: DateTime<Utc>) -> Option<ConsentEvent> {
    match record.state {
        ConsentState::Authorised if record.expires_at < now => Some(ConsentEvent::Expire),
        ConsentState::AwaitingAuthorisation if record.created_at < now => {
            Some(ConsentEvent::Reject)
        }
        _ => None,
    }
}
