//! Terminal-state guard run before any transition attempt.

use crate::error::EngineError;
use crate::state_machine::ConsentRecord;

/// Rejects records that are already in a terminal state.
///
/// Runs before the applicable event is computed, so a terminal record causes
/// zero store writes. Duplicate redelivery of a finalized consent lands here.
pub fn assert_transitionable(record: &ConsentRecord) -> Result<(), EngineError> {
    if record.state.is_terminal() {
        return Err(EngineError::InvalidState {
            consent_id: record.consent_id.clone(),
            state: record.state,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::ConsentState;
    use chrono::Duration;

    fn record(state: ConsentState) -> ConsentRecord {
        ConsentRecord::new("c-1", state, Duration::minutes(1))
    }

    #[test]
    fn authorised_is_transitionable() {
        assert!(assert_transitionable(&record(ConsentState::Authorised)).is_ok());
    }

    #[test]
    fn awaiting_is_transitionable() {
        assert!(assert_transitionable(&record(ConsentState::AwaitingAuthorisation)).is_ok());
    }

    #[test]
    fn rejected_is_not_transitionable() {
        let err = assert_transitionable(&record(ConsentState::Rejected)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidState {
                state: ConsentState::Rejected,
                ..
            }
        ));
    }

    #[test]
    fn expired_is_not_transitionable() {
        let err = assert_transitionable(&record(ConsentState::Expired)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidState {
                state: ConsentState::Expired,
                ..
            }
        ));
    }
}
