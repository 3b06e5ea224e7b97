use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The four states of the consent lifecycle.
///
/// `Rejected` and `Expired` are terminal: no transition leaves them.
/// Serialized with the wire strings used by the consent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentState {
    #[serde(rename = "AWAITING_AUTHORISATION")]
    AwaitingAuthorisation,
    #[serde(rename = "AUTHORISED")]
    Authorised,
    #[serde(rename = "REJECTED")]
    Rejected,
    #[serde(rename = "EXPIRED")]
    Expired,
}

impl ConsentState {
    /// A terminal state has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConsentState::Rejected | ConsentState::Expired)
    }
}

impl fmt::Display for ConsentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsentState::AwaitingAuthorisation => write!(f, "AWAITING_AUTHORISATION"),
            ConsentState::Authorised => write!(f, "AUTHORISED"),
            ConsentState::Rejected => write!(f, "REJECTED"),
            ConsentState::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// The events that drive consent transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsentEvent {
    #[serde(rename = "EXPIRE")]
    Expire,
    #[serde(rename = "REJECT")]
    Reject,
}

impl fmt::Display for ConsentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsentEvent::Expire => write!(f, "EXPIRE"),
            ConsentEvent::Reject => write!(f, "REJECT"),
        }
    }
}

/// Returned when a `(state, event)` pair has no entry in the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no transition from {state} on {event}")]
pub struct NoSuchTransition {
    pub state: ConsentState,
    pub event: ConsentEvent,
}

/// The consent transition table.
pub struct StateMachine;

impl StateMachine {
    /// Evaluate the transition table for `(state, event)`.
    ///
    /// Exactly two transitions are legal:
    /// - `Authorised` on `Expire` → `Expired`
    /// - `AwaitingAuthorisation` on `Reject` → `Rejected`
    ///
    /// Every other pair fails deterministically with [`NoSuchTransition`],
    /// including events fired from a terminal state. The table is a pure
    /// function: there is no machine instance and no held state.
    pub fn apply(
        state: ConsentState,
        event: ConsentEvent,
    ) -> Result<ConsentState, NoSuchTransition> {
        match (state, event) {
            (ConsentState::Authorised, ConsentEvent::Expire) => Ok(ConsentState::Expired),
            (ConsentState::AwaitingAuthorisation, ConsentEvent::Reject) => {
                Ok(ConsentState::Rejected)
            }
            (state, event) => Err(NoSuchTransition { state, event }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorised_expires() {
        let next = StateMachine::apply(ConsentState::Authorised, ConsentEvent::Expire).unwrap();
        assert_eq!(next, ConsentState::Expired);
    }

    #[test]
    fn awaiting_is_rejected() {
        let next =
            StateMachine::apply(ConsentState::AwaitingAuthorisation, ConsentEvent::Reject).unwrap();
        assert_eq!(next, ConsentState::Rejected);
    }

    #[test]
    fn awaiting_cannot_expire() {
        let err = StateMachine::apply(ConsentState::AwaitingAuthorisation, ConsentEvent::Expire)
            .unwrap_err();
        assert_eq!(
            err,
            NoSuchTransition {
                state: ConsentState::AwaitingAuthorisation,
                event: ConsentEvent::Expire,
            }
        );
    }

    #[test]
    fn authorised_cannot_be_rejected() {
        let result = StateMachine::apply(ConsentState::Authorised, ConsentEvent::Reject);
        assert!(result.is_err());
    }

    #[test]
    fn terminal_states_permit_no_events() {
        for state in [ConsentState::Rejected, ConsentState::Expired] {
            for event in [ConsentEvent::Expire, ConsentEvent::Reject] {
                assert!(StateMachine::apply(state, event).is_err());
            }
        }
    }

    #[test]
    fn terminal_flags() {
        assert!(!ConsentState::AwaitingAuthorisation.is_terminal());
        assert!(!ConsentState::Authorised.is_terminal());
        assert!(ConsentState::Rejected.is_terminal());
        assert!(ConsentState::Expired.is_terminal());
    }

    #[test]
    fn state_display() {
        assert_eq!(
            ConsentState::AwaitingAuthorisation.to_string(),
            "AWAITING_AUTHORISATION"
        );
        assert_eq!(ConsentState::Authorised.to_string(), "AUTHORISED");
        assert_eq!(ConsentState::Rejected.to_string(), "REJECTED");
        assert_eq!(ConsentState::Expired.to_string(), "EXPIRED");
    }

    #[test]
    fn state_serializes_to_wire_strings() {
        let json = serde_json::to_string(&ConsentState::AwaitingAuthorisation).unwrap();
        assert_eq!(json, "\"AWAITING_AUTHORISATION\"");
        let back: ConsentState = serde_json::from_str("\"EXPIRED\"").unwrap();
        assert_eq!(back, ConsentState::Expired);
    }

    #[test]
    fn no_such_transition_display() {
        let err = NoSuchTransition {
            state: ConsentState::Expired,
            event: ConsentEvent::Expire,
        };
        assert_eq!(err.to_string(), "no transition from EXPIRED on EXPIRE");
    }
}
