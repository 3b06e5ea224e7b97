mod consent;
mod state;

pub use consent::ConsentRecord;
pub use state::{ConsentEvent, ConsentState, NoSuchTransition, StateMachine};
