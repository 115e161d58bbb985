use crate::CoreError;
use serde::Serialize;
use std::fmt;

/// Lifecycle state of a [`ServiceManager`](crate::ServiceManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManagerState {
    /// Constructed, backend not started by this manager.
    Created,
    /// A start or recreate is in progress.
    Initializing,
    /// Backend ready; queries are accepted.
    Ready,
    /// Terminal. Every further lifecycle call fails.
    Closed,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Closed => "closed",
        })
    }
}

pub fn validate_transition(from: ManagerState, to: ManagerState) -> Result<(), CoreError> {
    use ManagerState::{Closed, Created, Initializing, Ready};

    let valid = matches!(
        (from, to),
        (Created | Ready, Initializing)
            | (Initializing, Ready | Created)
            | (Ready | Created, Created)
            | (Ready, Ready)
            | (Created | Initializing | Ready, Closed)
    );

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ManagerState::{Closed, Created, Initializing, Ready};

    #[test]
    fn valid_transitions() {
        assert!(validate_transition(Created, Initializing).is_ok());
        assert!(validate_transition(Initializing, Ready).is_ok());
        assert!(validate_transition(Initializing, Created).is_ok()); // failed start
        assert!(validate_transition(Ready, Ready).is_ok()); // attach
        assert!(validate_transition(Ready, Initializing).is_ok()); // recreate
        assert!(validate_transition(Ready, Created).is_ok()); // stop
        assert!(validate_transition(Created, Created).is_ok()); // idempotent stop
        assert!(validate_transition(Created, Closed).is_ok());
        assert!(validate_transition(Ready, Closed).is_ok());
    }

    #[test]
    fn invalid_transitions() {
        assert!(validate_transition(Created, Ready).is_err());
        assert!(validate_transition(Initializing, Initializing).is_err());
        assert!(validate_transition(Closed, Created).is_err());
        assert!(validate_transition(Closed, Initializing).is_err());
        assert!(validate_transition(Closed, Ready).is_err());
        assert!(validate_transition(Closed, Closed).is_err());
    }

    #[test]
    fn invalid_transition_names_both_states() {
        let err = validate_transition(Closed, Ready).unwrap_err();
        assert_eq!(err.to_string(), "invalid state transition: closed -> ready");
    }

    #[test]
    fn state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Initializing).unwrap(), "\"initializing\"");
    }
}
