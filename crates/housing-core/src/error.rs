use thiserror::Error;

/// Misuse of the session state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session already started")]
    AlreadyStarted,

    #[error("session not started yet; API modules must load before signing in")]
    NotStarted,
}
