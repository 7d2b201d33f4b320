//! Error taxonomy for the Agora poll ledger

use thiserror::Error;

use crate::PrincipalId;

/// Failures any lifecycle operation can report
///
/// Every operation returns one of these instead of panicking; no variant
/// is retried by the core itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    // Creation errors
    #[error("Maximum number of polls reached")]
    CapacityExceeded,

    #[error("Invalid closing date: '{0}'")]
    InvalidDate(String),

    #[error("Poll closing time must be in the future")]
    DeadlineNotFuture,

    #[error("Poll '{0}' is already in use")]
    DuplicateName(String),

    #[error("A poll needs at least one option")]
    NoOptions,

    // Lookup errors
    #[error("Poll '{0}' not found")]
    NotFound(String),

    // Roster errors
    #[error("Voter '{0}' is already in use")]
    DuplicateVoterName(String),

    #[error("Principal '{0}' is already registered")]
    DuplicateVoterIdentity(PrincipalId),

    #[error("Voter '{0}' not found")]
    VoterNotFound(String),

    #[error("Caller is not the owner of the poll '{0}'")]
    Unauthorized(String),

    #[error("The owner of the poll cannot change their own contribution")]
    OwnerSelfEdit,

    // Voting errors
    #[error("Voting is closed")]
    VotingClosed,

    #[error("The registered principal and the caller's principal are different")]
    IdentityMismatch,

    #[error("Option '{0}' not found")]
    OptionNotFound(String),

    // Result errors
    #[error("Voting is still open")]
    NotYetClosed,

    #[error("Caller may not view the results of the poll '{0}'")]
    UnauthorizedView(String),
}

/// Result type for Agora operations
pub type PollResult<T> = Result<T, PollError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_render_their_context() {
        let err = PollError::NotFound("budget".into());
        assert_eq!(err.to_string(), "Poll 'budget' not found");

        let err = PollError::DuplicateVoterIdentity(PrincipalId::new(0xAB));
        assert!(err.to_string().contains("00000000000000ab"));
    }
}
