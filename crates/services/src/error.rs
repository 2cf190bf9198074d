//! Shared error types for the services crate.

use thiserror::Error;

use exam_client::ApiError;
use exam_core::model::ScoreOutOfRange;

/// Errors emitted by `ExamSessionController`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ControllerError {
    #[error("exam has already started")]
    AlreadyStarted,
    #[error("exam is not in progress")]
    NotInProgress,
    #[error("at least one question must be answered before finishing")]
    NothingAnswered,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ControllerError {
    /// The line shown to the user; backend messages stay verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ControllerError::Api(api) => api.user_message(),
            other => other.to_string(),
        }
    }
}

/// Errors emitted by `ResultsService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultsError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `RosterService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RosterError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `QuestionBankService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error(transparent)]
    Score(#[from] ScoreOutOfRange),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl BankError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            BankError::Score(err) => err.to_string(),
            BankError::Api(api) => api.user_message(),
        }
    }
}
