use dioxus::prelude::*;

use exam_client::ApiError;
use services::{BankError, ControllerError, ResultsError, RosterError};

/// Display form of a failed view operation.
///
/// Backend refusals keep their message verbatim; everything else maps to a
/// generic line with a retry hint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    Connection,
    Backend(String),
    InvalidUser,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            ViewError::Connection => "Connection failed. Please try again.".to_string(),
            ViewError::Backend(message) => message.clone(),
            ViewError::InvalidUser => "Please enter a valid user ID.".to_string(),
            ViewError::Unknown => "Something went wrong. Please try again.".to_string(),
        }
    }
}

impl From<&ApiError> for ViewError {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Connection(_) => ViewError::Connection,
            ApiError::Backend(message) => ViewError::Backend(message.clone()),
            ApiError::Decode(_) => ViewError::Unknown,
        }
    }
}

impl From<ControllerError> for ViewError {
    fn from(err: ControllerError) -> Self {
        match &err {
            ControllerError::Api(api) => ViewError::from(api),
            other => ViewError::Backend(other.to_string()),
        }
    }
}

impl From<ResultsError> for ViewError {
    fn from(err: ResultsError) -> Self {
        match &err {
            ResultsError::Api(api) => ViewError::from(api),
            _ => ViewError::Unknown,
        }
    }
}

impl From<RosterError> for ViewError {
    fn from(err: RosterError) -> Self {
        match &err {
            RosterError::Api(api) => ViewError::from(api),
            _ => ViewError::Unknown,
        }
    }
}

impl From<BankError> for ViewError {
    fn from(err: BankError) -> Self {
        match &err {
            BankError::Api(api) => ViewError::from(api),
            BankError::Score(score) => ViewError::Backend(score.to_string()),
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(err.clone()),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
