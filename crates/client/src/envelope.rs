use serde::Deserialize;

use crate::error::ApiError;

/// The `{success, message, data, error}` wrapper every endpoint speaks.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload of a successful envelope.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Backend` with the reported message when
    /// `success` is false, and `ApiError::Decode` when a successful
    /// envelope carries no data.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Backend(self.failure_message()));
        }
        self.data
            .ok_or_else(|| ApiError::Decode("missing data in successful response".to_string()))
    }

    /// Checks a successful envelope whose payload the caller ignores
    /// (start/answer/complete acknowledgments).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Backend` when `success` is false.
    pub fn into_ack(self) -> Result<(), ApiError> {
        if !self.success {
            return Err(ApiError::Backend(self.failure_message()));
        }
        Ok(())
    }

    fn failure_message(self) -> String {
        self.error
            .or(self.message)
            .unwrap_or_else(|| "Request failed".to_string())
    }
}
