use thiserror::Error;

/// Failure taxonomy for talking to the exam backend.
///
/// `Connection` means no usable response arrived; `Backend` means the
/// backend answered and refused, with its message carried verbatim for
/// display.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("{0}")]
    Backend(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    /// The line shown to the user: backend messages verbatim, transport
    /// failures as a generic retry hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Connection(_) => "Connection failed. Please try again.".to_string(),
            ApiError::Backend(message) => message.clone(),
            ApiError::Decode(_) => "Unexpected response from the server.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Connection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_is_verbatim() {
        let err = ApiError::Backend("exam has expired, cannot submit answers".to_string());
        assert_eq!(err.user_message(), "exam has expired, cannot submit answers");
        assert_eq!(err.to_string(), "exam has expired, cannot submit answers");
    }

    #[test]
    fn connection_message_is_generic() {
        let err = ApiError::Connection("dns failure".to_string());
        assert_eq!(err.user_message(), "Connection failed. Please try again.");
    }
}
