use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an exam session
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

/// Unique identifier for a question in the bank
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(u64);

/// Unique identifier for a question placed into a session
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExamQuestionId(u64);

/// Unique identifier for an answer option
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionId(u64);

macro_rules! impl_numeric_id {
    ($name:ident) => {
        impl $name {
            /// Creates a new identifier from its raw value
            #[must_use]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map($name::new).map_err(|_| ParseIdError {
                    kind: stringify!($name),
                })
            }
        }
    };
}

impl_numeric_id!(SessionId);
impl_numeric_id!(QuestionId);
impl_numeric_id!(ExamQuestionId);
impl_numeric_id!(OptionId);

/// Error type for parsing an ID from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

/// Identifier for an exam taker.
///
/// User IDs come from the login form and are embedded into request paths,
/// so they must be non-empty and free of whitespace.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

/// Error produced when validating a raw user ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdError {
    Empty,
    Whitespace,
}

impl fmt::Display for UserIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserIdError::Empty => write!(f, "user ID must not be empty"),
            UserIdError::Whitespace => write!(f, "user ID must not contain whitespace"),
        }
    }
}

impl std::error::Error for UserIdError {}

impl UserId {
    /// Validates and wraps a raw user ID.
    ///
    /// # Errors
    ///
    /// Returns `UserIdError` when the trimmed value is empty or contains
    /// interior whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserIdError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(UserIdError::Whitespace);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = UserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserId::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_display_and_parse() {
        let id = ExamQuestionId::new(42);
        assert_eq!(id.to_string(), "42");
        let parsed: ExamQuestionId = "42".parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn numeric_id_rejects_garbage() {
        assert!("not-a-number".parse::<OptionId>().is_err());
        assert!("-3".parse::<QuestionId>().is_err());
    }

    #[test]
    fn user_id_trims_and_accepts() {
        let id = UserId::new("  1234 ").unwrap();
        assert_eq!(id.as_str(), "1234");
    }

    #[test]
    fn user_id_rejects_empty_and_spaced() {
        assert_eq!(UserId::new("   "), Err(UserIdError::Empty));
        assert_eq!(UserId::new("a b"), Err(UserIdError::Whitespace));
    }
}
