use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{ExamQuestionId, OptionId, QuestionId, SessionId, UserId};

/// Lifecycle status of an exam session as reported by the backend.
///
/// `Completed` and `Expired` are terminal; the portal never renders the
/// question board for a terminal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExamStatus {
    #[serde(rename = "NOT_STARTED")]
    NotStarted,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "EXPIRED")]
    Expired,
}

impl ExamStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamStatus::NotStarted => "NOT_STARTED",
            ExamStatus::InProgress => "IN_PROGRESS",
            ExamStatus::Completed => "COMPLETED",
            ExamStatus::Expired => "EXPIRED",
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExamStatus::Completed | ExamStatus::Expired)
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a status from its wire spelling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown exam status: {raw}")]
pub struct ParseStatusError {
    raw: String,
}

impl FromStr for ExamStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_STARTED" => Ok(ExamStatus::NotStarted),
            "IN_PROGRESS" => Ok(ExamStatus::InProgress),
            "COMPLETED" => Ok(ExamStatus::Completed),
            "EXPIRED" => Ok(ExamStatus::Expired),
            other => Err(ParseStatusError {
                raw: other.to_string(),
            }),
        }
    }
}

/// One selectable answer for a question on the board.
///
/// Option scores are intentionally absent here; the exam path never sees
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamOption {
    pub id: OptionId,
    pub option_text: String,
}

/// A question as placed into a specific session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamQuestion {
    pub exam_question_id: ExamQuestionId,
    pub question_id: QuestionId,
    pub category: String,
    pub order_number: u32,
    pub question_text: String,
    pub options: Vec<ExamOption>,
}

/// Per-category question counts the backend sends alongside a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub total_questions: u32,
    pub answered_count: u32,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamSessionError {
    #[error("session has no questions")]
    NoQuestions,

    #[error("session duration must be positive, got {minutes}")]
    InvalidDuration { minutes: i64 },
}

/// A user's exam attempt as cached by the client.
///
/// The backend is the source of truth; this struct is a read model plus
/// the one local mutation the portal performs (status after a confirmed
/// transition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSession {
    session_id: SessionId,
    user_id: UserId,
    session_code: String,
    status: ExamStatus,
    duration_minutes: u32,
    expires_at: DateTime<Utc>,
    questions: Vec<ExamQuestion>,
    category_stats: Vec<CategoryStats>,
}

impl ExamSession {
    /// Builds a session from backend-reported parts.
    ///
    /// # Errors
    ///
    /// Returns `ExamSessionError::NoQuestions` when the question list is
    /// empty and `ExamSessionError::InvalidDuration` for a non-positive
    /// duration.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session_id: SessionId,
        user_id: UserId,
        session_code: String,
        status: ExamStatus,
        duration_minutes: u32,
        expires_at: DateTime<Utc>,
        questions: Vec<ExamQuestion>,
        category_stats: Vec<CategoryStats>,
    ) -> Result<Self, ExamSessionError> {
        if questions.is_empty() {
            return Err(ExamSessionError::NoQuestions);
        }
        if duration_minutes == 0 {
            return Err(ExamSessionError::InvalidDuration { minutes: 0 });
        }

        Ok(Self {
            session_id,
            user_id,
            session_code,
            status,
            duration_minutes,
            expires_at,
            questions,
            category_stats,
        })
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn session_code(&self) -> &str {
        &self.session_code
    }

    #[must_use]
    pub fn status(&self) -> ExamStatus {
        self.status
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[must_use]
    pub fn questions(&self) -> &[ExamQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&ExamQuestion> {
        self.questions.get(index)
    }

    /// Total number of questions on the board.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn category_stats(&self) -> &[CategoryStats] {
        &self.category_stats
    }

    /// Updates the cached status after the backend confirms a transition.
    pub fn set_status(&mut self, status: ExamStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn build_question(id: u64, category: &str) -> ExamQuestion {
        ExamQuestion {
            exam_question_id: ExamQuestionId::new(id),
            question_id: QuestionId::new(id + 100),
            category: category.to_string(),
            order_number: u32::try_from(id).unwrap(),
            question_text: format!("Question {id}?"),
            options: vec![
                ExamOption {
                    id: OptionId::new(id * 10 + 1),
                    option_text: "First".to_string(),
                },
                ExamOption {
                    id: OptionId::new(id * 10 + 2),
                    option_text: "Second".to_string(),
                },
            ],
        }
    }

    fn build_session(status: ExamStatus) -> ExamSession {
        ExamSession::new(
            SessionId::new(1),
            UserId::new("1234").unwrap(),
            "EXAM_1234_1".to_string(),
            status,
            120,
            fixed_now() + chrono::Duration::minutes(120),
            vec![build_question(1, "TEKNIS"), build_question(2, "MANAJERIAL")],
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn status_round_trips_wire_spelling() {
        for status in [
            ExamStatus::NotStarted,
            ExamStatus::InProgress,
            ExamStatus::Completed,
            ExamStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<ExamStatus>().unwrap(), status);
        }
        assert!("DONE".parse::<ExamStatus>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(ExamStatus::Completed.is_terminal());
        assert!(ExamStatus::Expired.is_terminal());
        assert!(!ExamStatus::NotStarted.is_terminal());
        assert!(!ExamStatus::InProgress.is_terminal());
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = ExamSession::new(
            SessionId::new(1),
            UserId::new("1234").unwrap(),
            "EXAM_1234_1".to_string(),
            ExamStatus::NotStarted,
            120,
            fixed_now(),
            Vec::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(err, ExamSessionError::NoQuestions);
    }

    #[test]
    fn session_exposes_indexed_questions() {
        let session = build_session(ExamStatus::NotStarted);
        assert_eq!(session.total_questions(), 2);
        assert_eq!(
            session.question(1).unwrap().exam_question_id,
            ExamQuestionId::new(2)
        );
        assert!(session.question(2).is_none());
    }
}
