use std::collections::BTreeMap;

use async_trait::async_trait;

use exam_core::model::{
    AnswerMap, BankOption, BankQuestion, DashboardDetail, DetailedAnswer, ExamQuestionId,
    ExamResults, ExamSession, ExportQuestion, OptionId, Page, QuestionFilter, QuestionId, UserId,
    UserRoster,
};

use crate::error::ApiError;

/// The exam-taking side of the backend contract.
///
/// The portal talks to the backend exclusively through this seam; the
/// production implementation is HTTP, the test double is in-memory.
#[async_trait]
pub trait ExamBackend: Send + Sync {
    /// Get-or-create the user's session. Idempotent per user; a terminal
    /// session is returned as-is so the caller can redirect to results.
    async fn get_or_create_session(&self, user: &UserId) -> Result<ExamSession, ApiError>;

    /// Transition `NOT_STARTED → IN_PROGRESS` and arm the deadline.
    async fn start_exam(&self, user: &UserId) -> Result<(), ApiError>;

    /// Record one answer. Re-answering the same question replaces the
    /// previous choice.
    async fn submit_answer(
        &self,
        user: &UserId,
        question: ExamQuestionId,
        option: OptionId,
    ) -> Result<(), ApiError>;

    /// Finalize and score the session.
    async fn complete_exam(&self, user: &UserId) -> Result<(), ApiError>;

    /// Results of a completed session.
    async fn results(&self, user: &UserId) -> Result<ExamResults, ApiError>;

    /// Previously stored answers of the active session, for reload.
    async fn stored_answers(&self, user: &UserId) -> Result<AnswerMap, ApiError>;

    /// Per-category review of a completed session.
    async fn detailed_answers(
        &self,
        user: &UserId,
    ) -> Result<BTreeMap<String, Vec<DetailedAnswer>>, ApiError>;

    /// One user's dashboard drill-down.
    async fn user_dashboard(&self, user: &UserId) -> Result<DashboardDetail, ApiError>;

    /// Roster of every user who holds a session.
    async fn all_users_dashboard(&self) -> Result<UserRoster, ApiError>;
}

/// The question-bank side of the backend contract.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Filtered, paginated question listing.
    async fn questions(&self, filter: &QuestionFilter) -> Result<Page<BankQuestion>, ApiError>;

    /// Distinct category names.
    async fn categories(&self) -> Result<Vec<String>, ApiError>;

    /// Set one option's score; returns the option as the backend now
    /// holds it.
    async fn update_option_score(
        &self,
        question: QuestionId,
        option: OptionId,
        score: u32,
    ) -> Result<BankOption, ApiError>;

    /// Full filtered collection in export form.
    async fn export_questions(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<ExportQuestion>, ApiError>;
}
