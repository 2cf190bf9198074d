use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ExamQuestionId, QuestionId, SessionId, UserId};

/// Overall outcome of a completed exam, computed server-side.
///
/// The client only displays these values; it never derives a score or a
/// grade on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub total_questions: u32,
    pub total_answered: u32,
    pub total_score: u32,
    pub max_score: u32,
    pub overall_percentage: f64,
    pub overall_grade: String,
    pub is_passed: bool,
    pub completed_at: DateTime<Utc>,
}

/// Per-category breakdown of a completed exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub total_questions: u32,
    pub total_answered: u32,
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub grade: String,
    pub is_passed: bool,
}

/// Summary plus category breakdown, as returned by the results endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResults {
    pub summary: ResultSummary,
    pub results_by_category: Vec<CategoryResult>,
}

/// One reviewed answer in the per-category detail drill-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnswer {
    pub exam_question_id: ExamQuestionId,
    pub question_id: QuestionId,
    pub question_text: String,
    pub selected_option: String,
    pub is_correct: bool,
    pub score: u32,
    pub max_score: u32,
    pub correct_option: String,
    pub correct_score: u32,
    pub answered_at: DateTime<Utc>,
}
