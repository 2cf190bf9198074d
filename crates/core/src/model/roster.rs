use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ExamResults, ExamSession, ExamStatus};

/// One row in the admin roster: a user plus their exam state and, once
/// completed, their headline result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDashboard {
    pub user_id: String,
    pub exam_status: ExamStatus,
    pub session_code: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_score: Option<u32>,
    pub max_score: Option<u32>,
    pub percentage: Option<f64>,
    pub grade: Option<String>,
    pub is_passed: Option<bool>,
}

/// The full roster payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRoster {
    pub total_users: usize,
    pub users: Vec<UserDashboard>,
}

/// Live progress of an in-progress session, for the per-user detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressInfo {
    pub total_questions: u32,
    pub answered_questions: u32,
    pub remaining_seconds: i64,
}

/// Everything the per-user drill-down shows: current session if any,
/// results once completed, progress while in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDetail {
    pub user_id: String,
    pub has_exam: bool,
    pub exam_status: Option<ExamStatus>,
    pub exam_session: Option<ExamSession>,
    pub exam_results: Option<ExamResults>,
    pub progress_info: Option<ProgressInfo>,
}
