//! Wire shapes of the backend's JSON payloads and their mapping onto the
//! domain model.
//!
//! The backend speaks loosely typed JSON (string statuses, string-keyed
//! answer maps); everything is coerced into typed form here so the rest of
//! the workspace never sees raw wire data.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use exam_core::model::{
    AnswerMap, BankOption, BankQuestion, CategoryResult, CategoryStats, DashboardDetail,
    DetailedAnswer, ExamOption, ExamQuestion, ExamQuestionId, ExamResults, ExamSession,
    ExamStatus, OptionId, Page, PageMeta, ProgressInfo, QuestionId, ResultSummary, SessionId,
    UserDashboard, UserId, UserRoster,
};

use crate::error::ApiError;

fn decode_err(context: &str, detail: impl std::fmt::Display) -> ApiError {
    ApiError::Decode(format!("{context}: {detail}"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionDto {
    pub session_id: u64,
    pub user_id: String,
    pub session_code: String,
    pub status: String,
    pub expires_at: DateTime<Utc>,
    pub duration: u32,
    pub questions: Vec<QuestionDto>,
    #[serde(default)]
    pub category_stats: Vec<CategoryStatsDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDto {
    pub exam_question_id: u64,
    pub question_id: u64,
    pub category: String,
    pub order_number: u32,
    pub question_text: String,
    pub options: Vec<OptionDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionDto {
    pub id: u64,
    pub option_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryStatsDto {
    pub category: String,
    pub total_questions: u32,
    #[serde(default)]
    pub answered_count: u32,
}

impl TryFrom<SessionDto> for ExamSession {
    type Error = ApiError;

    fn try_from(dto: SessionDto) -> Result<Self, Self::Error> {
        let status: ExamStatus = dto
            .status
            .parse()
            .map_err(|err| decode_err("session status", err))?;
        let user_id = UserId::new(dto.user_id).map_err(|err| decode_err("user id", err))?;
        let questions = dto
            .questions
            .into_iter()
            .map(|question| ExamQuestion {
                exam_question_id: ExamQuestionId::new(question.exam_question_id),
                question_id: QuestionId::new(question.question_id),
                category: question.category,
                order_number: question.order_number,
                question_text: question.question_text,
                options: question
                    .options
                    .into_iter()
                    .map(|option| ExamOption {
                        id: OptionId::new(option.id),
                        option_text: option.option_text,
                    })
                    .collect(),
            })
            .collect();
        let category_stats = dto
            .category_stats
            .into_iter()
            .map(|stats| CategoryStats {
                category: stats.category,
                total_questions: stats.total_questions,
                answered_count: stats.answered_count,
            })
            .collect();

        ExamSession::new(
            SessionId::new(dto.session_id),
            user_id,
            dto.session_code,
            status,
            dto.duration,
            dto.expires_at,
            questions,
            category_stats,
        )
        .map_err(|err| decode_err("session payload", err))
    }
}

/// The `/answers` endpoint returns a JSON object keyed by stringified
/// exam-question ids.
pub fn answers_from_wire(raw: &BTreeMap<String, u64>) -> Result<AnswerMap, ApiError> {
    AnswerMap::from_stored(raw.iter().map(|(key, value)| (key.as_str(), *value)))
        .map_err(|err| decode_err("stored answers", err))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsDto {
    pub summary: SummaryDto,
    pub results_by_category: Vec<CategoryResultDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryDto {
    pub exam_session_id: u64,
    pub user_id: String,
    pub total_questions: u32,
    pub total_answered: u32,
    pub total_score: u32,
    pub max_score: u32,
    pub overall_percentage: f64,
    pub overall_grade: String,
    pub is_passed: bool,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryResultDto {
    pub category: String,
    pub total_questions: u32,
    pub total_answered: u32,
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub grade: String,
    pub is_passed: bool,
}

impl TryFrom<ResultsDto> for ExamResults {
    type Error = ApiError;

    fn try_from(dto: ResultsDto) -> Result<Self, Self::Error> {
        let user_id =
            UserId::new(dto.summary.user_id).map_err(|err| decode_err("user id", err))?;
        Ok(ExamResults {
            summary: ResultSummary {
                session_id: SessionId::new(dto.summary.exam_session_id),
                user_id,
                total_questions: dto.summary.total_questions,
                total_answered: dto.summary.total_answered,
                total_score: dto.summary.total_score,
                max_score: dto.summary.max_score,
                overall_percentage: dto.summary.overall_percentage,
                overall_grade: dto.summary.overall_grade,
                is_passed: dto.summary.is_passed,
                completed_at: dto.summary.completed_at,
            },
            results_by_category: dto
                .results_by_category
                .into_iter()
                .map(|category| CategoryResult {
                    category: category.category,
                    total_questions: category.total_questions,
                    total_answered: category.total_answered,
                    total_score: category.total_score,
                    max_score: category.max_score,
                    percentage: category.percentage,
                    grade: category.grade,
                    is_passed: category.is_passed,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetailedAnswerDto {
    pub exam_question_id: u64,
    pub question_id: u64,
    pub question_text: String,
    pub selected_option: String,
    pub is_correct: bool,
    pub score: u32,
    pub max_score: u32,
    pub correct_option: String,
    pub correct_score: u32,
    pub answered_at: DateTime<Utc>,
}

impl From<DetailedAnswerDto> for DetailedAnswer {
    fn from(dto: DetailedAnswerDto) -> Self {
        DetailedAnswer {
            exam_question_id: ExamQuestionId::new(dto.exam_question_id),
            question_id: QuestionId::new(dto.question_id),
            question_text: dto.question_text,
            selected_option: dto.selected_option,
            is_correct: dto.is_correct,
            score: dto.score,
            max_score: dto.max_score,
            correct_option: dto.correct_option,
            correct_score: dto.correct_score,
            answered_at: dto.answered_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDashboardDto {
    pub user_id: String,
    pub exam_status: String,
    pub session_code: String,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_score: Option<u32>,
    #[serde(default)]
    pub max_score: Option<u32>,
    #[serde(default)]
    pub percentage: Option<f64>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub is_passed: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRosterDto {
    pub total_users: usize,
    pub users: Vec<UserDashboardDto>,
}

impl TryFrom<UserRosterDto> for UserRoster {
    type Error = ApiError;

    fn try_from(dto: UserRosterDto) -> Result<Self, Self::Error> {
        let users = dto
            .users
            .into_iter()
            .map(|user| {
                let exam_status: ExamStatus = user
                    .exam_status
                    .parse()
                    .map_err(|err| decode_err("roster status", err))?;
                Ok(UserDashboard {
                    user_id: user.user_id,
                    exam_status,
                    session_code: user.session_code,
                    started_at: user.started_at,
                    completed_at: user.completed_at,
                    total_score: user.total_score,
                    max_score: user.max_score,
                    percentage: user.percentage,
                    grade: user.grade,
                    is_passed: user.is_passed,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;
        Ok(UserRoster {
            total_users: dto.total_users,
            users,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardDetailDto {
    pub user_id: String,
    pub has_exam: bool,
    #[serde(default)]
    pub exam_status: Option<String>,
    #[serde(default)]
    pub exam_session: Option<SessionDto>,
    #[serde(default)]
    pub exam_results: Option<ResultsDto>,
    #[serde(default)]
    pub progress_info: Option<ProgressInfoDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressInfoDto {
    pub total_questions: u32,
    pub answered_questions: u32,
    pub remaining_time: i64,
}

impl TryFrom<DashboardDetailDto> for DashboardDetail {
    type Error = ApiError;

    fn try_from(dto: DashboardDetailDto) -> Result<Self, Self::Error> {
        let exam_status = dto
            .exam_status
            .map(|status| status.parse::<ExamStatus>())
            .transpose()
            .map_err(|err| decode_err("dashboard status", err))?;
        let exam_session = dto.exam_session.map(ExamSession::try_from).transpose()?;
        let exam_results = dto.exam_results.map(ExamResults::try_from).transpose()?;
        Ok(DashboardDetail {
            user_id: dto.user_id,
            has_exam: dto.has_exam,
            exam_status,
            exam_session,
            exam_results,
            progress_info: dto.progress_info.map(|progress| ProgressInfo {
                total_questions: progress.total_questions,
                answered_questions: progress.answered_questions,
                remaining_seconds: progress.remaining_time,
            }),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedQuestionsDto {
    pub questions: Vec<BankQuestionDto>,
    pub pagination: PageMetaDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankQuestionDto {
    pub id: u64,
    pub category: String,
    pub question_text: String,
    pub options: Vec<BankOptionDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BankOptionDto {
    pub id: u64,
    pub question_id: u64,
    pub option_text: String,
    pub score: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageMetaDto {
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_items: u32,
    pub total_pages: u32,
}

impl From<BankOptionDto> for BankOption {
    fn from(dto: BankOptionDto) -> Self {
        BankOption {
            id: OptionId::new(dto.id),
            question_id: QuestionId::new(dto.question_id),
            option_text: dto.option_text,
            score: dto.score,
        }
    }
}

impl From<BankQuestionDto> for BankQuestion {
    fn from(dto: BankQuestionDto) -> Self {
        BankQuestion {
            id: QuestionId::new(dto.id),
            category: dto.category,
            question_text: dto.question_text,
            options: dto.options.into_iter().map(BankOption::from).collect(),
        }
    }
}

impl From<PaginatedQuestionsDto> for Page<BankQuestion> {
    fn from(dto: PaginatedQuestionsDto) -> Self {
        Page {
            items: dto.questions.into_iter().map(BankQuestion::from).collect(),
            meta: PageMeta {
                current_page: dto.pagination.current_page,
                items_per_page: dto.pagination.items_per_page,
                total_items: dto.pagination.total_items,
                total_pages: dto.pagination.total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn session_dto_maps_to_domain() {
        let dto: SessionDto = serde_json::from_value(json!({
            "session_id": 1,
            "user_id": "1234",
            "session_code": "EXAM_1234_1643356800",
            "status": "NOT_STARTED",
            "expires_at": "2026-01-28T12:00:00Z",
            "duration": 120,
            "questions": [{
                "exam_question_id": 1,
                "question_id": 15,
                "category": "MANAJERIAL",
                "order_number": 1,
                "question_text": "Atasan Anda melakukan rekayasa laporan...",
                "options": [
                    { "id": 59, "option_text": "Dalam hati tidak menyetujui hal tersebut" }
                ]
            }],
            "category_stats": [
                { "category": "MANAJERIAL", "total_questions": 1, "answered_count": 0 }
            ]
        }))
        .unwrap();

        let session = ExamSession::try_from(dto).unwrap();
        assert_eq!(session.status(), ExamStatus::NotStarted);
        assert_eq!(session.total_questions(), 1);
        assert_eq!(session.questions()[0].options[0].id, OptionId::new(59));
        assert_eq!(session.category_stats()[0].category, "MANAJERIAL");
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let dto: SessionDto = serde_json::from_value(json!({
            "session_id": 1,
            "user_id": "1234",
            "session_code": "EXAM_1234_1",
            "status": "PAUSED",
            "expires_at": "2026-01-28T12:00:00Z",
            "duration": 120,
            "questions": [{
                "exam_question_id": 1,
                "question_id": 1,
                "category": "TEKNIS",
                "order_number": 1,
                "question_text": "?",
                "options": []
            }]
        }))
        .unwrap();

        assert!(matches!(
            ExamSession::try_from(dto),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn stored_answers_coerce_string_keys() {
        let raw: BTreeMap<String, u64> =
            serde_json::from_value(json!({ "10": 3, "11": 4 })).unwrap();
        let answers = answers_from_wire(&raw).unwrap();
        assert_eq!(
            answers.selected(ExamQuestionId::new(10)),
            Some(OptionId::new(3))
        );
        assert_eq!(
            answers.selected(ExamQuestionId::new(11)),
            Some(OptionId::new(4))
        );
    }

    #[test]
    fn paginated_questions_map_to_page() {
        let dto: PaginatedQuestionsDto = serde_json::from_value(json!({
            "questions": [{
                "id": 7,
                "category": "TEKNIS",
                "question_text": "Q",
                "options": [
                    { "id": 70, "question_id": 7, "option_text": "A", "score": 4 }
                ]
            }],
            "pagination": {
                "current_page": 2,
                "items_per_page": 10,
                "total_items": 25,
                "total_pages": 3
            }
        }))
        .unwrap();

        let page = Page::from(dto);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].options[0].score, 4);
        assert_eq!(page.meta.total_pages, 3);
    }
}
