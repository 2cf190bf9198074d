use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use exam_core::model::{
    AnswerMap, BankOption, BankQuestion, DashboardDetail, DetailedAnswer, ExamQuestionId,
    ExamResults, ExamSession, ExportQuestion, OptionId, Page, QuestionFilter, QuestionId, UserId,
    UserRoster,
};

use crate::backend::{ExamBackend, QuestionBank};
use crate::dto::{
    BankOptionDto, DashboardDetailDto, DetailedAnswerDto, PaginatedQuestionsDto, ResultsDto,
    SessionDto, UserRosterDto, answers_from_wire,
};
use crate::envelope::ApiEnvelope;
use crate::error::ApiError;

/// HTTP implementation of the backend contract.
///
/// Pure request shaping: every method builds a URL, sends, and decodes the
/// shared envelope. No retries, no caching.
#[derive(Clone)]
pub struct HttpExamApi {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SubmitAnswerBody {
    exam_question_id: u64,
    question_option_id: u64,
}

#[derive(Debug, Serialize)]
struct UpdateScoreBody {
    score: u32,
}

impl HttpExamApi {
    /// Creates a client against a versioned base URL such as
    /// `http://localhost:8080/api/v1`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        let envelope: ApiEnvelope<T> = response.json().await?;
        envelope.into_data()
    }

    async fn post_ack<B: Serialize>(&self, path: &str, body: Option<&B>) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let mut request = self.client.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let envelope: ApiEnvelope<serde_json::Value> = response.json().await?;
        envelope.into_ack()
    }
}

#[async_trait]
impl ExamBackend for HttpExamApi {
    async fn get_or_create_session(&self, user: &UserId) -> Result<ExamSession, ApiError> {
        let dto: SessionDto = self.get_data(&format!("/exam/{user}")).await?;
        dto.try_into()
    }

    async fn start_exam(&self, user: &UserId) -> Result<(), ApiError> {
        self.post_ack::<()>(&format!("/exam/{user}/start"), None)
            .await
    }

    async fn submit_answer(
        &self,
        user: &UserId,
        question: ExamQuestionId,
        option: OptionId,
    ) -> Result<(), ApiError> {
        let body = SubmitAnswerBody {
            exam_question_id: question.value(),
            question_option_id: option.value(),
        };
        self.post_ack(&format!("/exam/{user}/answer"), Some(&body))
            .await
    }

    async fn complete_exam(&self, user: &UserId) -> Result<(), ApiError> {
        self.post_ack::<()>(&format!("/exam/{user}/complete"), None)
            .await
    }

    async fn results(&self, user: &UserId) -> Result<ExamResults, ApiError> {
        let dto: ResultsDto = self.get_data(&format!("/exam/{user}/results")).await?;
        dto.try_into()
    }

    async fn stored_answers(&self, user: &UserId) -> Result<AnswerMap, ApiError> {
        let raw: BTreeMap<String, u64> = self.get_data(&format!("/exam/{user}/answers")).await?;
        answers_from_wire(&raw)
    }

    async fn detailed_answers(
        &self,
        user: &UserId,
    ) -> Result<BTreeMap<String, Vec<DetailedAnswer>>, ApiError> {
        let raw: BTreeMap<String, Vec<DetailedAnswerDto>> = self
            .get_data(&format!("/exam/{user}/detailed-answers"))
            .await?;
        Ok(raw
            .into_iter()
            .map(|(category, answers)| {
                (
                    category,
                    answers.into_iter().map(DetailedAnswer::from).collect(),
                )
            })
            .collect())
    }

    async fn user_dashboard(&self, user: &UserId) -> Result<DashboardDetail, ApiError> {
        let dto: DashboardDetailDto = self.get_data(&format!("/exam/{user}/dashboard")).await?;
        dto.try_into()
    }

    async fn all_users_dashboard(&self) -> Result<UserRoster, ApiError> {
        let dto: UserRosterDto = self.get_data("/dashboard/users").await?;
        dto.try_into()
    }
}

#[async_trait]
impl QuestionBank for HttpExamApi {
    async fn questions(&self, filter: &QuestionFilter) -> Result<Page<BankQuestion>, ApiError> {
        let url = self.url("/questions");
        debug!(%url, page = filter.page, limit = filter.limit, "GET");
        let mut query: Vec<(&str, String)> = vec![
            ("page", filter.page.to_string()),
            ("limit", filter.limit.to_string()),
        ];
        if let Some(category) = &filter.category {
            query.push(("category", category.clone()));
        }
        if let Some(search) = &filter.search {
            query.push(("search", search.clone()));
        }
        let response = self.client.get(&url).query(&query).send().await?;
        let envelope: ApiEnvelope<PaginatedQuestionsDto> = response.json().await?;
        Ok(envelope.into_data()?.into())
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        self.get_data("/questions/categories").await
    }

    async fn update_option_score(
        &self,
        question: QuestionId,
        option: OptionId,
        score: u32,
    ) -> Result<BankOption, ApiError> {
        let url = self.url(&format!("/questions/{question}/option/{option}/score"));
        debug!(%url, score, "PUT");
        let response = self
            .client
            .put(&url)
            .json(&UpdateScoreBody { score })
            .send()
            .await?;
        let envelope: ApiEnvelope<BankOptionDto> = response.json().await?;
        Ok(envelope.into_data()?.into())
    }

    async fn export_questions(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<ExportQuestion>, ApiError> {
        let url = self.url("/questions/export");
        debug!(%url, "GET");
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }
        // The export endpoint returns a bare array, not the envelope, so
        // the file can be saved as-is.
        let response = self.client.get(&url).query(&query).send().await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let api = HttpExamApi::new("http://localhost:8080/api/v1/");
        assert_eq!(api.base_url(), "http://localhost:8080/api/v1");
        assert_eq!(
            api.url("/exam/1234/start"),
            "http://localhost:8080/api/v1/exam/1234/start"
        );
    }
}
