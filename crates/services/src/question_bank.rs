use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use exam_client::QuestionBank;
use exam_core::model::{
    BankOption, BankQuestion, ExportQuestion, OptionId, Page, QuestionFilter, QuestionId,
    validate_score,
};

use crate::error::BankError;

/// Delay between the last keystroke in the search box and the query it
/// triggers. Category, page and limit changes fire immediately.
pub const SEARCH_DEBOUNCE_MS: u64 = 300;

/// Ticket for one issued bank query; compare with the service to decide
/// whether the response is still the latest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTicket(u64);

/// Editor-facing service over the question bank.
///
/// Queries race freely (nothing is cancelled mid-flight), so every query
/// takes a monotonically increasing ticket and callers drop any response
/// whose ticket is no longer the newest.
pub struct QuestionBankService {
    bank: Arc<dyn QuestionBank>,
    issued: AtomicU64,
}

impl QuestionBankService {
    #[must_use]
    pub fn new(bank: Arc<dyn QuestionBank>) -> Self {
        Self {
            bank,
            issued: AtomicU64::new(0),
        }
    }

    /// Issues the next query ticket.
    pub fn begin_query(&self) -> QueryTicket {
        QueryTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while no newer query has been issued.
    #[must_use]
    pub fn is_latest(&self, ticket: QueryTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.0
    }

    /// Runs a filtered page query; returns `None` when a newer query was
    /// issued while this one was in flight (the stale response is
    /// discarded, never applied).
    ///
    /// # Errors
    ///
    /// Returns `BankError` for backend failures.
    pub async fn questions(
        &self,
        filter: &QuestionFilter,
    ) -> Result<Option<Page<BankQuestion>>, BankError> {
        let ticket = self.begin_query();
        let page = self.bank.questions(filter).await?;
        if !self.is_latest(ticket) {
            debug!(?ticket, "discarding stale question page");
            return Ok(None);
        }
        Ok(Some(page))
    }

    /// Distinct categories for the filter dropdown.
    ///
    /// # Errors
    ///
    /// Returns `BankError` for backend failures.
    pub async fn categories(&self) -> Result<Vec<String>, BankError> {
        Ok(self.bank.categories().await?)
    }

    /// Sets one option's score, confirm-then-update: the returned option
    /// is the backend's echo, and it is the only thing callers apply to
    /// local state.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Score` before any request when the value is
    /// out of range, `BankError::Api` for backend failures.
    pub async fn update_option_score(
        &self,
        question: QuestionId,
        option: OptionId,
        score: u32,
    ) -> Result<BankOption, BankError> {
        let score = validate_score(score)?;
        Ok(self.bank.update_option_score(question, option, score).await?)
    }

    /// The current filter's full collection, serialized for download.
    ///
    /// # Errors
    ///
    /// Returns `BankError` for backend failures.
    pub async fn export_json(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<String, BankError> {
        let questions: Vec<ExportQuestion> =
            self.bank.export_questions(category, search).await?;
        serde_json::to_string_pretty(&questions)
            .map_err(|err| BankError::Api(exam_client::ApiError::Decode(err.to_string())))
    }
}

/// Applies a confirmed score update to a loaded question list. Only the
/// matching option changes; everything else is untouched.
pub fn apply_score_update(questions: &mut [BankQuestion], confirmed: &BankOption) {
    if let Some(question) = questions
        .iter_mut()
        .find(|question| question.id == confirmed.question_id)
    {
        apply_score_to_question(question, confirmed);
    }
}

/// Applies a confirmed score update to one question (the open detail
/// view).
pub fn apply_score_to_question(question: &mut BankQuestion, confirmed: &BankOption) {
    if question.id != confirmed.question_id {
        return;
    }
    if let Some(option) = question
        .options
        .iter_mut()
        .find(|option| option.id == confirmed.id)
    {
        option.score = confirmed.score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_client::fixture_question;

    #[test]
    fn newest_ticket_wins() {
        let service = QuestionBankService::new(Arc::new(exam_client::InMemoryBackend::new(
            exam_core::time::fixed_now(),
            Vec::new(),
        )));
        let first = service.begin_query();
        let second = service.begin_query();
        assert!(!service.is_latest(first));
        assert!(service.is_latest(second));
    }

    #[test]
    fn confirmed_update_patches_list_and_detail() {
        let mut questions = vec![fixture_question(1, "TEKNIS"), fixture_question(2, "TEKNIS")];
        let mut detail = questions[1].clone();
        let confirmed = BankOption {
            id: OptionId::new(21),
            question_id: QuestionId::new(2),
            option_text: "Best answer 2".to_string(),
            score: 9,
        };

        apply_score_update(&mut questions, &confirmed);
        apply_score_to_question(&mut detail, &confirmed);

        assert_eq!(questions[1].options[0].score, 9);
        assert_eq!(detail.options[0].score, 9);
        // Unrelated rows keep their scores.
        assert_eq!(questions[0].options[0].score, 4);
    }

    #[test]
    fn update_ignores_other_questions() {
        let mut detail = fixture_question(1, "TEKNIS");
        let confirmed = BankOption {
            id: OptionId::new(21),
            question_id: QuestionId::new(2),
            option_text: "elsewhere".to_string(),
            score: 9,
        };
        apply_score_to_question(&mut detail, &confirmed);
        assert_eq!(detail.options[0].score, 4);
    }
}
