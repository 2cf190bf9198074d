use std::collections::BTreeMap;
use std::sync::Arc;

use exam_client::ExamBackend;
use exam_core::model::{DetailedAnswer, ExamResults, UserId};

use crate::error::ResultsError;

/// Read side of the results page. Everything here is display data the
/// backend computed; the client adds nothing.
#[derive(Clone)]
pub struct ResultsService {
    backend: Arc<dyn ExamBackend>,
}

impl ResultsService {
    #[must_use]
    pub fn new(backend: Arc<dyn ExamBackend>) -> Self {
        Self { backend }
    }

    /// Summary plus category breakdown of a completed exam.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError` for backend failures, including "no
    /// completed exam" refusals.
    pub async fn results(&self, user: &UserId) -> Result<ExamResults, ResultsError> {
        Ok(self.backend.results(user).await?)
    }

    /// Per-category question/answer review for the detail modal.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError` for backend failures.
    pub async fn detailed_answers(
        &self,
        user: &UserId,
    ) -> Result<BTreeMap<String, Vec<DetailedAnswer>>, ResultsError> {
        Ok(self.backend.detailed_answers(user).await?)
    }
}
