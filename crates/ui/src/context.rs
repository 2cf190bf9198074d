use std::sync::Arc;

use exam_client::ExamBackend;
use services::{AccessGate, QuestionBankService, ResultsService, RosterService};

/// What the composition root must provide for the views to run.
pub trait UiApp: Send + Sync {
    fn backend(&self) -> Arc<dyn ExamBackend>;
    fn results(&self) -> Arc<ResultsService>;
    fn roster(&self) -> Arc<RosterService>;
    fn question_bank(&self) -> Arc<QuestionBankService>;
    fn access_gate(&self) -> Arc<AccessGate>;
}

#[derive(Clone)]
pub struct AppContext {
    backend: Arc<dyn ExamBackend>,
    results: Arc<ResultsService>,
    roster: Arc<RosterService>,
    question_bank: Arc<QuestionBankService>,
    access_gate: Arc<AccessGate>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            backend: app.backend(),
            results: app.results(),
            roster: app.roster(),
            question_bank: app.question_bank(),
            access_gate: app.access_gate(),
        }
    }

    #[must_use]
    pub fn backend(&self) -> Arc<dyn ExamBackend> {
        Arc::clone(&self.backend)
    }

    #[must_use]
    pub fn results(&self) -> Arc<ResultsService> {
        Arc::clone(&self.results)
    }

    #[must_use]
    pub fn roster(&self) -> Arc<RosterService> {
        Arc::clone(&self.roster)
    }

    #[must_use]
    pub fn question_bank(&self) -> Arc<QuestionBankService> {
        Arc::clone(&self.question_bank)
    }

    #[must_use]
    pub fn access_gate(&self) -> Arc<AccessGate> {
        Arc::clone(&self.access_gate)
    }
}

// This context is provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
