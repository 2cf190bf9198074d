use std::sync::Arc;

use chrono::{DateTime, Utc};

use exam_client::ExamBackend;
use exam_core::Countdown;
use exam_core::model::{ExamQuestion, ExamQuestionId, ExamStatus, OptionId, UserId};
use services::{CategoryGroup, ExamSessionController, LoadOutcome, build_navigator};

use crate::views::ViewError;

/// Everything the exam board can ask for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExamIntent {
    Start,
    Select {
        question: ExamQuestionId,
        option: OptionId,
    },
    Goto(usize),
    Finish,
    Expire,
}

/// Result of loading the exam route.
pub enum ExamStart {
    Board(ExamVm),
    /// Terminal session: go straight to the results page.
    Redirect,
}

/// View model over the session controller; the board reads state from
/// here and pushes intents back through it.
pub struct ExamVm {
    controller: ExamSessionController,
}

impl ExamVm {
    #[must_use]
    pub fn new(controller: ExamSessionController) -> Self {
        Self { controller }
    }

    #[must_use]
    pub fn user_label(&self) -> String {
        self.controller.user_id().to_string()
    }

    #[must_use]
    pub fn session_code(&self) -> String {
        self.controller.session().session_code().to_string()
    }

    #[must_use]
    pub fn status(&self) -> ExamStatus {
        self.controller.status()
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.controller.is_in_progress()
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.controller.session().duration_minutes()
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.controller.session().total_questions()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.controller.answers().len()
    }

    #[must_use]
    pub fn can_finish(&self) -> bool {
        self.is_in_progress() && !self.controller.answers().is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.controller.current_index()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&ExamQuestion> {
        self.controller.current_question()
    }

    #[must_use]
    pub fn selected_option(&self, question: ExamQuestionId) -> Option<OptionId> {
        self.controller.answers().selected(question)
    }

    #[must_use]
    pub fn navigator(&self) -> Vec<CategoryGroup> {
        build_navigator(
            self.controller.session().questions(),
            self.controller.answers(),
            self.controller.current_index(),
        )
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.controller.session().expires_at()
    }

    #[must_use]
    pub fn countdown(&self) -> Option<Countdown> {
        self.controller.countdown()
    }

    pub fn goto(&mut self, index: usize) -> bool {
        self.controller.select_question(index)
    }

    /// # Errors
    ///
    /// Returns `ViewError` when the start transition fails.
    pub async fn start(&mut self) -> Result<(), ViewError> {
        self.controller.start().await.map_err(ViewError::from)
    }

    /// Fire-and-confirm answer submission; returns whether it stuck.
    pub async fn select_option(&mut self, question: ExamQuestionId, option: OptionId) -> bool {
        self.controller.submit_answer(question, option).await
    }

    /// # Errors
    ///
    /// Returns `ViewError` when the guard rejects or completion fails.
    pub async fn finish(&mut self) -> Result<(), ViewError> {
        self.controller.finish().await.map_err(ViewError::from)
    }

    /// # Errors
    ///
    /// Returns `ViewError` when completion fails; calling again retries.
    pub async fn finish_expired(&mut self) -> Result<(), ViewError> {
        self.controller
            .finish_expired()
            .await
            .map_err(ViewError::from)
    }
}

/// # Errors
///
/// Returns `ViewError::InvalidUser` for an unusable user ID and the
/// mapped API error when the initial fetch fails.
pub async fn load_exam(
    backend: Arc<dyn ExamBackend>,
    user_id: &str,
) -> Result<ExamStart, ViewError> {
    let user_id: UserId = user_id.parse().map_err(|_| ViewError::InvalidUser)?;
    match ExamSessionController::load(backend, user_id).await {
        Ok(LoadOutcome::Board(controller)) => Ok(ExamStart::Board(ExamVm::new(*controller))),
        Ok(LoadOutcome::Redirect(_)) => Ok(ExamStart::Redirect),
        Err(err) => Err(ViewError::from(err)),
    }
}
