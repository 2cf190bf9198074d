use std::fmt;
use std::sync::Arc;

use tracing::warn;

use exam_client::ExamBackend;
use exam_core::Countdown;
use exam_core::model::{
    AnswerMap, ExamQuestion, ExamQuestionId, ExamSession, ExamStatus, OptionId, UserId,
};

use crate::error::ControllerError;

/// What loading a session resolves to: a live board, or a redirect when
/// the backend reports a terminal session.
#[derive(Debug)]
pub enum LoadOutcome {
    Board(Box<ExamSessionController>),
    Redirect(ExamStatus),
}

/// Client-side owner of one exam attempt.
///
/// Holds the cached session, the acknowledged answers and the current
/// question index, and sequences every transition against the backend.
/// The backend stays authoritative throughout; this struct never invents
/// state it was not told about.
pub struct ExamSessionController {
    backend: Arc<dyn ExamBackend>,
    user_id: UserId,
    session: ExamSession,
    answers: AnswerMap,
    current: usize,
}

impl ExamSessionController {
    /// Get-or-create the user's session and prepare the board.
    ///
    /// A terminal session resolves to `LoadOutcome::Redirect` without a
    /// controller ever existing, so the question board cannot render for
    /// it. For an `IN_PROGRESS` session, previously stored answers are
    /// merged in before returning.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api` when the initial fetch fails. A
    /// failure while fetching stored answers is logged and treated as an
    /// empty map, matching the non-blocking reload contract.
    pub async fn load(
        backend: Arc<dyn ExamBackend>,
        user_id: UserId,
    ) -> Result<LoadOutcome, ControllerError> {
        let session = backend.get_or_create_session(&user_id).await?;
        if session.status().is_terminal() {
            return Ok(LoadOutcome::Redirect(session.status()));
        }

        let answers = if session.status() == ExamStatus::InProgress {
            match backend.stored_answers(&user_id).await {
                Ok(answers) => answers,
                Err(err) => {
                    warn!(user = %user_id, error = %err, "failed to load stored answers");
                    AnswerMap::new()
                }
            }
        } else {
            AnswerMap::new()
        };

        Ok(LoadOutcome::Board(Box::new(Self {
            backend,
            user_id,
            session,
            answers,
            current: 0,
        })))
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn session(&self) -> &ExamSession {
        &self.session
    }

    #[must_use]
    pub fn status(&self) -> ExamStatus {
        self.session.status()
    }

    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.session.status() == ExamStatus::InProgress
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&ExamQuestion> {
        self.session.question(self.current)
    }

    /// Countdown against the server-issued deadline, available once the
    /// exam is running.
    #[must_use]
    pub fn countdown(&self) -> Option<Countdown> {
        self.is_in_progress()
            .then(|| Countdown::new(self.session.expires_at()))
    }

    /// Moves the board to another question. Pure navigation: never calls
    /// the backend, and refused until the session is in progress.
    pub fn select_question(&mut self, index: usize) -> bool {
        if !self.is_in_progress() || index >= self.session.total_questions() {
            return false;
        }
        self.current = index;
        true
    }

    /// Starts the exam, then re-fetches the session so the deadline is
    /// the server's, not a local guess.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::AlreadyStarted` unless the session is
    /// `NOT_STARTED`, and `ControllerError::Api` for backend failures.
    pub async fn start(&mut self) -> Result<(), ControllerError> {
        if self.session.status() != ExamStatus::NotStarted {
            return Err(ControllerError::AlreadyStarted);
        }
        self.backend.start_exam(&self.user_id).await?;
        self.session = self.backend.get_or_create_session(&self.user_id).await?;
        Ok(())
    }

    /// Submits one answer, fire-and-confirm.
    ///
    /// The local map mutates only after the backend acknowledges. A
    /// failure leaves prior state untouched and is logged rather than
    /// surfaced; the user keeps navigating and retries by re-selecting.
    /// Returns whether the answer was recorded.
    pub async fn submit_answer(&mut self, question: ExamQuestionId, option: OptionId) -> bool {
        if !self.is_in_progress() {
            warn!(user = %self.user_id, %question, "answer ignored: exam not in progress");
            return false;
        }
        match self
            .backend
            .submit_answer(&self.user_id, question, option)
            .await
        {
            Ok(()) => {
                self.answers.record(question, option);
                true
            }
            Err(err) => {
                warn!(user = %self.user_id, %question, error = %err, "answer submission failed");
                false
            }
        }
    }

    /// Explicit finish, guarded by at least one recorded answer.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NothingAnswered` on an empty map,
    /// `ControllerError::NotInProgress` before start, and
    /// `ControllerError::Api` when completion fails (the session stays
    /// `IN_PROGRESS` so the caller can retry).
    pub async fn finish(&mut self) -> Result<(), ControllerError> {
        if !self.is_in_progress() {
            return Err(ControllerError::NotInProgress);
        }
        if self.answers.is_empty() {
            return Err(ControllerError::NothingAnswered);
        }
        self.complete().await
    }

    /// Timer-driven completion: unconditional, no answered-count guard.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Api` when completion fails; the caller
    /// may invoke this again as the retry path.
    pub async fn finish_expired(&mut self) -> Result<(), ControllerError> {
        self.complete().await
    }

    async fn complete(&mut self) -> Result<(), ControllerError> {
        self.backend.complete_exam(&self.user_id).await?;
        self.session.set_status(ExamStatus::Completed);
        Ok(())
    }
}

impl fmt::Debug for ExamSessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExamSessionController")
            .field("user_id", &self.user_id)
            .field("status", &self.session.status())
            .field("answered", &self.answers.len())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
