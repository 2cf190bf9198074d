//! In-memory stand-in for the exam backend.
//!
//! Implements the observable contract of the real service — get-or-create,
//! start, answer recording, completion scoring, expiry sweeps, filtered
//! pagination — against process-local state, so controller and view tests
//! can run without a server. Time is explicit: the double holds its own
//! "now" and tests advance it.

use std::collections::{BTreeMap, HashMap};
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use exam_core::model::{
    AnswerMap, BankOption, BankQuestion, CategoryResult, CategoryStats, DashboardDetail,
    DetailedAnswer, ExamOption, ExamQuestion, ExamQuestionId, ExamResults, ExamSession,
    ExamStatus, ExportOption, ExportQuestion, OptionId, Page, PageMeta, ProgressInfo, QuestionFilter,
    QuestionId, ResultSummary, SessionId, UserDashboard, UserId, UserRoster, validate_score,
};

use crate::backend::{ExamBackend, QuestionBank};
use crate::error::ApiError;

/// Percentage at or above which a category (and the exam overall) passes.
const PASS_THRESHOLD: f64 = 90.0;

fn grade_for(percentage: f64) -> &'static str {
    if percentage >= 100.0 {
        "A"
    } else if percentage >= 90.0 {
        "B"
    } else if percentage >= 80.0 {
        "C"
    } else if percentage >= 70.0 {
        "D"
    } else {
        "E"
    }
}

#[derive(Debug, Clone)]
struct StoredAnswer {
    option: OptionId,
    score: u32,
    answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct SessionQuestion {
    exam_question_id: ExamQuestionId,
    order_number: u32,
    question: BankQuestion,
}

impl SessionQuestion {
    fn max_score(&self) -> u32 {
        self.question
            .options
            .iter()
            .map(|option| option.score)
            .max()
            .unwrap_or(0)
    }

    fn best_option(&self) -> Option<&BankOption> {
        self.question
            .options
            .iter()
            .max_by_key(|option| option.score)
    }
}

#[derive(Debug)]
struct StoredSession {
    session_id: SessionId,
    user_id: UserId,
    session_code: String,
    status: ExamStatus,
    duration_minutes: u32,
    expires_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    questions: Vec<SessionQuestion>,
    answers: BTreeMap<ExamQuestionId, StoredAnswer>,
    results: Option<ExamResults>,
}

struct State {
    now: DateTime<Utc>,
    duration_minutes: u32,
    next_session_id: u64,
    bank: Vec<BankQuestion>,
    sessions: HashMap<String, StoredSession>,
    answer_failures: VecDeque<ApiError>,
    completion_failures: VecDeque<ApiError>,
    load_failures: VecDeque<ApiError>,
}

/// In-memory implementation of [`ExamBackend`] and [`QuestionBank`].
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    /// Creates a backend whose clock starts at `now` and whose bank holds
    /// the given questions.
    #[must_use]
    pub fn new(now: DateTime<Utc>, bank: Vec<BankQuestion>) -> Self {
        Self {
            state: Mutex::new(State {
                now,
                duration_minutes: 120,
                next_session_id: 1,
                bank,
                sessions: HashMap::new(),
                answer_failures: VecDeque::new(),
                completion_failures: VecDeque::new(),
                load_failures: VecDeque::new(),
            }),
        }
    }

    #[must_use]
    pub fn with_duration_minutes(self, minutes: u32) -> Self {
        self.state.lock().expect("backend state").duration_minutes = minutes;
        self
    }

    /// Moves the double's clock forward.
    pub fn advance(&self, delta: Duration) {
        let mut state = self.state.lock().expect("backend state");
        state.now += delta;
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.state.lock().expect("backend state").now
    }

    /// Queues an error for the next answer submission; the submission is
    /// rejected without touching stored state.
    pub fn inject_answer_failure(&self, error: ApiError) {
        self.state
            .lock()
            .expect("backend state")
            .answer_failures
            .push_back(error);
    }

    /// Queues an error for the next completion call.
    pub fn inject_completion_failure(&self, error: ApiError) {
        self.state
            .lock()
            .expect("backend state")
            .completion_failures
            .push_back(error);
    }

    /// Queues an error for the next get-or-create call.
    pub fn inject_load_failure(&self, error: ApiError) {
        self.state
            .lock()
            .expect("backend state")
            .load_failures
            .push_back(error);
    }

    /// The option currently stored for a question, if any.
    #[must_use]
    pub fn stored_answer(&self, user: &UserId, question: ExamQuestionId) -> Option<OptionId> {
        let state = self.state.lock().expect("backend state");
        state
            .sessions
            .get(user.as_str())
            .and_then(|session| session.answers.get(&question))
            .map(|answer| answer.option)
    }
}

impl State {
    /// Flips any in-progress session past its deadline to `EXPIRED`, like
    /// the real service does before serving reads.
    fn sweep_expired(&mut self) {
        let now = self.now;
        for session in self.sessions.values_mut() {
            if session.status == ExamStatus::InProgress && now > session.expires_at {
                session.status = ExamStatus::Expired;
            }
        }
    }

    fn create_session(&mut self, user: &UserId) -> Result<(), ApiError> {
        if self.bank.is_empty() {
            return Err(ApiError::Backend(
                "not enough questions to build an exam".to_string(),
            ));
        }

        let session_id = self.next_session_id;
        self.next_session_id += 1;

        // Contiguous category blocks in first-seen bank order, numbered
        // from one.
        let mut categories: Vec<&str> = Vec::new();
        for question in &self.bank {
            if !categories.contains(&question.category.as_str()) {
                categories.push(question.category.as_str());
            }
        }
        let mut questions = Vec::new();
        let mut order_number = 1_u32;
        for category in categories {
            for question in self.bank.iter().filter(|q| q.category == category) {
                questions.push(SessionQuestion {
                    exam_question_id: ExamQuestionId::new(
                        session_id * 1_000 + u64::from(order_number),
                    ),
                    order_number,
                    question: question.clone(),
                });
                order_number += 1;
            }
        }

        let session = StoredSession {
            session_id: SessionId::new(session_id),
            user_id: user.clone(),
            session_code: format!("EXAM_{user}_{}", self.now.timestamp()),
            status: ExamStatus::NotStarted,
            duration_minutes: self.duration_minutes,
            expires_at: self.now + Duration::minutes(i64::from(self.duration_minutes)),
            started_at: None,
            completed_at: None,
            questions,
            answers: BTreeMap::new(),
            results: None,
        };
        self.sessions.insert(user.as_str().to_string(), session);
        Ok(())
    }

    fn session(&self, user: &UserId) -> Result<&StoredSession, ApiError> {
        self.sessions
            .get(user.as_str())
            .ok_or_else(|| ApiError::Backend("Exam session not found".to_string()))
    }

    fn session_mut(&mut self, user: &UserId) -> Result<&mut StoredSession, ApiError> {
        self.sessions
            .get_mut(user.as_str())
            .ok_or_else(|| ApiError::Backend("Exam session not found".to_string()))
    }
}

impl StoredSession {
    fn to_exam_session(&self) -> Result<ExamSession, ApiError> {
        let questions = self
            .questions
            .iter()
            .map(|question| ExamQuestion {
                exam_question_id: question.exam_question_id,
                question_id: question.question.id,
                category: question.question.category.clone(),
                order_number: question.order_number,
                question_text: question.question.question_text.clone(),
                options: question
                    .question
                    .options
                    .iter()
                    .map(|option| ExamOption {
                        id: option.id,
                        option_text: option.option_text.clone(),
                    })
                    .collect(),
            })
            .collect();

        let mut stats: Vec<CategoryStats> = Vec::new();
        for question in &self.questions {
            let answered = u32::from(self.answers.contains_key(&question.exam_question_id));
            match stats
                .iter_mut()
                .find(|entry| entry.category == question.question.category)
            {
                Some(entry) => {
                    entry.total_questions += 1;
                    entry.answered_count += answered;
                }
                None => stats.push(CategoryStats {
                    category: question.question.category.clone(),
                    total_questions: 1,
                    answered_count: answered,
                }),
            }
        }

        ExamSession::new(
            self.session_id,
            self.user_id.clone(),
            self.session_code.clone(),
            self.status,
            self.duration_minutes,
            self.expires_at,
            questions,
            stats,
        )
        .map_err(|err| ApiError::Backend(err.to_string()))
    }

    fn build_results(&self, completed_at: DateTime<Utc>) -> ExamResults {
        let mut categories: Vec<&str> = Vec::new();
        for question in &self.questions {
            if !categories.contains(&question.question.category.as_str()) {
                categories.push(question.question.category.as_str());
            }
        }

        let mut by_category = Vec::new();
        for category in categories {
            let questions: Vec<&SessionQuestion> = self
                .questions
                .iter()
                .filter(|question| question.question.category == category)
                .collect();
            let max_score: u32 = questions.iter().map(|question| question.max_score()).sum();
            let mut total_score = 0_u32;
            let mut total_answered = 0_u32;
            for question in &questions {
                if let Some(answer) = self.answers.get(&question.exam_question_id) {
                    total_score += answer.score;
                    total_answered += 1;
                }
            }
            let percentage = if max_score == 0 {
                0.0
            } else {
                f64::from(total_score) / f64::from(max_score) * 100.0
            };
            by_category.push(CategoryResult {
                category: category.to_string(),
                total_questions: u32::try_from(questions.len()).unwrap_or(u32::MAX),
                total_answered,
                total_score,
                max_score,
                percentage,
                grade: grade_for(percentage).to_string(),
                is_passed: percentage >= PASS_THRESHOLD,
            });
        }

        let total_score: u32 = by_category.iter().map(|entry| entry.total_score).sum();
        let max_score: u32 = by_category.iter().map(|entry| entry.max_score).sum();
        let overall_percentage = if max_score == 0 {
            0.0
        } else {
            f64::from(total_score) / f64::from(max_score) * 100.0
        };

        ExamResults {
            summary: ResultSummary {
                session_id: self.session_id,
                user_id: self.user_id.clone(),
                total_questions: u32::try_from(self.questions.len()).unwrap_or(u32::MAX),
                total_answered: u32::try_from(self.answers.len()).unwrap_or(u32::MAX),
                total_score,
                max_score,
                overall_percentage,
                overall_grade: grade_for(overall_percentage).to_string(),
                is_passed: overall_percentage >= PASS_THRESHOLD,
                completed_at,
            },
            results_by_category: by_category,
        }
    }
}

#[async_trait]
impl ExamBackend for InMemoryBackend {
    async fn get_or_create_session(&self, user: &UserId) -> Result<ExamSession, ApiError> {
        let mut state = self.state.lock().expect("backend state");
        if let Some(error) = state.load_failures.pop_front() {
            return Err(error);
        }
        state.sweep_expired();
        if !state.sessions.contains_key(user.as_str()) {
            state.create_session(user)?;
        }
        state.session(user)?.to_exam_session()
    }

    async fn start_exam(&self, user: &UserId) -> Result<(), ApiError> {
        let mut state = self.state.lock().expect("backend state");
        let now = state.now;
        let duration = state.duration_minutes;
        let session = state.session_mut(user)?;
        match session.status {
            ExamStatus::NotStarted => {
                session.status = ExamStatus::InProgress;
                session.started_at = Some(now);
                // The deadline is armed at start; this is the value the
                // client re-fetches as authoritative.
                session.expires_at = now + Duration::minutes(i64::from(duration));
                Ok(())
            }
            ExamStatus::InProgress => Ok(()),
            ExamStatus::Completed | ExamStatus::Expired => {
                Err(ApiError::Backend("Exam session not found".to_string()))
            }
        }
    }

    async fn submit_answer(
        &self,
        user: &UserId,
        question: ExamQuestionId,
        option: OptionId,
    ) -> Result<(), ApiError> {
        let mut state = self.state.lock().expect("backend state");
        if let Some(error) = state.answer_failures.pop_front() {
            return Err(error);
        }
        let now = state.now;
        let session = state.session_mut(user)?;

        match session.status {
            ExamStatus::Completed => {
                return Err(ApiError::Backend(
                    "exam has already been completed, cannot submit more answers".to_string(),
                ));
            }
            ExamStatus::Expired => {
                return Err(ApiError::Backend(
                    "exam has expired, cannot submit answers".to_string(),
                ));
            }
            ExamStatus::NotStarted => {
                return Err(ApiError::Backend(
                    "exam has not been started yet".to_string(),
                ));
            }
            ExamStatus::InProgress => {}
        }

        if now > session.expires_at {
            session.status = ExamStatus::Expired;
            return Err(ApiError::Backend(
                "exam has expired, cannot submit answers".to_string(),
            ));
        }

        let session_question = session
            .questions
            .iter()
            .find(|candidate| candidate.exam_question_id == question)
            .ok_or_else(|| ApiError::Backend("exam question not found".to_string()))?;
        let chosen = session_question
            .question
            .options
            .iter()
            .find(|candidate| candidate.id == option)
            .ok_or_else(|| ApiError::Backend("question option not found".to_string()))?;

        let score = chosen.score;
        session.answers.insert(
            question,
            StoredAnswer {
                option,
                score,
                answered_at: now,
            },
        );
        Ok(())
    }

    async fn complete_exam(&self, user: &UserId) -> Result<(), ApiError> {
        let mut state = self.state.lock().expect("backend state");
        if let Some(error) = state.completion_failures.pop_front() {
            return Err(error);
        }
        let now = state.now;
        let session = state.session_mut(user)?;
        if session.status == ExamStatus::NotStarted {
            return Err(ApiError::Backend(
                "exam has not been started yet".to_string(),
            ));
        }
        // Completion is accepted from EXPIRED too: the auto-submit at
        // timer zero may land after the expiry sweep.
        let results = session.build_results(now);
        session.status = ExamStatus::Completed;
        session.completed_at = Some(now);
        session.results = Some(results);
        Ok(())
    }

    async fn results(&self, user: &UserId) -> Result<ExamResults, ApiError> {
        let state = self.state.lock().expect("backend state");
        let session = state.session(user)?;
        session
            .results
            .clone()
            .ok_or_else(|| ApiError::Backend("no completed exam found for this user".to_string()))
    }

    async fn stored_answers(&self, user: &UserId) -> Result<AnswerMap, ApiError> {
        let state = self.state.lock().expect("backend state");
        let Some(session) = state.sessions.get(user.as_str()) else {
            return Ok(AnswerMap::new());
        };
        if session.status.is_terminal() {
            return Ok(AnswerMap::new());
        }
        let mut answers = AnswerMap::new();
        for (question, answer) in &session.answers {
            answers.record(*question, answer.option);
        }
        Ok(answers)
    }

    async fn detailed_answers(
        &self,
        user: &UserId,
    ) -> Result<BTreeMap<String, Vec<DetailedAnswer>>, ApiError> {
        let state = self.state.lock().expect("backend state");
        let session = state.session(user)?;
        if session.status != ExamStatus::Completed {
            return Err(ApiError::Backend(
                "no completed exam found for this user".to_string(),
            ));
        }

        let mut grouped: BTreeMap<String, Vec<DetailedAnswer>> = BTreeMap::new();
        for question in &session.questions {
            let Some(answer) = session.answers.get(&question.exam_question_id) else {
                continue;
            };
            let selected = question
                .question
                .options
                .iter()
                .find(|option| option.id == answer.option);
            let best = question.best_option();
            let max_score = question.max_score();
            grouped
                .entry(question.question.category.clone())
                .or_default()
                .push(DetailedAnswer {
                    exam_question_id: question.exam_question_id,
                    question_id: question.question.id,
                    question_text: question.question.question_text.clone(),
                    selected_option: selected
                        .map(|option| option.option_text.clone())
                        .unwrap_or_default(),
                    is_correct: answer.score == max_score,
                    score: answer.score,
                    max_score,
                    correct_option: best
                        .map(|option| option.option_text.clone())
                        .unwrap_or_default(),
                    correct_score: best.map(|option| option.score).unwrap_or_default(),
                    answered_at: answer.answered_at,
                });
        }
        Ok(grouped)
    }

    async fn user_dashboard(&self, user: &UserId) -> Result<DashboardDetail, ApiError> {
        let mut state = self.state.lock().expect("backend state");
        state.sweep_expired();
        let now = state.now;
        let Some(session) = state.sessions.get(user.as_str()) else {
            return Ok(DashboardDetail {
                user_id: user.as_str().to_string(),
                has_exam: false,
                exam_status: None,
                exam_session: None,
                exam_results: None,
                progress_info: None,
            });
        };

        let progress_info = (session.status == ExamStatus::InProgress).then(|| ProgressInfo {
            total_questions: u32::try_from(session.questions.len()).unwrap_or(u32::MAX),
            answered_questions: u32::try_from(session.answers.len()).unwrap_or(u32::MAX),
            remaining_seconds: session
                .expires_at
                .signed_duration_since(now)
                .num_seconds()
                .max(0),
        });

        Ok(DashboardDetail {
            user_id: user.as_str().to_string(),
            has_exam: true,
            exam_status: Some(session.status),
            exam_session: Some(session.to_exam_session()?),
            exam_results: session.results.clone(),
            progress_info,
        })
    }

    async fn all_users_dashboard(&self) -> Result<UserRoster, ApiError> {
        let mut state = self.state.lock().expect("backend state");
        state.sweep_expired();
        let mut users: Vec<UserDashboard> = state
            .sessions
            .values()
            .map(|session| UserDashboard {
                user_id: session.user_id.as_str().to_string(),
                exam_status: session.status,
                session_code: session.session_code.clone(),
                started_at: session.started_at,
                completed_at: session.completed_at,
                total_score: session
                    .results
                    .as_ref()
                    .map(|results| results.summary.total_score),
                max_score: session
                    .results
                    .as_ref()
                    .map(|results| results.summary.max_score),
                percentage: session
                    .results
                    .as_ref()
                    .map(|results| results.summary.overall_percentage),
                grade: session
                    .results
                    .as_ref()
                    .map(|results| results.summary.overall_grade.clone()),
                is_passed: session
                    .results
                    .as_ref()
                    .map(|results| results.summary.is_passed),
            })
            .collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(UserRoster {
            total_users: users.len(),
            users,
        })
    }
}

#[async_trait]
impl QuestionBank for InMemoryBackend {
    async fn questions(&self, filter: &QuestionFilter) -> Result<Page<BankQuestion>, ApiError> {
        let state = self.state.lock().expect("backend state");
        let matches: Vec<&BankQuestion> = state
            .bank
            .iter()
            .filter(|question| {
                filter
                    .category
                    .as_ref()
                    .is_none_or(|category| &question.category == category)
            })
            .filter(|question| {
                filter.search.as_ref().is_none_or(|search| {
                    question
                        .question_text
                        .to_lowercase()
                        .contains(&search.to_lowercase())
                })
            })
            .collect();

        let total_items = u32::try_from(matches.len()).unwrap_or(u32::MAX);
        if filter.is_unbounded() {
            return Ok(Page {
                items: matches.into_iter().cloned().collect(),
                meta: PageMeta {
                    current_page: 1,
                    items_per_page: 0,
                    total_items,
                    total_pages: 1,
                },
            });
        }

        let total_pages = total_items.div_ceil(filter.limit).max(1);
        let offset = usize::try_from((filter.page.max(1) - 1) * filter.limit).unwrap_or(usize::MAX);
        let items = matches
            .into_iter()
            .skip(offset)
            .take(filter.limit as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            meta: PageMeta {
                current_page: filter.page,
                items_per_page: filter.limit,
                total_items,
                total_pages,
            },
        })
    }

    async fn categories(&self) -> Result<Vec<String>, ApiError> {
        let state = self.state.lock().expect("backend state");
        let mut categories = Vec::new();
        for question in &state.bank {
            if !categories.contains(&question.category) {
                categories.push(question.category.clone());
            }
        }
        Ok(categories)
    }

    async fn update_option_score(
        &self,
        question: QuestionId,
        option: OptionId,
        score: u32,
    ) -> Result<BankOption, ApiError> {
        let score = validate_score(score)
            .map_err(|_| ApiError::Backend("Score must be between 0 and 10".to_string()))?;
        let mut state = self.state.lock().expect("backend state");
        let bank_question = state
            .bank
            .iter_mut()
            .find(|candidate| candidate.id == question)
            .ok_or_else(|| ApiError::Backend("Question option not found".to_string()))?;
        let bank_option = bank_question
            .options
            .iter_mut()
            .find(|candidate| candidate.id == option)
            .ok_or_else(|| ApiError::Backend("Question option not found".to_string()))?;
        bank_option.score = score;
        Ok(bank_option.clone())
    }

    async fn export_questions(
        &self,
        category: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<ExportQuestion>, ApiError> {
        let state = self.state.lock().expect("backend state");
        Ok(state
            .bank
            .iter()
            .filter(|question| category.is_none_or(|category| question.category == category))
            .filter(|question| {
                search.is_none_or(|search| {
                    question
                        .question_text
                        .to_lowercase()
                        .contains(&search.to_lowercase())
                })
            })
            .enumerate()
            .map(|(index, question)| ExportQuestion {
                id: (index + 1).to_string(),
                category: question.category.clone(),
                question_text: question.question_text.clone(),
                options: question
                    .options
                    .iter()
                    .map(|option| ExportOption {
                        option_text: option.option_text.clone(),
                        score: option.score,
                    })
                    .collect(),
            })
            .collect())
    }
}

/// A small fixture bank: two categories, scored options, enough rows to
/// exercise pagination.
#[must_use]
pub fn demo_questions() -> Vec<BankQuestion> {
    let mut bank = Vec::new();
    for index in 1..=4_u64 {
        bank.push(fixture_question(index, "TEKNIS"));
    }
    for index in 5..=8_u64 {
        bank.push(fixture_question(index, "MANAJERIAL"));
    }
    bank
}

/// One fixture question with a 4-point and a 1-point option.
#[must_use]
pub fn fixture_question(id: u64, category: &str) -> BankQuestion {
    BankQuestion {
        id: QuestionId::new(id),
        category: category.to_string(),
        question_text: format!("Fixture question {id}"),
        options: vec![
            BankOption {
                id: OptionId::new(id * 10 + 1),
                question_id: QuestionId::new(id),
                option_text: format!("Best answer {id}"),
                score: 4,
            },
            BankOption {
                id: OptionId::new(id * 10 + 2),
                question_id: QuestionId::new(id),
                option_text: format!("Weak answer {id}"),
                score: 1,
            },
        ],
    }
}
