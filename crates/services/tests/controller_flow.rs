use std::sync::Arc;

use chrono::Duration;

use exam_client::{ApiError, ExamBackend, InMemoryBackend, demo_questions};
use exam_core::model::{ExamStatus, UserId};
use exam_core::time::fixed_now;
use services::{ControllerError, ExamSessionController, LoadOutcome};

fn backend() -> Arc<InMemoryBackend> {
    Arc::new(InMemoryBackend::new(fixed_now(), demo_questions()))
}

fn user() -> UserId {
    UserId::new("1234").unwrap()
}

async fn load_board(backend: &Arc<InMemoryBackend>) -> ExamSessionController {
    let outcome = ExamSessionController::load(backend.clone(), user())
        .await
        .expect("load session");
    match outcome {
        LoadOutcome::Board(controller) => *controller,
        LoadOutcome::Redirect(status) => panic!("unexpected redirect to {status}"),
    }
}

#[tokio::test]
async fn fresh_session_loads_as_not_started_board() {
    let backend = backend();
    let controller = load_board(&backend).await;
    assert_eq!(controller.status(), ExamStatus::NotStarted);
    assert!(controller.answers().is_empty());
    assert_eq!(controller.current_index(), 0);
}

#[tokio::test]
async fn terminal_session_redirects_instead_of_rendering_a_board() {
    let backend = backend();
    let mut controller = load_board(&backend).await;
    controller.start().await.unwrap();
    let question = controller.session().questions()[0].clone();
    assert!(
        controller
            .submit_answer(question.exam_question_id, question.options[0].id)
            .await
    );
    controller.finish().await.unwrap();

    let outcome = ExamSessionController::load(backend.clone(), user())
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        LoadOutcome::Redirect(ExamStatus::Completed)
    ));
}

#[tokio::test]
async fn expired_session_redirects_on_load() {
    let backend = backend();
    let mut controller = load_board(&backend).await;
    controller.start().await.unwrap();
    backend.advance(Duration::minutes(121));

    let outcome = ExamSessionController::load(backend.clone(), user())
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        LoadOutcome::Redirect(ExamStatus::Expired)
    ));
}

#[tokio::test]
async fn start_refetches_the_authoritative_deadline() {
    let backend = backend();
    let mut controller = load_board(&backend).await;

    backend.advance(Duration::minutes(7));
    controller.start().await.unwrap();

    assert_eq!(controller.status(), ExamStatus::InProgress);
    assert_eq!(
        controller.session().expires_at(),
        backend.now() + Duration::minutes(120)
    );
    let countdown = controller.countdown().expect("countdown while in progress");
    assert_eq!(countdown.remaining_seconds(backend.now()), 120 * 60);
}

#[tokio::test]
async fn navigation_is_disabled_until_started_and_never_calls_the_backend() {
    let backend = backend();
    let mut controller = load_board(&backend).await;

    assert!(!controller.select_question(2));
    assert_eq!(controller.current_index(), 0);

    controller.start().await.unwrap();
    assert!(controller.select_question(2));
    assert_eq!(controller.current_index(), 2);

    // Out-of-range stays put.
    assert!(!controller.select_question(99));
    assert_eq!(controller.current_index(), 2);
}

#[tokio::test]
async fn resubmitting_a_question_keeps_only_the_second_answer() {
    let backend = backend();
    let mut controller = load_board(&backend).await;
    controller.start().await.unwrap();

    let question = controller.session().questions()[0].clone();
    let first = question.options[0].id;
    let second = question.options[1].id;

    assert!(controller.submit_answer(question.exam_question_id, first).await);
    assert!(
        controller
            .submit_answer(question.exam_question_id, second)
            .await
    );

    assert_eq!(controller.answers().len(), 1);
    assert_eq!(
        controller.answers().selected(question.exam_question_id),
        Some(second)
    );
    // The backend agrees.
    assert_eq!(
        backend.stored_answer(&user(), question.exam_question_id),
        Some(second)
    );
}

#[tokio::test]
async fn failed_submission_leaves_the_answer_map_untouched() {
    let backend = backend();
    let mut controller = load_board(&backend).await;
    controller.start().await.unwrap();

    let question = controller.session().questions()[0].clone();
    assert!(
        controller
            .submit_answer(question.exam_question_id, question.options[0].id)
            .await
    );
    let before = controller.answers().clone();

    backend.inject_answer_failure(ApiError::Connection("socket closed".to_string()));
    let recorded = controller
        .submit_answer(question.exam_question_id, question.options[1].id)
        .await;

    assert!(!recorded);
    assert_eq!(controller.answers(), &before);
    assert_eq!(
        backend.stored_answer(&user(), question.exam_question_id),
        Some(question.options[0].id)
    );
}

#[tokio::test]
async fn answers_before_start_are_ignored_locally() {
    let backend = backend();
    let mut controller = load_board(&backend).await;
    let question = controller.session().questions()[0].clone();

    let recorded = controller
        .submit_answer(question.exam_question_id, question.options[0].id)
        .await;
    assert!(!recorded);
    assert!(controller.answers().is_empty());
}

#[tokio::test]
async fn reload_merges_stored_answers_before_the_board_renders() {
    let backend = backend();
    let mut controller = load_board(&backend).await;
    controller.start().await.unwrap();

    let questions: Vec<_> = controller.session().questions().to_vec();
    assert!(
        controller
            .submit_answer(questions[0].exam_question_id, questions[0].options[0].id)
            .await
    );
    assert!(
        controller
            .submit_answer(questions[1].exam_question_id, questions[1].options[1].id)
            .await
    );

    // A fresh load simulates the page reload.
    let reloaded = load_board(&backend).await;
    assert_eq!(reloaded.status(), ExamStatus::InProgress);
    assert_eq!(reloaded.answers().len(), 2);
    assert_eq!(
        reloaded.answers().selected(questions[0].exam_question_id),
        Some(questions[0].options[0].id)
    );
    assert_eq!(
        reloaded.answers().selected(questions[1].exam_question_id),
        Some(questions[1].options[1].id)
    );
}

#[tokio::test]
async fn finish_requires_at_least_one_answer() {
    let backend = backend();
    let mut controller = load_board(&backend).await;
    controller.start().await.unwrap();

    let err = controller.finish().await.unwrap_err();
    assert_eq!(err, ControllerError::NothingAnswered);
    assert_eq!(controller.status(), ExamStatus::InProgress);
}

#[tokio::test]
async fn expiry_completion_is_unconditional() {
    let backend = backend();
    let mut controller = load_board(&backend).await;
    controller.start().await.unwrap();

    // Empty answer map, yet the timer path completes.
    controller.finish_expired().await.unwrap();
    assert_eq!(controller.status(), ExamStatus::Completed);

    let results = backend.results(&user()).await.unwrap();
    assert_eq!(results.summary.total_answered, 0);
}

#[tokio::test]
async fn failed_completion_stays_in_progress_and_can_retry() {
    let backend = backend();
    let mut controller = load_board(&backend).await;
    controller.start().await.unwrap();

    backend.inject_completion_failure(ApiError::Backend("database busy".to_string()));
    let err = controller.finish_expired().await.unwrap_err();
    assert_eq!(
        err,
        ControllerError::Api(ApiError::Backend("database busy".to_string()))
    );
    assert_eq!(controller.status(), ExamStatus::InProgress);

    // The retry path is the same call again.
    controller.finish_expired().await.unwrap();
    assert_eq!(controller.status(), ExamStatus::Completed);
}

#[tokio::test]
async fn load_failure_surfaces_the_connection_error() {
    let backend = backend();
    backend.inject_load_failure(ApiError::Connection("refused".to_string()));

    let err = ExamSessionController::load(backend.clone(), user())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Api(ApiError::Connection(_))
    ));
    assert_eq!(err.user_message(), "Connection failed. Please try again.");
}
