use exam_core::model::UserId;

use super::test_harness::{TEST_GATE_PASSWORD, ViewKind, setup_view_harness};

fn user() -> UserId {
    UserId::new("1234").unwrap()
}

#[tokio::test(flavor = "current_thread")]
async fn login_view_renders_the_form() {
    let mut harness = setup_view_harness(ViewKind::Login);
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Exam Login"), "missing heading in {html}");
    assert!(html.contains("User ID"), "missing label in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_shows_the_start_gate_for_a_fresh_session() {
    let mut harness = setup_view_harness(ViewKind::Exam("1234".to_string()));
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(
        html.contains("Ready to start your exam"),
        "missing start gate in {html}"
    );
    assert!(html.contains("Start Exam"), "missing start button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_never_renders_a_board_for_a_completed_session() {
    use exam_client::ExamBackend;
    let mut harness = setup_view_harness(ViewKind::Exam("1234".to_string()));

    // Complete the exam out-of-band before the view mounts.
    let session = harness.backend.get_or_create_session(&user()).await.unwrap();
    harness.backend.start_exam(&user()).await.unwrap();
    let question = session.questions()[0].clone();
    harness
        .backend
        .submit_answer(&user(), question.exam_question_id, question.options[0].id)
        .await
        .unwrap();
    harness.backend.complete_exam(&user()).await.unwrap();

    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(
        !html.contains("Start Exam"),
        "board rendered for terminal session: {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_renders_backend_grades_verbatim() {
    use exam_client::ExamBackend;
    let mut harness = setup_view_harness(ViewKind::Results("1234".to_string()));

    let session = harness.backend.get_or_create_session(&user()).await.unwrap();
    harness.backend.start_exam(&user()).await.unwrap();
    for question in session.questions() {
        harness
            .backend
            .submit_answer(&user(), question.exam_question_id, question.options[0].id)
            .await
            .unwrap();
    }
    harness.backend.complete_exam(&user()).await.unwrap();

    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Overall Grade"), "missing summary in {html}");
    assert!(html.contains("Passed"), "missing verdict in {html}");
    assert!(html.contains("Category Breakdown"), "missing table in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn dashboard_view_lists_every_user() {
    use exam_client::ExamBackend;
    let mut harness = setup_view_harness(ViewKind::Admin);

    harness.backend.get_or_create_session(&user()).await.unwrap();
    harness
        .backend
        .get_or_create_session(&UserId::new("5678").unwrap())
        .await
        .unwrap();

    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("1234"), "missing first user in {html}");
    assert!(html.contains("5678"), "missing second user in {html}");
    assert!(html.contains("2 of 2 users"), "missing counts in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn bank_view_is_gated_behind_the_password() {
    let mut harness = setup_view_harness(ViewKind::Bank);
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(
        html.contains("password protected"),
        "missing gate in {html}"
    );
    assert!(
        !html.contains("Question Management"),
        "editor rendered while locked: {html}"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn bank_view_renders_the_editor_once_unlocked() {
    let mut harness = setup_view_harness(ViewKind::Bank);
    assert!(harness.access_gate.unlock(TEST_GATE_PASSWORD));

    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(
        html.contains("Question Management"),
        "missing editor in {html}"
    );
    assert!(
        html.contains("Fixture question 1"),
        "missing question rows in {html}"
    );
}
