use chrono::{DateTime, Utc};
use dioxus::prelude::*;
use dioxus_router::use_navigator;

use exam_core::Countdown;
use exam_core::model::{ExamQuestion, ExamStatus, OptionId};
use services::{CategoryGroup, NavigatorEntry, QuestionStatus};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ExamIntent, ExamStart, ExamVm, countdown_class, format_countdown, load_exam};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LastAction {
    Load,
    Start,
    Finish,
    Expire,
}

/// The exam board: start gate, question card, category sidebar, countdown
/// and completion, all driven by the session controller.
#[component]
pub fn ExamView(user_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let error = use_signal(|| None::<ViewError>);
    let vm = use_signal(|| None::<ExamVm>);
    let last_action = use_signal(|| None::<LastAction>);
    let remaining = use_signal(|| None::<u32>);
    let mut armed_deadline = use_signal(|| None::<DateTime<Utc>>);
    let redirecting = use_signal(|| false);

    let backend = ctx.backend();
    let user_for_resource = user_id.clone();
    let resource = use_resource(move || {
        let backend = backend.clone();
        let user_id = user_for_resource.clone();
        let mut error = error;
        let mut vm = vm;
        let mut last_action = last_action;
        let mut redirecting = redirecting;

        async move {
            last_action.set(Some(LastAction::Load));
            match load_exam(backend, &user_id).await? {
                ExamStart::Board(loaded) => {
                    vm.set(Some(loaded));
                    error.set(None);
                }
                ExamStart::Redirect => {
                    // Terminal session: the board never renders.
                    redirecting.set(true);
                    let _ = navigator.push(Route::Results { user_id });
                }
            }
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    let user_for_dispatch = user_id.clone();
    let dispatch = use_callback(move |intent: ExamIntent| {
        let mut error = error;
        let mut vm = vm;
        let mut last_action = last_action;
        let user_id = user_for_dispatch.clone();

        if let ExamIntent::Goto(index) = intent {
            if let Some(vm) = vm.write().as_mut() {
                vm.goto(index);
            }
            return;
        }

        spawn(async move {
            let taken = vm.write().take();
            let Some(mut value) = taken else {
                return;
            };

            match intent {
                ExamIntent::Start => {
                    last_action.set(Some(LastAction::Start));
                    match value.start().await {
                        Ok(()) => error.set(None),
                        Err(err) => error.set(Some(err)),
                    }
                    vm.set(Some(value));
                }
                ExamIntent::Select { question, option } => {
                    // Fire-and-confirm: a failed submit is logged by the
                    // controller and the board stays usable.
                    let _ = value.select_option(question, option).await;
                    vm.set(Some(value));
                }
                ExamIntent::Finish | ExamIntent::Expire => {
                    last_action.set(Some(if intent == ExamIntent::Finish {
                        LastAction::Finish
                    } else {
                        LastAction::Expire
                    }));
                    let result = if intent == ExamIntent::Finish {
                        value.finish().await
                    } else {
                        value.finish_expired().await
                    };
                    vm.set(Some(value));
                    match result {
                        Ok(_) => {
                            error.set(None);
                            let _ = navigator.push(Route::Results { user_id });
                        }
                        Err(err) => error.set(Some(err)),
                    }
                }
                ExamIntent::Goto(_) => {}
            }
        });
    });

    // One countdown task per armed deadline. The task recomputes once per
    // second and dispatches the expiry exactly once.
    use_effect(move || {
        let deadline = vm
            .read()
            .as_ref()
            .filter(|vm| vm.is_in_progress())
            .map(ExamVm::expires_at);
        let Some(deadline) = deadline else { return };
        if *armed_deadline.peek() == Some(deadline) {
            return;
        }
        armed_deadline.set(Some(deadline));

        let mut remaining = remaining;
        spawn(async move {
            let mut countdown = Countdown::new(deadline);
            loop {
                let tick = countdown.tick(Utc::now());
                remaining.set(Some(tick.remaining_seconds));
                if tick.just_expired {
                    dispatch.call(ExamIntent::Expire);
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
            }
        });
    });

    let retry = use_callback(move |()| match last_action() {
        Some(LastAction::Start) => dispatch.call(ExamIntent::Start),
        Some(LastAction::Finish) => dispatch.call(ExamIntent::Finish),
        Some(LastAction::Expire) => dispatch.call(ExamIntent::Expire),
        Some(LastAction::Load) | None => {
            let mut resource = resource;
            resource.restart();
        }
    });

    let mut dismissable_error = error;

    rsx! {
        div { class: "page exam-page",
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    div { class: "alert alert--error",
                        p { "{err.message()}" }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            onclick: move |_| retry.call(()),
                            "Retry"
                        }
                    }
                },
                ViewState::Ready(()) => rsx! {
                    if redirecting() {
                        p { "Redirecting to results..." }
                    } else {
                        Board {
                            vm,
                            error: dismissable_error,
                            remaining,
                            on_intent: dispatch,
                            on_retry: retry,
                            on_dismiss: move |()| dismissable_error.set(None),
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn Board(
    vm: Signal<Option<ExamVm>>,
    error: Signal<Option<ViewError>>,
    remaining: Signal<Option<u32>>,
    on_intent: Callback<ExamIntent>,
    on_retry: Callback<()>,
    on_dismiss: Callback<()>,
) -> Element {
    let vm_guard = vm.read();
    let Some(vm_ref) = vm_guard.as_ref() else {
        return rsx! {
            p { "Working..." }
        };
    };

    let status = vm_ref.status();
    let user_label = vm_ref.user_label();
    let session_code = vm_ref.session_code();
    let duration = vm_ref.duration_minutes();
    let total = vm_ref.total_questions();
    let answered = vm_ref.answered_count();
    let can_finish = vm_ref.can_finish();
    let groups = vm_ref.navigator();
    let current_index = vm_ref.current_index();
    let in_progress = vm_ref.is_in_progress();
    let question = vm_ref.current_question().cloned();
    let selected = question
        .as_ref()
        .and_then(|question| vm_ref.selected_option(question.exam_question_id));
    let remaining_secs = remaining();
    let error_message = error.read().as_ref().map(ViewError::message);

    rsx! {
        header { class: "exam-header",
            div {
                span { class: "exam-header__user", "User: {user_label}" }
                span { class: "exam-header__session", "Session: {session_code}" }
            }
            if in_progress {
                if let Some(secs) = remaining_secs {
                    span { class: countdown_class(secs), id: "exam-timer",
                        "{format_countdown(secs)}"
                    }
                }
            }
        }

        if let Some(message) = error_message {
            div { class: "alert alert--error",
                p { "{message}" }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| on_retry.call(()),
                    "Retry"
                }
                button {
                    class: "alert__close",
                    r#type: "button",
                    onclick: move |_| on_dismiss.call(()),
                    "Dismiss"
                }
            }
        }

        div { class: "exam-layout",
            Sidebar {
                groups,
                answered,
                total,
                enabled: in_progress,
                on_intent,
            }

            section { class: "exam-main",
                if status == ExamStatus::NotStarted {
                    div { class: "card start-card",
                        h3 { "Ready to start your exam" }
                        p { "You have {duration} minutes to complete {total} questions." }
                        button {
                            class: "btn btn-primary",
                            id: "exam-start",
                            r#type: "button",
                            onclick: move |_| on_intent.call(ExamIntent::Start),
                            "Start Exam"
                        }
                    }
                } else if let Some(question) = question {
                    QuestionCard {
                        question: question.clone(),
                        number: current_index + 1,
                        selected,
                        on_intent,
                    }
                    div { class: "exam-nav",
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: current_index == 0,
                            onclick: move |_| {
                                on_intent.call(ExamIntent::Goto(current_index.saturating_sub(1)));
                            },
                            "Previous"
                        }
                        if current_index + 1 < total {
                            button {
                                class: "btn btn-primary",
                                r#type: "button",
                                onclick: move |_| on_intent.call(ExamIntent::Goto(current_index + 1)),
                                "Next"
                            }
                        } else {
                            button {
                                class: "btn btn-success",
                                id: "exam-finish",
                                r#type: "button",
                                disabled: !can_finish,
                                onclick: move |_| on_intent.call(ExamIntent::Finish),
                                "Finish Exam"
                            }
                        }
                    }
                } else {
                    p { "No questions available." }
                }
            }
        }
    }
}

#[component]
fn Sidebar(
    groups: Vec<CategoryGroup>,
    answered: usize,
    total: usize,
    enabled: bool,
    on_intent: Callback<ExamIntent>,
) -> Element {
    rsx! {
        aside { class: "exam-sidebar card",
            h6 { "Questions ({answered} / {total})" }
            for group in groups {
                SidebarGroup {
                    category: group.category,
                    entries: group.entries,
                    enabled,
                    on_intent,
                }
            }
        }
    }
}

#[component]
fn SidebarGroup(
    category: String,
    entries: Vec<NavigatorEntry>,
    enabled: bool,
    on_intent: Callback<ExamIntent>,
) -> Element {
    rsx! {
        div { class: "sidebar-group",
            h6 { class: "sidebar-group__title", "{category}" }
            div { class: "sidebar-group__cells",
                for entry in entries {
                    button {
                        class: match entry.status {
                            QuestionStatus::Current => "cell cell--current",
                            QuestionStatus::Answered => "cell cell--answered",
                            QuestionStatus::Unanswered => "cell",
                        },
                        r#type: "button",
                        disabled: !enabled,
                        onclick: move |_| on_intent.call(ExamIntent::Goto(entry.index)),
                        "{entry.index + 1}"
                    }
                }
            }
        }
    }
}

#[component]
fn QuestionCard(
    question: ExamQuestion,
    number: usize,
    selected: Option<OptionId>,
    on_intent: Callback<ExamIntent>,
) -> Element {
    let ExamQuestion {
        exam_question_id,
        category,
        question_text,
        options,
        ..
    } = question;
    rsx! {
        div { class: "card question-card",
            div { class: "question-card__head",
                span { class: "question-card__number", "Question {number}" }
                span { class: "question-card__category", "{category}" }
            }
            p { class: "question-card__text", "{question_text}" }
            div { class: "question-card__options",
                for option in options {
                    button {
                        class: if selected == Some(option.id) {
                            "option option--selected"
                        } else {
                            "option"
                        },
                        r#type: "button",
                        onclick: move |_| {
                            on_intent.call(ExamIntent::Select {
                                question: exam_question_id,
                                option: option.id,
                            });
                        },
                        "{option.option_text}"
                    }
                }
            }
        }
    }
}
