use std::collections::BTreeMap;

use dioxus::prelude::*;
use dioxus_router::use_navigator;

use exam_core::model::{CategoryResult, DetailedAnswer, ExamResults, UserId};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::format_datetime;

#[derive(Clone, Debug, PartialEq)]
struct ResultsData {
    results: ExamResults,
}

/// Read-only results page: summary, category breakdown, per-category
/// answer review. Every number on it came from the backend.
#[component]
pub fn ResultsView(user_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let results_service = ctx.results();

    let mut selected_category = use_signal(|| None::<String>);

    let service_for_resource = results_service.clone();
    let user_for_resource = user_id.clone();
    let resource = use_resource(move || {
        let service = service_for_resource.clone();
        let user_id = user_for_resource.clone();
        async move {
            let user: UserId = user_id.parse().map_err(|_| ViewError::InvalidUser)?;
            let results = service.results(&user).await.map_err(ViewError::from)?;
            Ok::<_, ViewError>(ResultsData { results })
        }
    });
    let state = view_state_from_resource(&resource);

    let detail_resource = {
        let service = results_service.clone();
        let user_id = user_id.clone();
        use_resource(move || {
            let service = service.clone();
            let user_id = user_id.clone();
            let wanted = selected_category();
            async move {
                if wanted.is_none() {
                    return Ok::<_, ViewError>(None);
                }
                let user: UserId = user_id.parse().map_err(|_| ViewError::InvalidUser)?;
                let detailed = service
                    .detailed_answers(&user)
                    .await
                    .map_err(ViewError::from)?;
                Ok(Some(detailed))
            }
        })
    };

    rsx! {
        div { class: "page results-page",
            h2 { "Exam Completed" }

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
                            onclick: move |_| {
                                let mut resource = resource;
                                resource.restart();
                            },
                            "Retry"
                        }
                    }
                },
                ViewState::Ready(data) => rsx! {
                    Summary { results: data.results.clone() }
                    CategoryTable {
                        categories: data.results.results_by_category.clone(),
                        on_detail: move |category: String| selected_category.set(Some(category)),
                    }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let _ = navigator.push(Route::Login {});
                        },
                        "Back to Home"
                    }
                },
            }

            if let Some(category) = selected_category() {
                DetailModal {
                    category,
                    detail: view_state_from_resource(&detail_resource),
                    on_close: move |()| selected_category.set(None),
                }
            }
        }
    }
}

#[component]
fn Summary(results: ExamResults) -> Element {
    let summary = results.summary;
    let verdict = if summary.is_passed { "Passed" } else { "Failed" };
    let verdict_class = if summary.is_passed {
        "badge badge--pass"
    } else {
        "badge badge--fail"
    };

    rsx! {
        dl { class: "summary card",
            dt { "Overall Grade" }
            dd { "{summary.overall_grade}" }

            dt { "Score" }
            dd { "{summary.total_score} / {summary.max_score}" }

            dt { "Percentage" }
            dd { {format!("{:.1}%", summary.overall_percentage)} }

            dt { "Answered" }
            dd { "{summary.total_answered} / {summary.total_questions}" }

            dt { "Completed" }
            dd { "{format_datetime(summary.completed_at)}" }

            dt { "Status" }
            dd {
                span { class: verdict_class, "{verdict}" }
            }
        }
    }
}

#[component]
fn CategoryTable(
    categories: Vec<CategoryResult>,
    on_detail: EventHandler<String>,
) -> Element {
    rsx! {
        h5 { "Category Breakdown" }
        table { class: "table",
            thead {
                tr {
                    th { "Category" }
                    th { "Score" }
                    th { "Grade" }
                    th { "Passed" }
                    th { "Detail" }
                }
            }
            tbody {
                for category in categories {
                    CategoryRow { category, on_detail }
                }
            }
        }
    }
}

#[component]
fn CategoryRow(category: CategoryResult, on_detail: EventHandler<String>) -> Element {
    let name = category.category.clone();
    let passed = if category.is_passed { "Yes" } else { "No" };
    rsx! {
        tr {
            td { "{category.category}" }
            td { "{category.total_score} / {category.max_score}" }
            td { "{category.grade}" }
            td { "{passed}" }
            td {
                button {
                    class: "btn btn-secondary btn-sm",
                    r#type: "button",
                    onclick: move |_| on_detail.call(name.clone()),
                    "View Detail"
                }
            }
        }
    }
}

#[component]
fn DetailModal(
    category: String,
    detail: ViewState<Option<BTreeMap<String, Vec<DetailedAnswer>>>>,
    on_close: EventHandler<()>,
) -> Element {
    let answers: Vec<DetailedAnswer> = match &detail {
        ViewState::Ready(Some(map)) => map.get(&category).cloned().unwrap_or_default(),
        _ => Vec::new(),
    };

    rsx! {
        div { class: "modal-backdrop", onclick: move |_| on_close.call(()) }
        div { class: "modal",
            div { class: "modal__content card",
                header { class: "modal__header",
                    h5 { "Answer Detail — {category}" }
                    button {
                        class: "modal__close",
                        r#type: "button",
                        onclick: move |_| on_close.call(()),
                        "Close"
                    }
                }
                div { class: "modal__body",
                    match detail {
                        ViewState::Loading | ViewState::Idle => rsx! {
                            p { "Loading..." }
                        },
                        ViewState::Error(err) => rsx! {
                            p { class: "alert alert--error", "{err.message()}" }
                        },
                        ViewState::Ready(_) => rsx! {
                            if answers.is_empty() {
                                p { "No answered questions in this category." }
                            } else {
                                for answer in answers {
                                    AnswerDetailCard { answer }
                                }
                            }
                        },
                    }
                }
            }
        }
    }
}

#[component]
fn AnswerDetailCard(answer: DetailedAnswer) -> Element {
    let verdict_class = if answer.is_correct {
        "answer answer--correct"
    } else {
        "answer answer--wrong"
    };
    rsx! {
        div { class: verdict_class,
            p { class: "answer__question", "{answer.question_text}" }
            p { class: "answer__selected",
                "Your answer: {answer.selected_option} (+{answer.score}/{answer.max_score})"
            }
            if !answer.is_correct {
                p { class: "answer__correct",
                    "Best answer: {answer.correct_option} (+{answer.correct_score})"
                }
            }
            p { class: "answer__meta", "{format_datetime(answer.answered_at)}" }
        }
    }
}
