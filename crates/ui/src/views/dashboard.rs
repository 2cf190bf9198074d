use dioxus::prelude::*;

use exam_core::model::{DashboardDetail, ExamStatus, UserDashboard, UserId, UserRoster};
use services::{ROSTER_REFRESH_SECS, StatusFilter, filter_users};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::format_datetime;

#[derive(Clone, Debug, PartialEq)]
struct RosterData {
    roster: UserRoster,
}

fn status_badge_class(status: ExamStatus) -> &'static str {
    match status {
        ExamStatus::Completed => "badge badge--pass",
        ExamStatus::InProgress => "badge badge--live",
        ExamStatus::Expired => "badge badge--fail",
        ExamStatus::NotStarted => "badge badge--idle",
    }
}

fn format_optional(value: Option<chrono::DateTime<chrono::Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), format_datetime)
}

/// Admin roster: every user's exam state, filterable, with a per-user
/// drill-down. Refreshes itself periodically.
#[component]
pub fn DashboardView() -> Element {
    let ctx = use_context::<AppContext>();
    let roster_service = ctx.roster();

    let mut search = use_signal(String::new);
    let mut status_filter = use_signal(StatusFilter::default);
    let mut selected_user = use_signal(|| None::<String>);
    let mut refresh_started = use_signal(|| false);

    let service_for_resource = roster_service.clone();
    let resource = use_resource(move || {
        let service = service_for_resource.clone();
        async move {
            let roster = service.roster().await.map_err(ViewError::from)?;
            Ok::<_, ViewError>(RosterData { roster })
        }
    });
    let state = view_state_from_resource(&resource);

    // Periodic re-fetch, armed once.
    use_effect(move || {
        if *refresh_started.peek() {
            return;
        }
        refresh_started.set(true);
        let mut resource = resource;
        spawn(async move {
            loop {
                tokio::time::sleep(std::time::Duration::from_secs(ROSTER_REFRESH_SECS)).await;
                resource.restart();
            }
        });
    });

    let detail_resource = {
        let service = roster_service.clone();
        use_resource(move || {
            let service = service.clone();
            let wanted = selected_user();
            async move {
                let Some(raw) = wanted else {
                    return Ok::<_, ViewError>(None);
                };
                let user: UserId = raw.parse().map_err(|_| ViewError::InvalidUser)?;
                let detail = service.user_detail(&user).await.map_err(ViewError::from)?;
                Ok(Some(detail))
            }
        })
    };

    // Filtering happens client-side over the fetched roster.
    let ready_rows = match &state {
        ViewState::Ready(data) => Some((
            filter_users(&data.roster.users, &search(), status_filter()),
            data.roster.total_users,
        )),
        _ => None,
    };

    rsx! {
        div { class: "page dashboard-page",
            header { class: "page-header",
                h2 { "Exam Admin Dashboard" }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| {
                        let mut resource = resource;
                        resource.restart();
                    },
                    "Refresh"
                }
            }

            div { class: "card filters",
                label { r#for: "dashboard-search", "Search User ID" }
                input {
                    id: "dashboard-search",
                    r#type: "text",
                    value: "{search}",
                    oninput: move |evt| search.set(evt.value()),
                }
                label { r#for: "dashboard-status", "Status" }
                select {
                    id: "dashboard-status",
                    value: "{status_filter().as_str()}",
                    onchange: move |evt| {
                        status_filter.set(evt.value().parse().unwrap_or_default());
                    },
                    option { value: "ALL", "All Status" }
                    option { value: "COMPLETED", "Completed" }
                    option { value: "IN_PROGRESS", "In Progress" }
                    option { value: "NOT_STARTED", "Not Started" }
                    option { value: "EXPIRED", "Expired" }
                }
            }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading users data..." }
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
                ViewState::Ready(_) => rsx! {
                    if let Some((filtered, total)) = ready_rows.clone() {
                        RosterBody {
                            users: filtered,
                            total,
                            on_view: move |user: String| selected_user.set(Some(user)),
                        }
                    }
                },
            }

            if selected_user().is_some() {
                UserDetailModal {
                    detail: view_state_from_resource(&detail_resource),
                    on_close: move |()| selected_user.set(None),
                }
            }
        }
    }
}

#[component]
fn RosterBody(
    users: Vec<UserDashboard>,
    total: usize,
    on_view: EventHandler<String>,
) -> Element {
    let shown = users.len();
    rsx! {
        p { class: "muted", "{shown} of {total} users" }
        UserTable { users, on_view }
    }
}

#[component]
fn UserTable(users: Vec<UserDashboard>, on_view: EventHandler<String>) -> Element {
    rsx! {
        if users.is_empty() {
            p { "No users match the current filters." }
        } else {
            table { class: "table",
                thead {
                    tr {
                        th { "User" }
                        th { "Status" }
                        th { "Session" }
                        th { "Started" }
                        th { "Completed" }
                        th { "Score" }
                        th { "Grade" }
                        th { "" }
                    }
                }
                tbody {
                    for user in users {
                        UserRow { user, on_view }
                    }
                }
            }
        }
    }
}

#[component]
fn UserRow(user: UserDashboard, on_view: EventHandler<String>) -> Element {
    let user_id = user.user_id.clone();
    let score = match (user.total_score, user.max_score) {
        (Some(score), Some(max)) => format!("{score} / {max}"),
        _ => "-".to_string(),
    };
    let grade = user.grade.clone().unwrap_or_else(|| "-".to_string());
    rsx! {
        tr {
            td { "{user.user_id}" }
            td {
                span { class: status_badge_class(user.exam_status),
                    "{user.exam_status}"
                }
            }
            td { "{user.session_code}" }
            td { "{format_optional(user.started_at)}" }
            td { "{format_optional(user.completed_at)}" }
            td { "{score}" }
            td { "{grade}" }
            td {
                button {
                    class: "btn btn-secondary btn-sm",
                    r#type: "button",
                    onclick: move |_| on_view.call(user_id.clone()),
                    "View"
                }
            }
        }
    }
}

#[component]
fn UserDetailModal(
    detail: ViewState<Option<DashboardDetail>>,
    on_close: EventHandler<()>,
) -> Element {
    rsx! {
        div { class: "modal-backdrop", onclick: move |_| on_close.call(()) }
        div { class: "modal",
            div { class: "modal__content card",
                header { class: "modal__header",
                    h5 { "User Detail" }
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
                        ViewState::Ready(None) => rsx! {
                            p { "No detail available." }
                        },
                        ViewState::Ready(Some(detail)) => rsx! {
                            DetailBody { detail }
                        },
                    }
                }
            }
        }
    }
}

#[component]
fn DetailBody(detail: DashboardDetail) -> Element {
    let status = detail
        .exam_status
        .map_or_else(|| "-".to_string(), |status| status.to_string());
    rsx! {
        dl { class: "summary",
            dt { "User" }
            dd { "{detail.user_id}" }

            dt { "Has exam" }
            dd { if detail.has_exam { "Yes" } else { "No" } }

            dt { "Status" }
            dd { "{status}" }
        }

        if let Some(progress) = detail.progress_info {
            dl { class: "summary",
                dt { "Answered" }
                dd { "{progress.answered_questions} / {progress.total_questions}" }

                dt { "Remaining time" }
                dd { "{progress.remaining_seconds}s" }
            }
        }

        if let Some(results) = detail.exam_results {
            dl { class: "summary",
                dt { "Score" }
                dd { "{results.summary.total_score} / {results.summary.max_score}" }

                dt { "Grade" }
                dd { "{results.summary.overall_grade}" }

                dt { "Passed" }
                dd { if results.summary.is_passed { "Yes" } else { "No" } }
            }
        }
    }
}
