use dioxus::prelude::*;

use exam_core::model::{BankQuestion, OptionId, PageMeta, QuestionFilter, QuestionId};
use services::{SEARCH_DEBOUNCE_MS, apply_score_to_question, apply_score_update};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};

/// Maximum page buttons shown at once.
const MAX_VISIBLE_PAGES: u32 = 5;

/// The page numbers rendered around the current one.
fn pagination_range(current: u32, total_pages: u32) -> Vec<u32> {
    if total_pages <= 1 {
        return Vec::new();
    }
    let mut start = current.saturating_sub(2).max(1);
    let end = (start + MAX_VISIBLE_PAGES - 1).min(total_pages);
    if end - start + 1 < MAX_VISIBLE_PAGES {
        start = end.saturating_sub(MAX_VISIBLE_PAGES - 1).max(1);
    }
    (start..=end).collect()
}

/// Question-bank route: the access gate in front of the editor.
#[component]
pub fn BankView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut unlocked = use_signal(|| ctx.access_gate().is_unlocked());

    rsx! {
        if unlocked() {
            Editor { on_lock: move |()| unlocked.set(false) }
        } else {
            GateForm { on_unlock: move |()| unlocked.set(true) }
        }
    }
}

#[component]
fn GateForm(on_unlock: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let mut password = use_signal(String::new);
    let mut error = use_signal(|| None::<String>);

    let gate = ctx.access_gate();
    let try_unlock = use_callback(move |()| {
        if gate.unlock(&password()) {
            error.set(None);
            on_unlock.call(());
        } else {
            error.set(Some("Incorrect password. Please try again.".to_string()));
        }
    });

    rsx! {
        div { class: "page gate-page",
            div { class: "card gate-card",
                h3 { "Question Bank" }
                p { "This area is password protected. Enter the password to continue." }
                form {
                    onsubmit: move |evt: FormEvent| {
                        evt.prevent_default();
                        try_unlock.call(());
                    },
                    label { r#for: "gate-password", "Password" }
                    input {
                        id: "gate-password",
                        r#type: "password",
                        value: "{password}",
                        oninput: move |evt| password.set(evt.value()),
                    }
                    if let Some(message) = error() {
                        p { class: "alert alert--error", "{message}" }
                    }
                    button { class: "btn btn-primary", r#type: "submit", "Unlock" }
                }
            }
        }
    }
}

#[component]
fn Editor(on_lock: EventHandler<()>) -> Element {
    let ctx = use_context::<AppContext>();
    let bank = ctx.question_bank();

    let mut category = use_signal(String::new);
    let mut search_input = use_signal(String::new);
    let search = use_signal(String::new);
    let mut page = use_signal(|| 1_u32);
    let mut limit = use_signal(|| QuestionFilter::DEFAULT_LIMIT);

    let questions = use_signal(Vec::<BankQuestion>::new);
    let meta = use_signal(|| None::<PageMeta>);
    let loading = use_signal(|| false);
    let mut error = use_signal(|| None::<ViewError>);
    let mut success = use_signal(|| None::<String>);
    let modal = use_signal(|| None::<BankQuestion>);
    let updating = use_signal(|| false);

    let categories_resource = {
        let bank = bank.clone();
        use_resource(move || {
            let bank = bank.clone();
            async move {
                bank.categories()
                    .await
                    .map_err(|err| ViewError::from(err))
            }
        })
    };
    let categories = match view_state_from_resource(&categories_resource) {
        ViewState::Ready(values) => values,
        _ => Vec::new(),
    };

    // The search box is debounced; everything else queries immediately.
    let mut debounce_epoch = use_signal(|| 0_u64);
    use_effect(move || {
        let input = search_input();
        let epoch = *debounce_epoch.peek() + 1;
        debounce_epoch.set(epoch);
        let mut search = search;
        let mut page = page;
        spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(SEARCH_DEBOUNCE_MS)).await;
            if *debounce_epoch.peek() != epoch {
                return;
            }
            if *search.peek() != input {
                page.set(1);
                search.set(input);
            }
        });
    });

    let load_questions = {
        let bank = bank.clone();
        use_callback(move |()| {
            let bank = bank.clone();
            let filter = QuestionFilter {
                category: Some(category()).filter(|value| !value.is_empty()),
                search: Some(search()).filter(|value| !value.is_empty()),
                page: page(),
                limit: limit(),
            };
            let mut questions = questions;
            let mut meta = meta;
            let mut loading = loading;
            let mut error = error;
            spawn(async move {
                loading.set(true);
                match bank.questions(&filter).await {
                    Ok(Some(fetched)) => {
                        questions.set(fetched.items);
                        meta.set(Some(fetched.meta));
                        error.set(None);
                    }
                    // A newer query owns the view; this response is stale.
                    Ok(None) => {}
                    Err(err) => error.set(Some(ViewError::from(err))),
                }
                loading.set(false);
            });
        })
    };

    let mut last_query = use_signal(|| None::<(String, String, u32, u32)>);
    use_effect(move || {
        let key = (category(), search(), page(), limit());
        if last_query.peek().as_ref() != Some(&key) {
            last_query.set(Some(key));
            load_questions.call(());
        }
    });

    let update_score = {
        let bank = bank.clone();
        use_callback(move |(question_id, option_id, score): (QuestionId, OptionId, u32)| {
            let bank = bank.clone();
            let mut questions = questions;
            let mut modal = modal;
            let mut updating = updating;
            let mut error = error;
            let mut success = success;
            spawn(async move {
                updating.set(true);
                error.set(None);
                success.set(None);
                match bank.update_option_score(question_id, option_id, score).await {
                    Ok(confirmed) => {
                        // Confirm-then-update: only the backend's echo is
                        // applied, to the list and the open modal alike.
                        apply_score_update(questions.write().as_mut_slice(), &confirmed);
                        if let Some(open) = modal.write().as_mut() {
                            apply_score_to_question(open, &confirmed);
                        }
                        success.set(Some("Score updated successfully!".to_string()));
                    }
                    Err(err) => error.set(Some(ViewError::from(err))),
                }
                updating.set(false);
            });
        })
    };

    let export = {
        let bank = bank.clone();
        use_callback(move |()| {
            let bank = bank.clone();
            let category = Some(category()).filter(|value| !value.is_empty());
            let search = Some(search()).filter(|value| !value.is_empty());
            let mut error = error;
            let mut success = success;
            spawn(async move {
                match bank
                    .export_json(category.as_deref(), search.as_deref())
                    .await
                {
                    Ok(json) => match std::fs::write("questions-export.json", json) {
                        Ok(()) => success.set(Some("Saved questions-export.json".to_string())),
                        Err(err) => error.set(Some(ViewError::Backend(err.to_string()))),
                    },
                    Err(err) => error.set(Some(ViewError::from(err))),
                }
            });
        })
    };

    let gate_for_lock = ctx.access_gate();
    let lock_editor = use_callback(move |()| {
        gate_for_lock.lock();
        on_lock.call(());
    });

    let error_message = error.read().as_ref().map(ViewError::message);
    let success_message = success();
    let meta_value = meta();
    let total_items = meta_value.map_or(0, |meta| meta.total_items);
    let total_pages = meta_value.map_or(0, |meta| meta.total_pages);
    let current_page = page();
    let current_limit = limit();
    let questions_list = questions();
    let mut modal_signal = modal;

    rsx! {
        div { class: "page bank-page",
            header { class: "page-header",
                h2 { "Question Management" }
                div {
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| export.call(()),
                        "Download JSON"
                    }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| lock_editor.call(()),
                        "Lock"
                    }
                }
            }

            div { class: "card filters",
                label { r#for: "bank-category", "Category" }
                select {
                    id: "bank-category",
                    value: "{category}",
                    onchange: move |evt| {
                        page.set(1);
                        category.set(evt.value());
                    },
                    option { value: "", "All Categories" }
                    for name in categories {
                        option { value: "{name}", "{name}" }
                    }
                }
                label { r#for: "bank-search", "Search" }
                input {
                    id: "bank-search",
                    r#type: "text",
                    placeholder: "Search by question text...",
                    value: "{search_input}",
                    oninput: move |evt| search_input.set(evt.value()),
                }
                label { r#for: "bank-limit", "Items per page" }
                select {
                    id: "bank-limit",
                    value: "{current_limit}",
                    onchange: move |evt| {
                        page.set(1);
                        limit.set(evt.value().parse().unwrap_or(QuestionFilter::DEFAULT_LIMIT));
                    },
                    option { value: "10", "10" }
                    option { value: "20", "20" }
                    option { value: "25", "25" }
                    option { value: "75", "75" }
                    option { value: "0", "All" }
                }
            }

            if let Some(message) = error_message {
                div { class: "alert alert--error",
                    p { "{message}" }
                    button {
                        class: "alert__close",
                        r#type: "button",
                        onclick: move |_| error.set(None),
                        "Dismiss"
                    }
                }
            }
            if let Some(message) = success_message {
                div { class: "alert alert--success",
                    p { "{message}" }
                    button {
                        class: "alert__close",
                        r#type: "button",
                        onclick: move |_| success.set(None),
                        "Dismiss"
                    }
                }
            }

            div { class: "card",
                header { class: "card__header",
                    h5 { "Questions" }
                    span { class: "badge badge--idle", "{total_items} total" }
                }
                if loading() {
                    p { "Loading questions..." }
                } else if questions_list.is_empty() {
                    p { "No questions found." }
                } else {
                    QuestionTable {
                        questions: questions_list.clone(),
                        page: current_page,
                        limit: current_limit,
                        on_edit: move |question: BankQuestion| modal_signal.set(Some(question)),
                    }
                    PaginationRow {
                        current_page,
                        total_pages,
                        total_items,
                        limit: current_limit,
                        shown: questions_list.len(),
                        on_page: move |target: u32| page.set(target),
                    }
                }
            }

            if modal().is_some() {
                ScoreModal {
                    modal,
                    updating: updating(),
                    on_update: update_score,
                    on_close: move |()| modal_signal.set(None),
                }
            }
        }
    }
}

#[component]
fn QuestionTable(
    questions: Vec<BankQuestion>,
    page: u32,
    limit: u32,
    on_edit: EventHandler<BankQuestion>,
) -> Element {
    let base = if limit == 0 { 0 } else { (page - 1) * limit };
    rsx! {
        table { class: "table",
            thead {
                tr {
                    th { "No" }
                    th { "Category" }
                    th { "Question" }
                    th { "Options" }
                    th { "" }
                }
            }
            tbody {
                for (index, question) in questions.into_iter().enumerate() {
                    QuestionRow {
                        number: base as usize + index + 1,
                        question,
                        on_edit,
                    }
                }
            }
        }
    }
}

#[component]
fn QuestionRow(
    number: usize,
    question: BankQuestion,
    on_edit: EventHandler<BankQuestion>,
) -> Element {
    let preview: String = if question.question_text.chars().count() > 80 {
        let truncated: String = question.question_text.chars().take(80).collect();
        format!("{truncated}...")
    } else {
        question.question_text.clone()
    };
    let option_count = question.options.len();
    let category = question.category.clone();
    let full_text = question.question_text.clone();
    rsx! {
        tr {
            td { "{number}" }
            td {
                span { class: "badge badge--idle", "{category}" }
            }
            td { title: "{full_text}", "{preview}" }
            td { "{option_count} options" }
            td {
                button {
                    class: "btn btn-secondary btn-sm",
                    r#type: "button",
                    onclick: move |_| on_edit.call(question.clone()),
                    "Edit Scores"
                }
            }
        }
    }
}

#[component]
fn PaginationRow(
    current_page: u32,
    total_pages: u32,
    total_items: u32,
    limit: u32,
    shown: usize,
    on_page: EventHandler<u32>,
) -> Element {
    let first = if total_items == 0 || limit == 0 {
        u32::from(total_items > 0)
    } else {
        (current_page - 1) * limit + 1
    };
    let last = if limit == 0 {
        total_items
    } else {
        (first + shown as u32).saturating_sub(1)
    };
    let range = pagination_range(current_page, total_pages);
    let show_nav = total_pages > 1 && limit > 0;

    rsx! {
        div { class: "pagination-row",
            span { class: "muted", "Showing {first} to {last} of {total_items} questions" }
            if show_nav {
                nav {
                    button {
                        class: "btn btn-sm",
                        r#type: "button",
                        disabled: current_page <= 1,
                        onclick: move |_| on_page.call(current_page - 1),
                        "Previous"
                    }
                    for target in range {
                        button {
                            class: if target == current_page { "btn btn-sm btn--active" } else { "btn btn-sm" },
                            r#type: "button",
                            onclick: move |_| on_page.call(target),
                            "{target}"
                        }
                    }
                    button {
                        class: "btn btn-sm",
                        r#type: "button",
                        disabled: current_page >= total_pages,
                        onclick: move |_| on_page.call(current_page + 1),
                        "Next"
                    }
                }
            }
        }
    }
}

#[component]
fn ScoreModal(
    modal: Signal<Option<BankQuestion>>,
    updating: bool,
    on_update: Callback<(QuestionId, OptionId, u32)>,
    on_close: EventHandler<()>,
) -> Element {
    let guard = modal.read();
    let Some(question) = guard.as_ref() else {
        return rsx! {};
    };
    let question_id = question.id;
    let question_text = question.question_text.clone();
    let category = question.category.clone();
    let options = question.options.clone();
    drop(guard);

    rsx! {
        div { class: "modal-backdrop", onclick: move |_| on_close.call(()) }
        div { class: "modal",
            div { class: "modal__content card",
                header { class: "modal__header",
                    h5 {
                        "Edit Scores — Question #{question_id}"
                        span { class: "badge badge--idle", "{category}" }
                    }
                    button {
                        class: "modal__close",
                        r#type: "button",
                        disabled: updating,
                        onclick: move |_| on_close.call(()),
                        "Close"
                    }
                }
                div { class: "modal__body",
                    p { class: "muted", "{question_text}" }
                    for option in options {
                        div { class: "score-row",
                            span { class: "score-row__text", "{option.option_text}" }
                            span { class: "score-row__value", "Score: {option.score}" }
                            select {
                                value: "{option.score}",
                                disabled: updating,
                                onchange: move |evt| {
                                    if let Ok(score) = evt.value().parse::<u32>() {
                                        on_update.call((question_id, option.id, score));
                                    }
                                },
                                for value in 0..=10_u32 {
                                    option { value: "{value}", "{value}" }
                                }
                            }
                        }
                    }
                    if updating {
                        p { class: "muted", "Updating score..." }
                    }
                }
            }
        }
    }
}
