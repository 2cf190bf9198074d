use dioxus::prelude::*;
use dioxus_router::use_navigator;

use exam_core::model::UserId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;

/// Entry point: a user ID is all it takes to fetch-or-create a session.
#[component]
pub fn LoginView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let mut user_input = use_signal(String::new);
    let mut loading = use_signal(|| false);
    let mut error = use_signal(|| None::<ViewError>);

    let on_submit = {
        let backend = ctx.backend();
        use_callback(move |()| {
            let backend = backend.clone();
            let raw = user_input();
            spawn(async move {
                let Ok(user_id) = raw.parse::<UserId>() else {
                    error.set(Some(ViewError::InvalidUser));
                    return;
                };
                loading.set(true);
                error.set(None);
                match backend.get_or_create_session(&user_id).await {
                    Ok(_) => {
                        let _ = navigator.push(Route::Exam {
                            user_id: user_id.to_string(),
                        });
                    }
                    Err(err) => error.set(Some(ViewError::from(&err))),
                }
                loading.set(false);
            });
        })
    };

    let error_message = error.read().as_ref().map(ViewError::message);

    rsx! {
        div { class: "page login-page",
            div { class: "card login-card",
                h2 { "Exam Login" }
                form {
                    onsubmit: move |evt: FormEvent| {
                        evt.prevent_default();
                        on_submit.call(());
                    },
                    label { r#for: "user-id", "User ID" }
                    input {
                        id: "user-id",
                        r#type: "text",
                        autofocus: true,
                        value: "{user_input}",
                        oninput: move |evt| user_input.set(evt.value()),
                    }
                    if let Some(message) = error_message {
                        p { class: "alert alert--error", "{message}" }
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "submit",
                        disabled: loading(),
                        if loading() { "Loading..." } else { "Create / Resume Exam" }
                    }
                }
            }
        }
    }
}
