use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{BankView, DashboardView, ExamView, LoginView, ResultsView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", LoginView)] Login {},
        #[route("/exam/:user_id", ExamView)] Exam { user_id: String },
        #[route("/results/:user_id", ResultsView)] Results { user_id: String },
        #[route("/admin", DashboardView)] Admin {},
        #[route("/questions", BankView)] Questions {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Topbar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Topbar() -> Element {
    rsx! {
        nav { class: "topbar",
            h1 { "Exam Portal" }
            ul {
                li { Link { to: Route::Login {}, "Login" } }
                li { Link { to: Route::Admin {}, "Dashboard" } }
                li { Link { to: Route::Questions {}, "Question Bank" } }
            }
        }
    }
}
