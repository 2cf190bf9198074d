use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};

use exam_client::{ExamBackend, InMemoryBackend, demo_questions};
use exam_core::time::{fixed_clock, fixed_now};
use services::{AccessGate, QuestionBankService, ResultsService, RosterService};

use crate::context::{UiApp, build_app_context};
use crate::views::{BankView, DashboardView, ExamView, LoginView, ResultsView};

pub const TEST_GATE_PASSWORD: &str = "letmein";

#[derive(Clone)]
struct TestApp {
    backend: Arc<InMemoryBackend>,
    results: Arc<ResultsService>,
    roster: Arc<RosterService>,
    question_bank: Arc<QuestionBankService>,
    access_gate: Arc<AccessGate>,
}

impl UiApp for TestApp {
    fn backend(&self) -> Arc<dyn ExamBackend> {
        self.backend.clone()
    }

    fn results(&self) -> Arc<ResultsService> {
        Arc::clone(&self.results)
    }

    fn roster(&self) -> Arc<RosterService> {
        Arc::clone(&self.roster)
    }

    fn question_bank(&self) -> Arc<QuestionBankService> {
        Arc::clone(&self.question_bank)
    }

    fn access_gate(&self) -> Arc<AccessGate> {
        Arc::clone(&self.access_gate)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Login,
    Exam(String),
    Results(String),
    Admin,
    Bank,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
    #[route("/:..segments")]
    Navigated { segments: Vec<String> },
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Login => rsx! { LoginView {} },
        ViewKind::Exam(user_id) => rsx! { ExamView { user_id } },
        ViewKind::Results(user_id) => rsx! { ResultsView { user_id } },
        ViewKind::Admin => rsx! { DashboardView {} },
        ViewKind::Bank => rsx! { BankView {} },
    }
}

#[component]
fn Navigated(segments: Vec<String>) -> Element {
    let path = segments.join("/");
    rsx! {
        p { "navigated:/{path}" }
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub backend: Arc<InMemoryBackend>,
    pub access_gate: Arc<AccessGate>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// A few drive rounds, enough for resource → signal → render chains.
    pub async fn settle(&mut self) {
        for _ in 0..5 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    let backend = Arc::new(InMemoryBackend::new(fixed_now(), demo_questions()));
    let exam_backend: Arc<dyn ExamBackend> = backend.clone();
    let results = Arc::new(ResultsService::new(exam_backend.clone()));
    let roster = Arc::new(RosterService::new(exam_backend));
    let question_bank = Arc::new(QuestionBankService::new(backend.clone()));
    let access_gate = Arc::new(AccessGate::with_default_ttl(
        TEST_GATE_PASSWORD,
        fixed_clock(),
    ));

    let app = Arc::new(TestApp {
        backend: backend.clone(),
        results,
        roster,
        question_bank,
        access_gate: Arc::clone(&access_gate),
    });

    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness {
        dom,
        backend,
        access_gate,
    }
}
