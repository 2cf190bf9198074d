use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use tracing_subscriber::EnvFilter;

use exam_client::{ExamBackend, HttpExamApi};
use exam_core::Clock;
use services::{AccessGate, QuestionBankService, ResultsService, RosterService};
use ui::{App, UiApp, build_app_context};

const DEFAULT_API_BASE: &str = "http://localhost:8080/api/v1";
const DEFAULT_EDITOR_PASSWORD: &str = "admin123";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidApiBase { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidApiBase { raw } => write!(f, "invalid --api-base value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    backend: Arc<HttpExamApi>,
    results: Arc<ResultsService>,
    roster: Arc<RosterService>,
    question_bank: Arc<QuestionBankService>,
    access_gate: Arc<AccessGate>,
}

impl UiApp for DesktopApp {
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

struct Args {
    api_base: String,
    editor_password: String,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api-base <url>] [--editor-password <pw>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-base {DEFAULT_API_BASE}");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EXAM_API_URL, EXAM_EDITOR_PASSWORD");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut api_base = std::env::var("EXAM_API_URL")
            .ok()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let mut editor_password = std::env::var("EXAM_EDITOR_PASSWORD")
            .ok()
            .unwrap_or_else(|| DEFAULT_EDITOR_PASSWORD.to_string());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-base" => {
                    let value = require_value(args, "--api-base")?;
                    if !value.starts_with("http://") && !value.starts_with("https://") {
                        return Err(ArgsError::InvalidApiBase { raw: value });
                    }
                    api_base = value;
                }
                "--editor-password" => {
                    editor_password = require_value(args, "--editor-password")?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            api_base,
            editor_password,
        })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|err| {
        eprintln!("{err}");
        print_usage();
        err
    })?;

    tracing::info!(api_base = %parsed.api_base, "starting exam portal");

    let backend = Arc::new(HttpExamApi::new(parsed.api_base));
    let exam_backend: Arc<dyn ExamBackend> = backend.clone();
    let results = Arc::new(ResultsService::new(exam_backend.clone()));
    let roster = Arc::new(RosterService::new(exam_backend));
    let question_bank = Arc::new(QuestionBankService::new(backend.clone()));
    let access_gate = Arc::new(AccessGate::with_default_ttl(
        parsed.editor_password,
        Clock::default_clock(),
    ));

    let app = DesktopApp {
        backend,
        results,
        roster,
        question_bank,
        access_gate,
    };
    let app: Arc<dyn UiApp> = Arc::new(app);
    let context = build_app_context(&app);

    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Exam Portal")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
