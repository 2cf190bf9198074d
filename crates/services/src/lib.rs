#![forbid(unsafe_code)]

pub mod access;
pub mod controller;
pub mod error;
pub mod navigator;
pub mod question_bank;
pub mod results;
pub mod roster;

pub use exam_core::Clock;

pub use access::AccessGate;
pub use controller::{ExamSessionController, LoadOutcome};
pub use error::{BankError, ControllerError, ResultsError, RosterError};
pub use navigator::{CategoryGroup, NavigatorEntry, QuestionStatus, build_navigator};
pub use question_bank::{
    QueryTicket, QuestionBankService, SEARCH_DEBOUNCE_MS, apply_score_to_question,
    apply_score_update,
};
pub use results::ResultsService;
pub use roster::{ROSTER_REFRESH_SECS, RosterService, StatusFilter, filter_users};
