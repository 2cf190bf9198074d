mod bank;
mod dashboard;
mod exam;
mod login;
mod results;
mod state;

#[cfg(test)]
pub(crate) mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use bank::BankView;
pub use dashboard::DashboardView;
pub use exam::ExamView;
pub use login::LoginView;
pub use results::ResultsView;
pub use state::{ViewError, ViewState, view_state_from_resource};
