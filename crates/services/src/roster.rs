use std::str::FromStr;
use std::sync::Arc;

use exam_client::ExamBackend;
use exam_core::model::{DashboardDetail, ExamStatus, UserDashboard, UserId, UserRoster};

use crate::error::RosterError;

/// How often the roster view re-fetches, in seconds.
pub const ROSTER_REFRESH_SECS: u64 = 30;

/// Status filter of the roster view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ExamStatus),
}

impl StatusFilter {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "ALL",
            StatusFilter::Only(status) => status.as_str(),
        }
    }

    #[must_use]
    pub fn matches(&self, status: ExamStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = exam_core::model::ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ALL" {
            return Ok(StatusFilter::All);
        }
        s.parse::<ExamStatus>().map(StatusFilter::Only)
    }
}

/// Read side of the admin dashboard.
#[derive(Clone)]
pub struct RosterService {
    backend: Arc<dyn ExamBackend>,
}

impl RosterService {
    #[must_use]
    pub fn new(backend: Arc<dyn ExamBackend>) -> Self {
        Self { backend }
    }

    /// Every user with a session, with headline results where completed.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` for backend failures.
    pub async fn roster(&self) -> Result<UserRoster, RosterError> {
        Ok(self.backend.all_users_dashboard().await?)
    }

    /// One user's drill-down for the detail modal.
    ///
    /// # Errors
    ///
    /// Returns `RosterError` for backend failures.
    pub async fn user_detail(&self, user: &UserId) -> Result<DashboardDetail, RosterError> {
        Ok(self.backend.user_dashboard(user).await?)
    }
}

/// Applies the roster view's search box and status dropdown. Both filters
/// run client-side over the already-fetched list.
#[must_use]
pub fn filter_users(
    users: &[UserDashboard],
    search: &str,
    status: StatusFilter,
) -> Vec<UserDashboard> {
    let needle = search.to_lowercase();
    users
        .iter()
        .filter(|user| user.user_id.to_lowercase().contains(&needle))
        .filter(|user| status.matches(user.exam_status))
        .cloned()
        .collect()
}
