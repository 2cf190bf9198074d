use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{OptionId, QuestionId};

/// Highest score an option may carry; the editor offers 0..=10.
pub const MAX_OPTION_SCORE: u32 = 10;

/// An answer option as seen by the question-bank editor, score included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankOption {
    pub id: OptionId,
    pub question_id: QuestionId,
    pub option_text: String,
    pub score: u32,
}

/// A bank question with its full option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankQuestion {
    pub id: QuestionId,
    pub category: String,
    pub question_text: String,
    pub options: Vec<BankOption>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("option score {score} is out of range 0..={MAX_OPTION_SCORE}")]
pub struct ScoreOutOfRange {
    pub score: u32,
}

/// Validates a score the editor is about to submit.
///
/// # Errors
///
/// Returns `ScoreOutOfRange` when the value exceeds `MAX_OPTION_SCORE`.
pub fn validate_score(score: u32) -> Result<u32, ScoreOutOfRange> {
    if score > MAX_OPTION_SCORE {
        return Err(ScoreOutOfRange { score });
    }
    Ok(score)
}

/// Query parameters for the paginated question listing.
///
/// `limit == 0` asks the backend for the whole collection in one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionFilter {
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl Default for QuestionFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionFilter {
    /// Default page size used by the editor.
    pub const DEFAULT_LIMIT: u32 = 10;

    #[must_use]
    pub fn new() -> Self {
        Self {
            category: None,
            search: None,
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|value| !value.is_empty());
        self.page = 1;
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|value| !value.is_empty());
        self.page = 1;
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Changing the page size always snaps back to the first page.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self.page = 1;
        self
    }

    /// True when the filter asks for the whole collection.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.limit == 0
    }
}

/// Server-reported pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: u32,
    pub items_per_page: u32,
    pub total_items: u32,
    pub total_pages: u32,
}

/// One page of a server-side collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Export form of an option: text and score only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOption {
    pub option_text: String,
    pub score: u32,
}

/// Export form of a question; ids are re-sequenced "1", "2", ... so the
/// downloaded file stands alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportQuestion {
    pub id: String,
    pub category: String,
    pub question_text: String,
    pub options: Vec<ExportOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_validation_bounds() {
        assert_eq!(validate_score(0), Ok(0));
        assert_eq!(validate_score(10), Ok(10));
        assert_eq!(validate_score(11), Err(ScoreOutOfRange { score: 11 }));
    }

    #[test]
    fn filter_changes_reset_page() {
        let filter = QuestionFilter::new().with_page(4);
        assert_eq!(filter.page, 4);
        let filter = filter.with_search(Some("audit".to_string()));
        assert_eq!(filter.page, 1);
        let filter = filter.with_page(3).with_limit(25);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 25);
    }

    #[test]
    fn empty_strings_clear_filters() {
        let filter = QuestionFilter::new()
            .with_category(Some(String::new()))
            .with_search(Some(String::new()));
        assert_eq!(filter.category, None);
        assert_eq!(filter.search, None);
    }

    #[test]
    fn unbounded_filter() {
        assert!(QuestionFilter::new().with_limit(0).is_unbounded());
        assert!(!QuestionFilter::new().is_unbounded());
    }
}
