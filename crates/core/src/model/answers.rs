use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ExamQuestionId, OptionId};

/// The client-side record of which option the user picked per question.
///
/// Entries appear only after the backend acknowledges a submission and are
/// never removed; re-answering a question replaces the previous entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerMap {
    entries: BTreeMap<ExamQuestionId, OptionId>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid answer key or value: {raw}")]
pub struct AnswerKeyError {
    raw: String,
}

impl AnswerMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the map from the backend's string-keyed JSON object, as
    /// returned when reloading an in-progress session.
    ///
    /// # Errors
    ///
    /// Returns `AnswerKeyError` when a key or value does not parse as an
    /// identifier.
    pub fn from_stored<'a, I>(stored: I) -> Result<Self, AnswerKeyError>
    where
        I: IntoIterator<Item = (&'a str, u64)>,
    {
        let mut entries = BTreeMap::new();
        for (key, value) in stored {
            let question: ExamQuestionId = key.parse().map_err(|_| AnswerKeyError {
                raw: key.to_string(),
            })?;
            entries.insert(question, OptionId::new(value));
        }
        Ok(Self { entries })
    }

    /// Records an acknowledged answer. Last write wins.
    pub fn record(&mut self, question: ExamQuestionId, option: OptionId) {
        self.entries.insert(question, option);
    }

    #[must_use]
    pub fn selected(&self, question: ExamQuestionId) -> Option<OptionId> {
        self.entries.get(&question).copied()
    }

    #[must_use]
    pub fn is_answered(&self, question: ExamQuestionId) -> bool {
        self.entries.contains_key(&question)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExamQuestionId, OptionId)> + '_ {
        self.entries.iter().map(|(q, o)| (*q, *o))
    }
}

impl<'a> IntoIterator for &'a AnswerMap {
    type Item = (&'a ExamQuestionId, &'a OptionId);
    type IntoIter = btree_map::Iter<'a, ExamQuestionId, OptionId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_stored_coerces_string_keys() {
        let map = AnswerMap::from_stored([("10", 3_u64), ("11", 4_u64)]).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.selected(ExamQuestionId::new(10)),
            Some(OptionId::new(3))
        );
        assert_eq!(
            map.selected(ExamQuestionId::new(11)),
            Some(OptionId::new(4))
        );
    }

    #[test]
    fn from_stored_rejects_bad_keys() {
        assert!(AnswerMap::from_stored([("ten", 3_u64)]).is_err());
    }

    #[test]
    fn record_is_last_write_wins() {
        let mut map = AnswerMap::new();
        let question = ExamQuestionId::new(7);
        map.record(question, OptionId::new(1));
        map.record(question, OptionId::new(2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.selected(question), Some(OptionId::new(2)));
    }

    #[test]
    fn empty_map_reports_nothing_answered() {
        let map = AnswerMap::new();
        assert!(map.is_empty());
        assert!(!map.is_answered(ExamQuestionId::new(1)));
    }
}
