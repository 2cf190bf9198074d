use exam_core::model::{AnswerMap, ExamQuestion, ExamQuestionId};

/// Where a question stands on the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionStatus {
    Current,
    Answered,
    Unanswered,
}

/// One sidebar cell: the question's board index plus its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorEntry {
    pub index: usize,
    pub exam_question_id: ExamQuestionId,
    pub status: QuestionStatus,
}

/// One sidebar section: a category and its questions in board order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub entries: Vec<NavigatorEntry>,
}

/// Groups the board's questions by category, preserving first-seen
/// category order.
///
/// Purely derived from the controller's state; the sidebar re-renders
/// from this on every answer or index change.
#[must_use]
pub fn build_navigator(
    questions: &[ExamQuestion],
    answers: &AnswerMap,
    current: usize,
) -> Vec<CategoryGroup> {
    let mut groups: Vec<CategoryGroup> = Vec::new();
    for (index, question) in questions.iter().enumerate() {
        let status = if index == current {
            QuestionStatus::Current
        } else if answers.is_answered(question.exam_question_id) {
            QuestionStatus::Answered
        } else {
            QuestionStatus::Unanswered
        };
        let entry = NavigatorEntry {
            index,
            exam_question_id: question.exam_question_id,
            status,
        };
        match groups
            .iter_mut()
            .find(|group| group.category == question.category)
        {
            Some(group) => group.entries.push(entry),
            None => groups.push(CategoryGroup {
                category: question.category.clone(),
                entries: vec![entry],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{ExamOption, OptionId, QuestionId};

    fn question(id: u64, category: &str) -> ExamQuestion {
        ExamQuestion {
            exam_question_id: ExamQuestionId::new(id),
            question_id: QuestionId::new(id),
            category: category.to_string(),
            order_number: u32::try_from(id).unwrap(),
            question_text: format!("Q{id}"),
            options: vec![ExamOption {
                id: OptionId::new(id * 10),
                option_text: "A".to_string(),
            }],
        }
    }

    #[test]
    fn groups_keep_first_seen_category_order() {
        let questions = vec![
            question(1, "TEKNIS"),
            question(2, "MANAJERIAL"),
            question(3, "TEKNIS"),
        ];
        let groups = build_navigator(&questions, &AnswerMap::new(), 0);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "TEKNIS");
        assert_eq!(groups[1].category, "MANAJERIAL");
        assert_eq!(groups[0].entries.len(), 2);
        assert_eq!(groups[0].entries[1].index, 2);
    }

    #[test]
    fn statuses_reflect_answers_and_cursor() {
        let questions = vec![question(1, "TEKNIS"), question(2, "TEKNIS")];
        let mut answers = AnswerMap::new();
        answers.record(ExamQuestionId::new(2), OptionId::new(20));

        let groups = build_navigator(&questions, &answers, 0);
        let entries = &groups[0].entries;
        assert_eq!(entries[0].status, QuestionStatus::Current);
        assert_eq!(entries[1].status, QuestionStatus::Answered);

        // The cursor outranks the answered state.
        let groups = build_navigator(&questions, &answers, 1);
        assert_eq!(groups[0].entries[1].status, QuestionStatus::Current);
        assert_eq!(groups[0].entries[0].status, QuestionStatus::Unanswered);
    }
}
