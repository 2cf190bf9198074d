mod answers;
mod bank;
mod ids;
mod results;
mod roster;
mod session;

pub use answers::{AnswerKeyError, AnswerMap};
pub use bank::{
    BankOption, BankQuestion, ExportOption, ExportQuestion, MAX_OPTION_SCORE, Page, PageMeta,
    QuestionFilter, ScoreOutOfRange, validate_score,
};
pub use ids::{
    ExamQuestionId, OptionId, ParseIdError, QuestionId, SessionId, UserId, UserIdError,
};
pub use results::{CategoryResult, DetailedAnswer, ExamResults, ResultSummary};
pub use roster::{DashboardDetail, ProgressInfo, UserDashboard, UserRoster};
pub use session::{
    CategoryStats, ExamOption, ExamQuestion, ExamSession, ExamSessionError, ExamStatus,
    ParseStatusError,
};
