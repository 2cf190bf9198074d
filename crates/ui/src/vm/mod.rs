mod exam_vm;
mod time_fmt;

pub use exam_vm::{ExamIntent, ExamStart, ExamVm, load_exam};
pub use time_fmt::{countdown_class, format_countdown, format_datetime};
