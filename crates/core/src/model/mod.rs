mod ids;
mod question;
mod session;

pub use ids::{
    Category, ExamKey, ExamSelector, ParseIdError, QuestionId, Scope, Subcategory,
};
pub use question::{Question, QuestionError};
pub use session::{AnswerRecord, Origin, SessionSummary, Snapshot, WorkingQuestion};
