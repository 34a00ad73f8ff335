mod ids;
mod question;
mod summary;

pub use ids::{CategoryId, ParseIdError, QuestionId};
pub use question::{
    Difficulty, ParseDifficultyError, ParseQuestionKindError, Question, QuestionDraft,
    QuestionKind, QuestionValidationError, ValidatedQuestion,
};
pub use summary::{QuizSummary, QuizSummaryError};
