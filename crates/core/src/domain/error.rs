use thiserror::Error;

use super::{QuestionId, QuestionType, SurveyId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} must be between {min} and {max} characters")]
    FieldLength {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("a survey must have between 1 and {max} questions")]
    QuestionCount { max: usize },

    #[error("answers must not be empty")]
    NoAnswers,

    #[error("invalid question id: {0}")]
    UnknownQuestion(QuestionId),

    #[error("question {0} is answered more than once")]
    DuplicateAnswer(QuestionId),

    #[error("answer to question {question_id} exceeds the length limit of {max_length} characters")]
    AnswerTooLong {
        question_id: QuestionId,
        max_length: u32,
    },

    #[error("rating for question {question_id} must be an integer in [0, {max_rating}]")]
    InvalidRating {
        question_id: QuestionId,
        max_rating: u32,
    },

    #[error("id number and name do not match")]
    NameMismatch,

    #[error("id number is already used by another user")]
    IdNumberTaken,

    #[error("password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),

    #[error("survey {survey_id} has no question at position {position}")]
    MissingPosition { survey_id: SurveyId, position: usize },

    #[error("question in survey {survey_id} has type {found}, expected {expected}")]
    TypeMismatch {
        survey_id: SurveyId,
        expected: QuestionType,
        found: QuestionType,
    },

    #[error("unsupported question type: {0}")]
    UnsupportedQuestionType(String),

    #[error("invalid question config: {0}")]
    InvalidQuestionConfig(String),
}
