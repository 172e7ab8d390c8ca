mod cross_survey;
mod error;
mod identity;
mod ids;
mod insights;
mod question;
mod role;
mod submission;
mod survey;

pub use cross_survey::{
    CROSS_SURVEY_USER_LIMIT, HistoryEntry, HistoryRow, MatchedQuestion, SurveyQuestions,
    UserHistory, group_by_user, match_by_position,
};
pub use error::DomainError;
pub use identity::{Identity, MIN_PASSWORD_LENGTH, UserResolution, validate_password};
pub use ids::{AnswerId, QuestionId, SubmissionId, SurveyId, UserId};
pub use insights::{
    Insight, JiebaSegmenter, Segmenter, StarDistribution, WORD_CLOUD_LIMIT, WordCloud, WordWeight,
    question_insight, question_insight_with, star_distribution, word_cloud,
};
pub use question::{DEFAULT_INPUT_MAX_LENGTH, DEFAULT_MAX_RATING, QuestionConfig, QuestionType};
pub use role::Role;
pub use submission::{AnswerInput, validate_answer, validate_answers};
pub use survey::{QuestionDraft, SurveyDraft};
