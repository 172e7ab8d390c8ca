pub mod insight_repository;
pub mod submission_repository;
pub mod survey_repository;
pub mod user_repository;

pub use insight_repository::{InsightRepository, SeaOrmInsightRepository};
pub use submission_repository::{
    AnswerRecord, NewSubmission, SeaOrmSubmissionRepository, SubmissionRecord,
    SubmissionRepository,
};
pub use survey_repository::{
    QuestionRecord, SeaOrmSurveyRepository, SurveyDetail, SurveyListing, SurveyRecord,
    SurveyRepository,
};
pub use user_repository::{SeaOrmUserRepository, UserRecord, UserRepository};

pub const MAX_PAGE_SIZE: u64 = 100;

/// One-based page window with `limit` clamped to `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    /// Negative or zero values are clamped rather than rejected.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: u64) -> Self {
        let page = page.map_or(1, |page| u64::try_from(page).unwrap_or(0));
        let limit = limit.map_or(default_limit, |limit| u64::try_from(limit).unwrap_or(0));

        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
