use survey_api_types::{
    AnswerResponse, QuestionResponse, SubmissionResponse, SurveyResponse, SurveySummary,
    UserResponse,
};

use crate::repository::{
    AnswerRecord, QuestionRecord, SubmissionRecord, SurveyDetail, SurveyListing, UserRecord,
};

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            id_number: user.id_number,
            role: user.role,
        }
    }
}

impl From<QuestionRecord> for QuestionResponse {
    fn from(question: QuestionRecord) -> Self {
        Self {
            id: question.id,
            description: question.description,
            config: question.config,
            order_index: question.order_index,
        }
    }
}

impl From<SurveyDetail> for SurveyResponse {
    fn from(detail: SurveyDetail) -> Self {
        let survey = detail.survey;
        Self {
            id: survey.id,
            title: survey.title,
            description: survey.description,
            year: survey.year,
            semester: survey.semester,
            week: survey.week,
            created_at: survey.created_at,
            questions: detail.questions.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<SurveyListing> for SurveySummary {
    fn from(listing: SurveyListing) -> Self {
        let survey = listing.survey;
        Self {
            id: survey.id,
            title: survey.title,
            description: survey.description,
            year: survey.year,
            semester: survey.semester,
            week: survey.week,
            created_at: survey.created_at,
            submission_count: listing.submission_count,
        }
    }
}

impl From<AnswerRecord> for AnswerResponse {
    fn from(answer: AnswerRecord) -> Self {
        Self {
            question_id: answer.question_id,
            value: answer.value,
        }
    }
}

impl From<SubmissionRecord> for SubmissionResponse {
    fn from(submission: SubmissionRecord) -> Self {
        Self {
            id: submission.id,
            survey_id: submission.survey_id,
            user: submission.user.into(),
            created_at: submission.created_at,
            answers: submission.answers.into_iter().map(Into::into).collect(),
        }
    }
}
