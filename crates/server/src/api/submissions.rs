use std::sync::Arc;

use axum::{Router, extract::State, http::StatusCode, routing::post};
use survey_api_types::{SubmissionResponse, SubmitSurveyRequest};
use survey_core::domain::AnswerInput;

use super::{
    error::ApiError,
    extract::{AdminClaims, AppJson},
    state::AppState,
};
use crate::repository::NewSubmission;

pub fn create_submissions_router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/submissions",
        post(submit_survey).put(override_submission),
    )
}

fn into_new_submission(request: SubmitSurveyRequest) -> NewSubmission {
    NewSubmission {
        survey_id: request.survey_id,
        name: request.user.name,
        id_number: request.user.id_number,
        answers: request
            .answers
            .into_iter()
            .map(|answer| AnswerInput::new(answer.question_id, answer.value.into_text()))
            .collect(),
    }
}

async fn submit_survey(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<SubmitSurveyRequest>,
) -> Result<(StatusCode, AppJson<SubmissionResponse>), ApiError> {
    let submission = state
        .submissions
        .admit(into_new_submission(request))
        .await?;

    Ok((StatusCode::CREATED, AppJson(submission.into())))
}

async fn override_submission(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    AppJson(request): AppJson<SubmitSurveyRequest>,
) -> Result<AppJson<SubmissionResponse>, ApiError> {
    let submission = state
        .submissions
        .override_answers(into_new_submission(request))
        .await?;

    Ok(AppJson(submission.into()))
}
