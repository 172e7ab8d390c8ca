//! Survey CRUD, per-survey results and single-question insights.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use survey_api_types::{
    CheckSubmissionResponse, CreateSurveyRequest, QuestionInsightResponse, SurveyListResponse,
    SurveyResponse, SurveyResultsResponse, UserIdentity,
};
use survey_core::domain::{QuestionDraft, QuestionId, SurveyDraft, SurveyId, question_insight};

use super::{
    error::ApiError,
    extract::{AdminClaims, AppJson, AppPath, AppQuery},
    state::AppState,
};
use crate::repository::Page;

const DEFAULT_SURVEY_PAGE_SIZE: u64 = 10;
const DEFAULT_RESULTS_PAGE_SIZE: u64 = 20;

pub fn create_surveys_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/surveys", get(list_surveys).post(create_survey))
        .route(
            "/api/surveys/{id}",
            get(get_survey).put(replace_survey).delete(delete_survey),
        )
        .route("/api/surveys/{id}/check", post(check_submission))
        .route("/api/surveys/{id}/results", get(survey_results))
        .route(
            "/api/surveys/{id}/insights/{question_id}",
            get(question_insights),
        )
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

fn into_draft(request: CreateSurveyRequest) -> SurveyDraft {
    SurveyDraft {
        title: request.title,
        description: request.description,
        year: request.year,
        semester: request.semester,
        week: request.week,
        questions: request
            .questions
            .into_iter()
            .map(|question| QuestionDraft {
                description: question.description,
                config: question.config,
            })
            .collect(),
    }
}

async fn list_surveys(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<AppJson<SurveyListResponse>, ApiError> {
    let page = Page::new(query.page, query.limit, DEFAULT_SURVEY_PAGE_SIZE);
    let (surveys, total) = state.surveys.list(page).await?;

    Ok(AppJson(SurveyListResponse {
        surveys: surveys.into_iter().map(Into::into).collect(),
        total,
        page: page.page,
        limit: page.limit,
    }))
}

async fn get_survey(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<SurveyId>,
) -> Result<AppJson<SurveyResponse>, ApiError> {
    let survey = state
        .surveys
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("survey {id} not found")))?;

    Ok(AppJson(survey.into()))
}

async fn create_survey(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    AppJson(request): AppJson<CreateSurveyRequest>,
) -> Result<(StatusCode, AppJson<SurveyResponse>), ApiError> {
    let draft = into_draft(request).validated()?;
    let survey = state.surveys.create(draft).await?;

    Ok((StatusCode::CREATED, AppJson(survey.into())))
}

async fn replace_survey(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    AppPath(id): AppPath<SurveyId>,
    AppJson(request): AppJson<CreateSurveyRequest>,
) -> Result<AppJson<SurveyResponse>, ApiError> {
    let draft = into_draft(request).validated()?;
    let survey = state.surveys.replace(id, draft).await?;

    Ok(AppJson(survey.into()))
}

async fn delete_survey(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    AppPath(id): AppPath<SurveyId>,
) -> Result<StatusCode, ApiError> {
    if state.surveys.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("survey {id} not found")))
    }
}

async fn check_submission(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<SurveyId>,
    AppJson(identity): AppJson<UserIdentity>,
) -> Result<AppJson<CheckSubmissionResponse>, ApiError> {
    let submitted = state
        .submissions
        .has_submitted(id, &identity.name, &identity.id_number)
        .await?;

    Ok(AppJson(CheckSubmissionResponse { submitted }))
}

async fn survey_results(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    AppPath(id): AppPath<SurveyId>,
    AppQuery(query): AppQuery<PageQuery>,
) -> Result<AppJson<SurveyResultsResponse>, ApiError> {
    let survey = state
        .surveys
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("survey {id} not found")))?;

    let page = Page::new(query.page, query.limit, DEFAULT_RESULTS_PAGE_SIZE);
    let (submissions, total) = state.submissions.list_for_survey(id, page).await?;

    Ok(AppJson(SurveyResultsResponse {
        survey: survey.into(),
        submissions: submissions.into_iter().map(Into::into).collect(),
        total,
        page: page.page,
        limit: page.limit,
    }))
}

async fn question_insights(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    AppPath((id, question_id)): AppPath<(SurveyId, QuestionId)>,
) -> Result<AppJson<QuestionInsightResponse>, ApiError> {
    let question = state
        .surveys
        .find_question(id, question_id)
        .await?
        .ok_or_else(|| {
            ApiError::not_found(format!("question {question_id} not found in survey {id}"))
        })?;

    let values = state.insights.answers_for_question(question.id).await?;
    let insight = question_insight(&question.config, &values);

    Ok(AppJson(QuestionInsightResponse {
        question_id: question.id,
        question_type: question.config.question_type(),
        insight,
    }))
}
