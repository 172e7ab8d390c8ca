//! Following one question across several surveys.

use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use serde::Deserialize;
use survey_api_types::CrossSurveyInsightResponse;
use survey_core::domain::{QuestionId, SurveyId};

use super::{
    error::ApiError,
    extract::{AdminClaims, AppJson, AppPath, AppQuery},
    state::AppState,
};

pub fn create_insights_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/insights/{question_id}", get(cross_survey_insights))
}

#[derive(Debug, Deserialize)]
struct CrossSurveyQuery {
    #[serde(default)]
    surveys: String,
}

/// Parses `1,2,3`, skipping entries that are not ids and keeping the first
/// occurrence of repeated ids.
fn parse_survey_ids(raw: &str) -> Vec<SurveyId> {
    let mut ids: Vec<SurveyId> = Vec::new();
    for id in raw.split(',').filter_map(|part| part.parse::<SurveyId>().ok()) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

async fn cross_survey_insights(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    AppPath(question_id): AppPath<QuestionId>,
    AppQuery(query): AppQuery<CrossSurveyQuery>,
) -> Result<AppJson<CrossSurveyInsightResponse>, ApiError> {
    let survey_ids = parse_survey_ids(&query.surveys);
    if survey_ids.is_empty() {
        return Err(ApiError::bad_request(
            "surveys must list at least one survey id",
        ));
    }

    let (question_type, users) = state
        .insights
        .cross_survey(question_id, &survey_ids)
        .await?;

    Ok(AppJson(CrossSurveyInsightResponse {
        question_type,
        users,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn survey_ids_are_deduplicated_in_order() {
        let ids = parse_survey_ids("3, 1,x,3,,2");

        assert_eq!(
            ids,
            vec![SurveyId::new(3), SurveyId::new(1), SurveyId::new(2)]
        );
    }

    #[test]
    fn blank_list_yields_no_ids() {
        assert!(parse_survey_ids("").is_empty());
    }
}
