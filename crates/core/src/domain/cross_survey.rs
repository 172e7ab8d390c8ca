//! Following one question across several weekly surveys.
//!
//! Questions are matched by position: the index of the question in the first
//! (base) survey selects the question at the same index in every other survey.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

use super::{DomainError, QuestionId, QuestionType, SurveyId, UserId};

pub const CROSS_SURVEY_USER_LIMIT: usize = 10;

/// Questions of one survey, already sorted by their order index.
#[derive(Debug, Clone)]
pub struct SurveyQuestions {
    pub survey_id: SurveyId,
    pub questions: Vec<(QuestionId, QuestionType)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedQuestion {
    pub survey_id: SurveyId,
    pub question_id: QuestionId,
}

pub fn match_by_position(
    question_id: QuestionId,
    surveys: &[SurveyQuestions],
) -> Result<(QuestionType, Vec<MatchedQuestion>), DomainError> {
    let base = surveys
        .first()
        .ok_or(DomainError::QuestionNotFound(question_id))?;

    let (position, question_type) = base
        .questions
        .iter()
        .enumerate()
        .find_map(|(position, (id, ty))| (*id == question_id).then_some((position, *ty)))
        .ok_or(DomainError::QuestionNotFound(question_id))?;

    let matched = surveys
        .iter()
        .map(|survey| {
            let (matched_id, matched_type) =
                survey
                    .questions
                    .get(position)
                    .ok_or(DomainError::MissingPosition {
                        survey_id: survey.survey_id,
                        position,
                    })?;

            if *matched_type != question_type {
                return Err(DomainError::TypeMismatch {
                    survey_id: survey.survey_id,
                    expected: question_type,
                    found: *matched_type,
                });
            }

            Ok(MatchedQuestion {
                survey_id: survey.survey_id,
                question_id: *matched_id,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((question_type, matched))
}

/// One answer joined with its author and survey.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub user_id: UserId,
    pub user_name: String,
    pub id_number: String,
    pub survey_id: SurveyId,
    pub week: i32,
    pub created_at: NaiveDateTime,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub survey_id: SurveyId,
    pub week: i32,
    pub created_at: NaiveDateTime,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHistory {
    pub id: UserId,
    pub name: String,
    pub id_number: String,
    pub surveys: Vec<HistoryEntry>,
}

/// Groups rows per user, keeps the `limit` users with the lowest ids and
/// orders each user's entries by survey week, then creation time.
pub fn group_by_user(rows: Vec<HistoryRow>, limit: usize) -> Vec<UserHistory> {
    let mut users: BTreeMap<UserId, UserHistory> = BTreeMap::new();

    for row in rows {
        let user = users.entry(row.user_id).or_insert_with(|| UserHistory {
            id: row.user_id,
            name: row.user_name.clone(),
            id_number: row.id_number.clone(),
            surveys: Vec::new(),
        });

        user.surveys.push(HistoryEntry {
            survey_id: row.survey_id,
            week: row.week,
            created_at: row.created_at,
            value: row.value,
        });
    }

    users
        .into_values()
        .take(limit)
        .map(|mut user| {
            user.surveys
                .sort_by_key(|entry| (entry.week, entry.created_at, entry.survey_id));
            user
        })
        .collect()
}
