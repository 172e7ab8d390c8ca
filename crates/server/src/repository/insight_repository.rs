use std::collections::HashMap;

use crate::entity::{answer, submission, survey, user};
use crate::error::{Result, ServiceError};
use crate::repository::survey_repository::load_questions;
use anyhow::anyhow;
use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use survey_core::domain::{
    CROSS_SURVEY_USER_LIMIT, HistoryRow, QuestionId, QuestionType, SurveyId, SurveyQuestions,
    UserHistory, UserId, group_by_user, match_by_position,
};

#[async_trait]
pub trait InsightRepository: Send + Sync {
    /// Raw answer values for one question, oldest first.
    async fn answers_for_question(&self, question_id: QuestionId) -> Result<Vec<String>>;

    /// Follows the question at `question_id`'s position through `survey_ids`.
    /// The first survey id is the one `question_id` belongs to.
    async fn cross_survey(
        &self,
        question_id: QuestionId,
        survey_ids: &[SurveyId],
    ) -> Result<(QuestionType, Vec<UserHistory>)>;
}

#[derive(Clone)]
pub struct SeaOrmInsightRepository {
    db: DatabaseConnection,
}

impl SeaOrmInsightRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InsightRepository for SeaOrmInsightRepository {
    async fn answers_for_question(&self, question_id: QuestionId) -> Result<Vec<String>> {
        let models = answer::Entity::find()
            .filter(answer::Column::QuestionId.eq(question_id.value()))
            .order_by_asc(answer::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|model| model.value).collect())
    }

    async fn cross_survey(
        &self,
        question_id: QuestionId,
        survey_ids: &[SurveyId],
    ) -> Result<(QuestionType, Vec<UserHistory>)> {
        let mut surveys = HashMap::with_capacity(survey_ids.len());
        let mut layouts = Vec::with_capacity(survey_ids.len());

        for &survey_id in survey_ids {
            let model = survey::Entity::find_by_id(survey_id.value())
                .one(&self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found(format!("survey {survey_id} not found")))?;

            let questions = load_questions(&self.db, survey_id).await?;
            layouts.push(SurveyQuestions {
                survey_id,
                questions: questions
                    .iter()
                    .map(|question| (question.id, question.config.question_type()))
                    .collect(),
            });
            surveys.insert(model.id, model);
        }

        let (question_type, matched) = match_by_position(question_id, &layouts)?;
        let question_ids: Vec<i32> = matched
            .iter()
            .map(|matched| matched.question_id.value())
            .collect();

        let rows = answer::Entity::find()
            .filter(answer::Column::QuestionId.is_in(question_ids))
            .find_also_related(submission::Entity)
            .order_by_asc(answer::Column::Id)
            .all(&self.db)
            .await?;

        let user_ids: Vec<i32> = rows
            .iter()
            .filter_map(|(_, submission)| submission.as_ref().map(|model| model.user_id))
            .collect();
        let users: HashMap<i32, user::Model> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|model| (model.id, model))
            .collect();

        let mut history = Vec::with_capacity(rows.len());
        for (answer, submission) in rows {
            let submission = submission.ok_or_else(|| {
                anyhow!("answer {} references a missing submission", answer.id)
            })?;
            let author = users.get(&submission.user_id).ok_or_else(|| {
                anyhow!("submission {} references a missing user", submission.id)
            })?;
            let survey = surveys.get(&submission.survey_id).ok_or_else(|| {
                anyhow!("submission {} is outside the requested surveys", submission.id)
            })?;

            history.push(HistoryRow {
                user_id: UserId::new(author.id),
                user_name: author.name.clone(),
                id_number: author.id_number.clone(),
                survey_id: SurveyId::new(survey.id),
                week: survey.week,
                created_at: survey.created_at,
                value: answer.value,
            });
        }

        Ok((question_type, group_by_user(history, CROSS_SURVEY_USER_LIMIT)))
    }
}
