use std::collections::HashMap;
use std::str::FromStr;

use crate::entity::{answer, question, submission, survey};
use crate::error::{Result, ServiceError};
use crate::repository::Page;
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    TransactionTrait, sea_query::Expr,
};
use survey_core::domain::{QuestionConfig, QuestionDraft, QuestionId, SurveyDraft, SurveyId};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyRecord {
    pub id: SurveyId,
    pub title: String,
    pub description: Option<String>,
    pub year: i32,
    pub semester: i32,
    pub week: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub survey_id: SurveyId,
    pub description: Option<String>,
    pub config: QuestionConfig,
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyDetail {
    pub survey: SurveyRecord,
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyListing {
    pub survey: SurveyRecord,
    pub submission_count: u64,
}

#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// Expects a draft that already passed `SurveyDraft::validated`.
    async fn create(&self, draft: SurveyDraft) -> Result<SurveyDetail>;
    async fn list(&self, page: Page) -> Result<(Vec<SurveyListing>, u64)>;
    async fn find(&self, survey_id: SurveyId) -> Result<Option<SurveyDetail>>;
    async fn replace(&self, survey_id: SurveyId, draft: SurveyDraft) -> Result<SurveyDetail>;
    async fn delete(&self, survey_id: SurveyId) -> Result<bool>;
    async fn find_question(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Option<QuestionRecord>>;
}

#[derive(Clone)]
pub struct SeaOrmSurveyRepository {
    db: DatabaseConnection,
}

impl SeaOrmSurveyRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) fn map_survey(model: survey::Model) -> SurveyRecord {
    SurveyRecord {
        id: SurveyId::new(model.id),
        title: model.title,
        description: model.description,
        year: model.year,
        semester: i32::from(model.semester),
        week: model.week,
        created_at: model.created_at,
    }
}

pub(crate) fn map_question(model: question::Model) -> Result<QuestionRecord> {
    Ok(QuestionRecord {
        id: QuestionId::new(model.id),
        survey_id: SurveyId::new(model.survey_id),
        description: model.description,
        config: QuestionConfig::from_str(&model.config)?,
        order_index: model.order_index,
    })
}

/// Questions of a survey in display order.
pub(crate) async fn load_questions<C: ConnectionTrait>(
    conn: &C,
    survey_id: SurveyId,
) -> Result<Vec<QuestionRecord>> {
    let models = question::Entity::find()
        .filter(question::Column::SurveyId.eq(survey_id.value()))
        .order_by_asc(question::Column::OrderIndex)
        .all(conn)
        .await?;

    models.into_iter().map(map_question).collect()
}

async fn insert_questions<C: ConnectionTrait>(
    conn: &C,
    survey_id: i32,
    drafts: Vec<QuestionDraft>,
) -> Result<Vec<QuestionRecord>> {
    let mut questions = Vec::with_capacity(drafts.len());

    for (index, draft) in drafts.into_iter().enumerate() {
        let order_index = i32::try_from(index)
            .map_err(|_| anyhow!("question index {index} does not fit in order_index"))?;

        let model = question::ActiveModel {
            survey_id: Set(survey_id),
            description: Set(draft.description),
            config: Set(draft.config.to_json()),
            order_index: Set(order_index),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        questions.push(map_question(model)?);
    }

    Ok(questions)
}

fn semester_code(semester: i32) -> Result<i16> {
    i16::try_from(semester)
        .map_err(|_| ServiceError::Internal(anyhow!("semester {semester} out of range")))
}

#[async_trait]
impl SurveyRepository for SeaOrmSurveyRepository {
    async fn create(&self, draft: SurveyDraft) -> Result<SurveyDetail> {
        let txn = self.db.begin().await?;

        let model = survey::ActiveModel {
            title: Set(draft.title),
            description: Set(draft.description),
            year: Set(draft.year),
            semester: Set(semester_code(draft.semester)?),
            week: Set(draft.week),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let questions = insert_questions(&txn, model.id, draft.questions).await?;
        txn.commit().await?;

        info!(survey_id = model.id, questions = questions.len(), "survey created");
        Ok(SurveyDetail {
            survey: map_survey(model),
            questions,
        })
    }

    async fn list(&self, page: Page) -> Result<(Vec<SurveyListing>, u64)> {
        let total = survey::Entity::find().count(&self.db).await?;

        let models = survey::Entity::find()
            .order_by_desc(survey::Column::CreatedAt)
            .order_by_desc(survey::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = models.iter().map(|model| model.id).collect();
        let counts: HashMap<i32, i64> = submission::Entity::find()
            .select_only()
            .column(submission::Column::SurveyId)
            .column_as(Expr::col(submission::Column::Id).count(), "submission_count")
            .filter(submission::Column::SurveyId.is_in(ids))
            .group_by(submission::Column::SurveyId)
            .into_tuple::<(i32, i64)>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        let listings = models
            .into_iter()
            .map(|model| {
                let submission_count = counts
                    .get(&model.id)
                    .map_or(0, |count| u64::try_from(*count).unwrap_or(0));
                SurveyListing {
                    survey: map_survey(model),
                    submission_count,
                }
            })
            .collect();

        Ok((listings, total))
    }

    async fn find(&self, survey_id: SurveyId) -> Result<Option<SurveyDetail>> {
        let Some(model) = survey::Entity::find_by_id(survey_id.value())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let questions = load_questions(&self.db, survey_id).await?;
        Ok(Some(SurveyDetail {
            survey: map_survey(model),
            questions,
        }))
    }

    async fn replace(&self, survey_id: SurveyId, draft: SurveyDraft) -> Result<SurveyDetail> {
        let txn = self.db.begin().await?;

        let model = survey::Entity::find_by_id(survey_id.value())
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("survey {survey_id} not found")))?;

        let submissions = submission::Entity::find()
            .filter(submission::Column::SurveyId.eq(survey_id.value()))
            .count(&txn)
            .await?;
        if submissions > 0 {
            return Err(ServiceError::conflict(
                "survey already has submissions and can no longer be edited",
            ));
        }

        let mut active: survey::ActiveModel = model.into();
        active.title = Set(draft.title);
        active.description = Set(draft.description);
        active.year = Set(draft.year);
        active.semester = Set(semester_code(draft.semester)?);
        active.week = Set(draft.week);
        let model = active.update(&txn).await?;

        question::Entity::delete_many()
            .filter(question::Column::SurveyId.eq(survey_id.value()))
            .exec(&txn)
            .await?;
        let questions = insert_questions(&txn, model.id, draft.questions).await?;
        txn.commit().await?;

        info!(survey_id = %survey_id, "survey replaced");
        Ok(SurveyDetail {
            survey: map_survey(model),
            questions,
        })
    }

    async fn delete(&self, survey_id: SurveyId) -> Result<bool> {
        let txn = self.db.begin().await?;

        let submission_ids = submission::Entity::find()
            .select_only()
            .column(submission::Column::Id)
            .filter(submission::Column::SurveyId.eq(survey_id.value()))
            .into_query();

        answer::Entity::delete_many()
            .filter(answer::Column::SubmissionId.in_subquery(submission_ids))
            .exec(&txn)
            .await?;
        submission::Entity::delete_many()
            .filter(submission::Column::SurveyId.eq(survey_id.value()))
            .exec(&txn)
            .await?;
        question::Entity::delete_many()
            .filter(question::Column::SurveyId.eq(survey_id.value()))
            .exec(&txn)
            .await?;
        let result = survey::Entity::delete_by_id(survey_id.value())
            .exec(&txn)
            .await?;

        txn.commit().await?;

        let deleted = result.rows_affected > 0;
        if deleted {
            info!(survey_id = %survey_id, "survey deleted");
        }
        Ok(deleted)
    }

    async fn find_question(
        &self,
        survey_id: SurveyId,
        question_id: QuestionId,
    ) -> Result<Option<QuestionRecord>> {
        let model = question::Entity::find_by_id(question_id.value())
            .filter(question::Column::SurveyId.eq(survey_id.value()))
            .one(&self.db)
            .await?;

        model.map(map_question).transpose()
    }
}
