use std::collections::HashMap;

use crate::entity::{answer, submission, survey, user};
use crate::error::{Result, ServiceError, is_unique_violation};
use crate::repository::Page;
use crate::repository::survey_repository::load_questions;
use crate::repository::user_repository::{
    UserRecord, find_by_id_number_in, find_or_create, map_model as map_user,
};
use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use survey_core::domain::{
    AnswerId, AnswerInput, DomainError, Identity, QuestionId, SubmissionId, SurveyId,
    validate_answers,
};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub survey_id: SurveyId,
    pub user: UserRecord,
    pub created_at: NaiveDateTime,
    pub answers: Vec<AnswerRecord>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub survey_id: SurveyId,
    pub name: String,
    pub id_number: String,
    pub answers: Vec<AnswerInput>,
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Stores a first-time submission, creating the student when needed.
    async fn admit(&self, new_submission: NewSubmission) -> Result<SubmissionRecord>;
    /// Replaces the answers of an existing submission.
    async fn override_answers(&self, new_submission: NewSubmission) -> Result<SubmissionRecord>;
    async fn has_submitted(&self, survey_id: SurveyId, name: &str, id_number: &str)
    -> Result<bool>;
    async fn list_for_survey(
        &self,
        survey_id: SurveyId,
        page: Page,
    ) -> Result<(Vec<SubmissionRecord>, u64)>;
}

#[derive(Clone)]
pub struct SeaOrmSubmissionRepository {
    db: DatabaseConnection,
}

impl SeaOrmSubmissionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn map_answer(model: answer::Model) -> AnswerRecord {
        AnswerRecord {
            id: AnswerId::new(model.id),
            question_id: QuestionId::new(model.question_id),
            value: model.value,
        }
    }

    fn map_model(
        model: submission::Model,
        user: UserRecord,
        answers: Vec<answer::Model>,
    ) -> SubmissionRecord {
        SubmissionRecord {
            id: SubmissionId::new(model.id),
            survey_id: SurveyId::new(model.survey_id),
            user,
            created_at: model.created_at,
            answers: answers.into_iter().map(Self::map_answer).collect(),
        }
    }
}

async fn ensure_survey<C: ConnectionTrait>(conn: &C, survey_id: SurveyId) -> Result<()> {
    survey::Entity::find_by_id(survey_id.value())
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found(format!("survey {survey_id} not found")))
}

/// Checks identity and answers in the order the request is admitted.
fn precheck(new_submission: &NewSubmission) -> Result<Identity> {
    let identity = Identity::new(&new_submission.name, &new_submission.id_number)?;
    if new_submission.answers.is_empty() {
        return Err(DomainError::NoAnswers.into());
    }
    Ok(identity)
}

async fn check_answers<C: ConnectionTrait>(
    conn: &C,
    survey_id: SurveyId,
    answers: &[AnswerInput],
) -> Result<Vec<AnswerInput>> {
    let questions = load_questions(conn, survey_id).await?;
    let answers = validate_answers(
        questions.iter().map(|question| (question.id, &question.config)),
        answers,
    )?;
    Ok(answers)
}

async fn insert_answers<C: ConnectionTrait>(
    conn: &C,
    submission_id: i32,
    answers: Vec<AnswerInput>,
) -> Result<Vec<answer::Model>> {
    let mut models = Vec::with_capacity(answers.len());
    for input in answers {
        let model = answer::ActiveModel {
            question_id: Set(input.question_id.value()),
            submission_id: Set(submission_id),
            value: Set(input.value),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        models.push(model);
    }
    Ok(models)
}

#[async_trait]
impl SubmissionRepository for SeaOrmSubmissionRepository {
    async fn admit(&self, new_submission: NewSubmission) -> Result<SubmissionRecord> {
        let survey_id = new_submission.survey_id;
        let txn = self.db.begin().await?;

        ensure_survey(&txn, survey_id).await?;
        let identity = precheck(&new_submission)?;

        let resolution = find_or_create(&txn, &identity).await?;
        let new_student = resolution.was_created();
        let user = resolution.into_user()?;

        let existing = submission::Entity::find()
            .filter(submission::Column::SurveyId.eq(survey_id.value()))
            .filter(submission::Column::UserId.eq(user.id.value()))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::conflict(
                "this id number has already submitted the survey",
            ));
        }

        let checked = check_answers(&txn, survey_id, &new_submission.answers).await?;

        let model = submission::ActiveModel {
            survey_id: Set(survey_id.value()),
            user_id: Set(user.id.value()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ServiceError::conflict("this id number has already submitted the survey")
            } else {
                err.into()
            }
        })?;

        let answers = insert_answers(&txn, model.id, checked).await?;
        txn.commit().await?;

        info!(
            survey_id = %survey_id,
            submission_id = model.id,
            user_id = %user.id,
            new_student,
            answers = answers.len(),
            "submission admitted"
        );
        Ok(Self::map_model(model, user, answers))
    }

    async fn override_answers(&self, new_submission: NewSubmission) -> Result<SubmissionRecord> {
        let survey_id = new_submission.survey_id;
        let txn = self.db.begin().await?;

        ensure_survey(&txn, survey_id).await?;
        let identity = precheck(&new_submission)?;

        let user = find_by_id_number_in(&txn, identity.id_number())
            .await?
            .ok_or_else(|| ServiceError::not_found("no user with this id number"))?;
        if !identity.matches_name(&user.name) {
            return Err(DomainError::NameMismatch.into());
        }

        let model = submission::Entity::find()
            .filter(submission::Column::SurveyId.eq(survey_id.value()))
            .filter(submission::Column::UserId.eq(user.id.value()))
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("no submission to override"))?;

        let checked = check_answers(&txn, survey_id, &new_submission.answers).await?;

        answer::Entity::delete_many()
            .filter(answer::Column::SubmissionId.eq(model.id))
            .exec(&txn)
            .await?;
        let answers = insert_answers(&txn, model.id, checked).await?;
        txn.commit().await?;

        info!(
            survey_id = %survey_id,
            submission_id = model.id,
            answers = answers.len(),
            "submission overridden"
        );
        Ok(Self::map_model(model, user, answers))
    }

    async fn has_submitted(
        &self,
        survey_id: SurveyId,
        name: &str,
        id_number: &str,
    ) -> Result<bool> {
        ensure_survey(&self.db, survey_id).await?;

        let Some(user) = find_by_id_number_in(&self.db, id_number.trim()).await? else {
            return Ok(false);
        };
        if user.name != name.trim() {
            return Ok(false);
        }

        let count = submission::Entity::find()
            .filter(submission::Column::SurveyId.eq(survey_id.value()))
            .filter(submission::Column::UserId.eq(user.id.value()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn list_for_survey(
        &self,
        survey_id: SurveyId,
        page: Page,
    ) -> Result<(Vec<SubmissionRecord>, u64)> {
        let total = submission::Entity::find()
            .filter(submission::Column::SurveyId.eq(survey_id.value()))
            .count(&self.db)
            .await?;

        let rows = submission::Entity::find()
            .filter(submission::Column::SurveyId.eq(survey_id.value()))
            .find_also_related(user::Entity)
            .order_by_asc(submission::Column::CreatedAt)
            .order_by_asc(submission::Column::Id)
            .offset(page.offset())
            .limit(page.limit)
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|(model, _)| model.id).collect();
        let mut answers: HashMap<i32, Vec<answer::Model>> = HashMap::new();
        for model in answer::Entity::find()
            .filter(answer::Column::SubmissionId.is_in(ids))
            .order_by_asc(answer::Column::Id)
            .all(&self.db)
            .await?
        {
            answers.entry(model.submission_id).or_default().push(model);
        }

        let submissions = rows
            .into_iter()
            .map(|(model, user)| {
                let user = user.ok_or_else(|| {
                    anyhow!("submission {} references a missing user", model.id)
                })?;
                let user = map_user(user)?;
                let answers = answers.remove(&model.id).unwrap_or_default();
                Ok(Self::map_model(model, user, answers))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((submissions, total))
    }
}
