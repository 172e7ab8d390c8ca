use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_len(User::Name, 100))
                    .col(string_len(User::IdNumber, 50).unique_key())
                    // Role enum is represented in app code. 0=student, 1=admin
                    .col(
                        small_integer(User::Role)
                            .default(0)
                            .check(Expr::col(User::Role).gte(0))
                            .check(Expr::col(User::Role).lte(1)),
                    )
                    .col(string_null(User::PasswordHash))
                    .col(timestamp(User::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Survey::Table)
                    .if_not_exists()
                    .col(pk_auto(Survey::Id))
                    .col(string_len(Survey::Title, 200))
                    .col(text_null(Survey::Description))
                    .col(integer(Survey::Year))
                    .col(
                        small_integer(Survey::Semester)
                            .check(Expr::col(Survey::Semester).gte(1))
                            .check(Expr::col(Survey::Semester).lte(2)),
                    )
                    .col(integer(Survey::Week))
                    .col(timestamp(Survey::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(pk_auto(Question::Id))
                    .col(integer(Question::SurveyId))
                    .col(text_null(Question::Description))
                    // Tagged JSON: {"type":"star",...} or {"type":"input",...}
                    .col(text(Question::Config))
                    .col(integer(Question::OrderIndex))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-question-survey_id")
                            .from(Question::Table, Question::SurveyId)
                            .to(Survey::Table, Survey::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(pk_auto(Submission::Id))
                    .col(integer(Submission::SurveyId))
                    .col(integer(Submission::UserId))
                    .col(timestamp(Submission::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submission-survey_id")
                            .from(Submission::Table, Submission::SurveyId)
                            .to(Survey::Table, Survey::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submission-user_id")
                            .from(Submission::Table, Submission::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Answer::Table)
                    .if_not_exists()
                    .col(pk_auto(Answer::Id))
                    .col(integer(Answer::QuestionId))
                    .col(integer(Answer::SubmissionId))
                    .col(text(Answer::Value))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-answer-question_id")
                            .from(Answer::Table, Answer::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-answer-submission_id")
                            .from(Answer::Table, Answer::SubmissionId)
                            .to(Submission::Table, Submission::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one submission per user per survey.
        manager
            .create_index(
                Index::create()
                    .name("idx_submission_survey_user")
                    .table(Submission::Table)
                    .col(Submission::SurveyId)
                    .col(Submission::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_question_survey_order")
                    .table(Question::Table)
                    .col(Question::SurveyId)
                    .col(Question::OrderIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_answer_question_id")
                    .table(Answer::Table)
                    .col(Answer::QuestionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_answer_submission_id")
                    .table(Answer::Table)
                    .col(Answer::SubmissionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_survey_created_at")
                    .table(Survey::Table)
                    .col(Survey::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Answer::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Survey::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Name,
    IdNumber,
    Role,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Survey {
    Table,
    Id,
    Title,
    Description,
    Year,
    Semester,
    Week,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Question {
    Table,
    Id,
    SurveyId,
    Description,
    Config,
    OrderIndex,
}

#[derive(DeriveIden)]
enum Submission {
    Table,
    Id,
    SurveyId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Answer {
    Table,
    Id,
    QuestionId,
    SubmissionId,
    Value,
}
