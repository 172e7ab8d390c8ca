use super::{DomainError, QuestionConfig};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_SURVEY_DESCRIPTION_LENGTH: usize = 1000;
pub const MAX_QUESTION_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_QUESTIONS: usize = 50;
pub const YEAR_RANGE: (i32, i32) = (2020, 2100);
pub const WEEK_RANGE: (i32, i32) = (1, 30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub description: Option<String>,
    pub config: QuestionConfig,
}

/// Survey fields and ordered questions as supplied for create or replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyDraft {
    pub title: String,
    pub description: Option<String>,
    pub year: i32,
    pub semester: i32,
    pub week: i32,
    pub questions: Vec<QuestionDraft>,
}

impl SurveyDraft {
    /// Validates the draft and returns it with trimmed text and normalized question configs.
    pub fn validated(self) -> Result<Self, DomainError> {
        let title = self.title.trim().to_string();
        let title_len = title.chars().count();
        if title_len == 0 || title_len > MAX_TITLE_LENGTH {
            return Err(DomainError::FieldLength {
                field: "title",
                min: 1,
                max: MAX_TITLE_LENGTH,
            });
        }

        let description = non_blank(self.description);
        check_max_length("description", &description, MAX_SURVEY_DESCRIPTION_LENGTH)?;

        check_range("year", self.year, YEAR_RANGE)?;
        check_range("semester", self.semester, (1, 2))?;
        check_range("week", self.week, WEEK_RANGE)?;

        if self.questions.is_empty() || self.questions.len() > MAX_QUESTIONS {
            return Err(DomainError::QuestionCount { max: MAX_QUESTIONS });
        }

        let questions = self
            .questions
            .into_iter()
            .map(|question| {
                let description = non_blank(question.description);
                check_max_length(
                    "question description",
                    &description,
                    MAX_QUESTION_DESCRIPTION_LENGTH,
                )?;
                Ok(QuestionDraft {
                    description,
                    config: question.config.normalized()?,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Self {
            title,
            description,
            year: self.year,
            semester: self.semester,
            week: self.week,
            questions,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn check_max_length(
    field: &'static str,
    value: &Option<String>,
    max: usize,
) -> Result<(), DomainError> {
    match value {
        Some(text) if text.chars().count() > max => {
            Err(DomainError::FieldLength { field, min: 0, max })
        }
        _ => Ok(()),
    }
}

fn check_range(field: &'static str, value: i32, (min, max): (i32, i32)) -> Result<(), DomainError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DomainError::OutOfRange {
            field,
            min: i64::from(min),
            max: i64::from(max),
            value: i64::from(value),
        })
    }
}
