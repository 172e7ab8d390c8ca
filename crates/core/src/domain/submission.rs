use std::collections::{HashMap, HashSet};

use super::{DomainError, QuestionConfig, QuestionId};

/// One answer as submitted, before it is checked against the survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerInput {
    pub question_id: QuestionId,
    pub value: String,
}

impl AnswerInput {
    pub fn new(question_id: QuestionId, value: impl Into<String>) -> Self {
        Self {
            question_id,
            value: value.into(),
        }
    }
}

/// Checks one answer and returns the value to store.
///
/// Star ratings are stored in canonical decimal form, so `"+5"` and `" 5 "` become `"5"`.
pub fn validate_answer(
    question_id: QuestionId,
    config: &QuestionConfig,
    value: &str,
) -> Result<String, DomainError> {
    match config {
        QuestionConfig::Input { max_length, .. } => match max_length {
            Some(max_length) if value.chars().count() > *max_length as usize => {
                Err(DomainError::AnswerTooLong {
                    question_id,
                    max_length: *max_length,
                })
            }
            _ => Ok(value.to_string()),
        },
        QuestionConfig::Star { max_rating } => match value.trim().parse::<i64>() {
            Ok(rating) if (0..=i64::from(*max_rating)).contains(&rating) => Ok(rating.to_string()),
            _ => Err(DomainError::InvalidRating {
                question_id,
                max_rating: *max_rating,
            }),
        },
    }
}

/// Checks every answer against the questions of its survey and returns the
/// answers with their stored values.
///
/// Each question may be answered at most once; questions without an answer are allowed.
pub fn validate_answers<'a>(
    questions: impl IntoIterator<Item = (QuestionId, &'a QuestionConfig)>,
    answers: &[AnswerInput],
) -> Result<Vec<AnswerInput>, DomainError> {
    if answers.is_empty() {
        return Err(DomainError::NoAnswers);
    }

    let configs: HashMap<QuestionId, &QuestionConfig> = questions.into_iter().collect();
    let mut seen = HashSet::with_capacity(answers.len());

    answers
        .iter()
        .map(|answer| {
            let config = configs
                .get(&answer.question_id)
                .ok_or(DomainError::UnknownQuestion(answer.question_id))?;

            if !seen.insert(answer.question_id) {
                return Err(DomainError::DuplicateAnswer(answer.question_id));
            }

            let value = validate_answer(answer.question_id, config, &answer.value)?;
            Ok(AnswerInput::new(answer.question_id, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(max_length: u32) -> QuestionConfig {
        QuestionConfig::Input {
            multiline: None,
            max_length: Some(max_length),
        }
    }

    #[test]
    fn input_over_max_length_is_rejected() {
        let err = validate_answer(QuestionId::new(3), &input(10), "abcdefghijk")
            .expect_err("11 characters should exceed a limit of 10");

        assert_eq!(
            err,
            DomainError::AnswerTooLong {
                question_id: QuestionId::new(3),
                max_length: 10
            }
        );
    }

    #[test]
    fn input_at_max_length_is_accepted() {
        assert!(validate_answer(QuestionId::new(3), &input(10), "abcdefghij").is_ok());
    }

    #[test]
    fn star_rating_bounds_are_inclusive() {
        let config = QuestionConfig::Star { max_rating: 5 };

        assert!(validate_answer(QuestionId::new(1), &config, "0").is_ok());
        assert!(validate_answer(QuestionId::new(1), &config, "5").is_ok());
        assert!(validate_answer(QuestionId::new(1), &config, "6").is_err());
        assert!(validate_answer(QuestionId::new(1), &config, "-1").is_err());
        assert!(validate_answer(QuestionId::new(1), &config, "great").is_err());
    }

    #[test]
    fn star_values_are_stored_in_canonical_form() {
        let star = QuestionConfig::Star { max_rating: 5 };
        let answers = vec![
            AnswerInput::new(QuestionId::new(1), "+5"),
            AnswerInput::new(QuestionId::new(2), " clear slides "),
        ];

        let stored = validate_answers(
            [(QuestionId::new(1), &star), (QuestionId::new(2), &input(50))],
            &answers,
        )
        .expect("answers should be valid");

        assert_eq!(stored[0].value, "5");
        assert_eq!(stored[1].value, " clear slides ");
        assert_eq!(
            validate_answer(QuestionId::new(1), &star, " 04 "),
            Ok("4".to_string())
        );
    }

    #[test]
    fn answer_to_foreign_question_is_rejected() {
        let star = QuestionConfig::Star { max_rating: 5 };
        let answers = vec![AnswerInput::new(QuestionId::new(99), "4")];

        let err = validate_answers([(QuestionId::new(1), &star)], &answers)
            .expect_err("question 99 is not part of the survey");

        assert_eq!(err, DomainError::UnknownQuestion(QuestionId::new(99)));
    }

    #[test]
    fn repeated_question_is_rejected() {
        let star = QuestionConfig::Star { max_rating: 5 };
        let answers = vec![
            AnswerInput::new(QuestionId::new(1), "4"),
            AnswerInput::new(QuestionId::new(1), "5"),
        ];

        let err = validate_answers([(QuestionId::new(1), &star)], &answers)
            .expect_err("question 1 is answered twice");

        assert_eq!(err, DomainError::DuplicateAnswer(QuestionId::new(1)));
    }

    #[test]
    fn empty_answer_set_is_rejected() {
        let star = QuestionConfig::Star { max_rating: 5 };

        assert_eq!(
            validate_answers([(QuestionId::new(1), &star)], &[]),
            Err(DomainError::NoAnswers)
        );
    }
}
