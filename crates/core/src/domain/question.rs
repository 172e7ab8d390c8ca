use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

pub const DEFAULT_MAX_RATING: u32 = 5;
pub const MAX_RATING_LIMIT: u32 = 10;
/// Stored for input questions created without an explicit limit.
pub const DEFAULT_INPUT_MAX_LENGTH: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Star,
    Input,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::Star => f.write_str("star"),
            QuestionType::Input => f.write_str("input"),
        }
    }
}

/// Per-question configuration, tagged by `type` on the wire and in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionConfig {
    Star {
        #[serde(rename = "maxRating", default = "default_max_rating")]
        max_rating: u32,
    },
    Input {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multiline: Option<bool>,
        #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
        max_length: Option<u32>,
    },
}

fn default_max_rating() -> u32 {
    DEFAULT_MAX_RATING
}

impl QuestionConfig {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionConfig::Star { .. } => QuestionType::Star,
            QuestionConfig::Input { .. } => QuestionType::Input,
        }
    }

    /// Checks the parameters and fills in defaults that are persisted with the question.
    pub fn normalized(self) -> Result<Self, DomainError> {
        match self {
            QuestionConfig::Star { max_rating } => {
                if !(1..=MAX_RATING_LIMIT).contains(&max_rating) {
                    return Err(DomainError::OutOfRange {
                        field: "maxRating",
                        min: 1,
                        max: i64::from(MAX_RATING_LIMIT),
                        value: i64::from(max_rating),
                    });
                }
                Ok(QuestionConfig::Star { max_rating })
            }
            QuestionConfig::Input {
                multiline,
                max_length,
            } => {
                if max_length == Some(0) {
                    return Err(DomainError::OutOfRange {
                        field: "maxLength",
                        min: 1,
                        max: i64::from(u32::MAX),
                        value: 0,
                    });
                }
                Ok(QuestionConfig::Input {
                    multiline,
                    max_length: Some(max_length.unwrap_or(DEFAULT_INPUT_MAX_LENGTH)),
                })
            }
        }
    }

    pub fn to_json(&self) -> String {
        // Both variants contain only integers and booleans.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl FromStr for QuestionConfig {
    type Err = DomainError;

    /// Decodes a stored config, reporting unknown `type` tags separately from malformed JSON.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|err| DomainError::InvalidQuestionConfig(err.to_string()))?;

        match value.get("type").and_then(serde_json::Value::as_str) {
            Some("star") | Some("input") => serde_json::from_value(value)
                .map_err(|err| DomainError::InvalidQuestionConfig(err.to_string())),
            Some(other) => Err(DomainError::UnsupportedQuestionType(other.to_string())),
            None => Err(DomainError::InvalidQuestionConfig(
                "missing `type` tag".to_string(),
            )),
        }
    }
}
