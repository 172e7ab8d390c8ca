//! Summaries of all answers to one question.
//!
//! Star questions produce a rating histogram with an average, input questions
//! a word-frequency list suitable for a word cloud. Both are pure functions
//! of the question config and the raw answer values.

use jieba_rs::Jieba;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use super::QuestionConfig;

/// Maximum number of entries in a word cloud.
pub const WORD_CLOUD_LIMIT: usize = 50;

static JIEBA: LazyLock<Jieba> = LazyLock::new(Jieba::new);

/// Splits free text into candidate words.
pub trait Segmenter: Send + Sync {
    fn segment<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Dictionary + HMM segmentation; handles Chinese as well as space-separated text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JiebaSegmenter;

impl Segmenter for JiebaSegmenter {
    fn segment<'a>(&self, text: &'a str) -> Vec<&'a str> {
        JIEBA.cut(text, true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordWeight {
    pub text: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCloud {
    pub words: Vec<WordWeight>,
    pub total_responses: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StarDistribution {
    pub distribution: BTreeMap<u32, u32>,
    pub total_responses: u32,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Insight {
    #[serde(rename = "wordcloud")]
    WordCloud(WordCloud),
    #[serde(rename = "star_distribution")]
    StarDistribution(StarDistribution),
}

pub fn star_distribution<'a>(
    max_rating: u32,
    values: impl IntoIterator<Item = &'a str>,
) -> StarDistribution {
    let mut distribution: BTreeMap<u32, u32> = (0..=max_rating).map(|star| (star, 0)).collect();
    let mut sum: u64 = 0;
    let mut valid: u32 = 0;

    for value in values {
        let Ok(rating) = value.trim().parse::<i64>() else {
            continue;
        };
        let Ok(rating) = u32::try_from(rating) else {
            continue;
        };
        if rating > max_rating {
            continue;
        }

        *distribution.entry(rating).or_insert(0) += 1;
        sum += u64::from(rating);
        valid += 1;
    }

    let average = if valid == 0 {
        0.0
    } else {
        sum as f64 / f64::from(valid)
    };

    StarDistribution {
        distribution,
        total_responses: valid,
        average: (average * 100.0).round() / 100.0,
    }
}

pub fn word_cloud<'a, S>(
    segmenter: &S,
    values: impl IntoIterator<Item = &'a str>,
    limit: usize,
) -> WordCloud
where
    S: Segmenter + ?Sized,
{
    // Insertion order is kept so equal weights stay in first-seen order after the stable sort.
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, u32)> = Vec::new();
    let mut total_responses: u32 = 0;

    for value in values {
        total_responses += 1;

        for token in segmenter.segment(value) {
            let token = token.trim();
            if token.chars().count() <= 1 {
                continue;
            }

            match index.get(token) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(token, counts.len());
                    counts.push((token, 1));
                }
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(limit);

    WordCloud {
        words: counts
            .into_iter()
            .map(|(text, weight)| WordWeight {
                text: text.to_string(),
                weight,
            })
            .collect(),
        total_responses,
    }
}

pub fn question_insight_with<S>(segmenter: &S, config: &QuestionConfig, values: &[String]) -> Insight
where
    S: Segmenter + ?Sized,
{
    let values = values.iter().map(String::as_str);

    match config {
        QuestionConfig::Star { max_rating } => {
            Insight::StarDistribution(star_distribution(*max_rating, values))
        }
        QuestionConfig::Input { .. } => {
            Insight::WordCloud(word_cloud(segmenter, values, WORD_CLOUD_LIMIT))
        }
    }
}

pub fn question_insight(config: &QuestionConfig, values: &[String]) -> Insight {
    question_insight_with(&JiebaSegmenter, config, values)
}
