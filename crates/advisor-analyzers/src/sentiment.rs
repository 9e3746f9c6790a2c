//! Keyword sentiment and headline de-duplication for news items

use advisor_core::{AdvisorError, NewsItem, Result};
use regex::Regex;
use std::collections::HashSet;

/// Word stems that mark an article as bullish
pub const POSITIVE_STEMS: &[&str] = &[
    "beat", "exceed", "growth", "profit", "upgrad", "bullish", "surg", "rall", "gain", "strong",
    "record", "outperform", "soar", "jump", "expan", "innovat", "partnership",
];

/// Word stems that mark an article as bearish
pub const NEGATIVE_STEMS: &[&str] = &[
    "miss", "declin", "loss", "downgrad", "bearish", "plung", "fall", "weak", "lawsuit", "cut",
    "drop", "underperform", "slump", "recall", "investigat", "layoff", "warn",
];

/// Headlines sharing more than this fraction of words are the same story
pub const DUPLICATE_SIMILARITY: f64 = 0.8;

/// Polarity counts over a set of articles
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SentimentReading {
    /// Mean article polarity in [-1, 1]
    pub polarity: f64,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentReading {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Counts bullish and bearish keywords in headlines and summaries
#[derive(Debug, Clone)]
pub struct KeywordSentiment {
    positive: Regex,
    negative: Regex,
}

impl KeywordSentiment {
    /// Classifier using [`POSITIVE_STEMS`] and [`NEGATIVE_STEMS`]
    pub fn new() -> Result<Self> {
        Self::with_stems(POSITIVE_STEMS, NEGATIVE_STEMS)
    }

    /// Classifier using custom word stems
    pub fn with_stems(positive: &[&str], negative: &[&str]) -> Result<Self> {
        Ok(Self {
            positive: stem_pattern(positive)?,
            negative: stem_pattern(negative)?,
        })
    }

    /// Polarity of one text: +1, -1 or 0 by majority of keyword hits
    pub fn polarity(&self, text: &str) -> f64 {
        let positive = self.positive.find_iter(text).count();
        let negative = self.negative.find_iter(text).count();
        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => 1.0,
            std::cmp::Ordering::Less => -1.0,
            std::cmp::Ordering::Equal => 0.0,
        }
    }

    /// Article polarity, preferring a provider-supplied value
    pub fn item_polarity(&self, item: &NewsItem) -> f64 {
        if let Some(value) = item.sentiment.filter(|v| v.is_finite()) {
            return value.clamp(-1.0, 1.0);
        }
        let mut text = item.headline.clone();
        if let Some(summary) = &item.summary {
            text.push(' ');
            text.push_str(summary);
        }
        self.polarity(&text)
    }

    /// Read sentiment across a set of articles
    pub fn read(&self, items: &[&NewsItem]) -> SentimentReading {
        let mut reading = SentimentReading::default();
        if items.is_empty() {
            return reading;
        }
        let mut sum = 0.0;
        for item in items {
            let polarity = self.item_polarity(item);
            sum += polarity;
            if polarity > 0.0 {
                reading.positive += 1;
            } else if polarity < 0.0 {
                reading.negative += 1;
            } else {
                reading.neutral += 1;
            }
        }
        reading.polarity = sum / items.len() as f64;
        reading
    }
}

fn stem_pattern(stems: &[&str]) -> Result<Regex> {
    let alternatives: Vec<String> = stems.iter().map(|s| regex::escape(s)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\w*", alternatives.join("|")))
        .map_err(|e| AdvisorError::Other(format!("invalid sentiment keyword pattern: {e}")))
}

fn words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard similarity of the word sets of two headlines
pub fn headline_similarity(a: &str, b: &str) -> f64 {
    let a = words(a);
    let b = words(b);
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f64 / union as f64
}

/// Drop articles whose headline is at least `DUPLICATE_SIMILARITY` similar to an earlier one
pub fn dedupe<'a>(items: impl IntoIterator<Item = &'a NewsItem>) -> Vec<&'a NewsItem> {
    let mut kept: Vec<&NewsItem> = Vec::new();
    for item in items {
        if !kept
            .iter()
            .any(|k| headline_similarity(&k.headline, &item.headline) >= DUPLICATE_SIMILARITY)
        {
            kept.push(item);
        }
    }
    kept
}
