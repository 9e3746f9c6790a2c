//! Recent news volume and sentiment
//!
//! Sentiment comes from the optional language-model assessment carried in
//! the snapshot when present, and from keyword counting otherwise. The
//! model path always yields a higher confidence than the keyword path for
//! the same articles.

use super::NEWS;
use crate::sentiment::{KeywordSentiment, dedupe};
use advisor_core::{
    AnalysisResult, Analyzer, Classifier, NewsItem, Result, Scorecard, SentimentMethod,
    StockSnapshot,
};
use chrono::Duration;
use std::collections::BTreeSet;

/// Articles older than this relative to the snapshot are ignored
pub const LOOKBACK_DAYS: i64 = 30;

const BASE_CONFIDENCE: f64 = 0.55;
const CONFIDENCE_PER_ARTICLE: f64 = 0.01;
const MAX_KEYWORD_CONFIDENCE: f64 = 0.70;
const MULTI_SOURCE_BOOST: f64 = 0.05;
const LLM_BOOST: f64 = 0.10;
const LLM_BOOST_PER_EXTRA_PROVIDER: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.90;

const HIGH_ACTIVITY_ARTICLES: usize = 10;
const POLARITY_WEIGHT: f64 = 0.6;
const POLARITY_LABEL_THRESHOLD: f64 = 0.15;

/// Model assessments below this self-reported confidence are flagged
const LOW_MODEL_CONFIDENCE: f64 = 0.5;
const SUMMARY_CHARS: usize = 100;

/// Scores article count and polarity over the lookback window
#[derive(Debug, Clone)]
pub struct NewsAnalyzer {
    classifier: Classifier,
    keywords: KeywordSentiment,
    lookback: Duration,
}

impl NewsAnalyzer {
    pub fn new(classifier: Classifier) -> Result<Self> {
        Ok(Self {
            classifier,
            keywords: KeywordSentiment::new()?,
            lookback: Duration::days(LOOKBACK_DAYS),
        })
    }

    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    /// Confidence for `articles` from `sources` outlets, with `providers`
    /// language models behind the sentiment (0 for keyword counting)
    pub fn confidence(articles: usize, sources: usize, providers: usize) -> f64 {
        let mut confidence = (BASE_CONFIDENCE + CONFIDENCE_PER_ARTICLE * articles as f64)
            .min(MAX_KEYWORD_CONFIDENCE);
        if sources >= 2 {
            confidence += MULTI_SOURCE_BOOST;
        }
        if providers > 0 {
            let scale = 1.0 + LLM_BOOST_PER_EXTRA_PROVIDER * (providers - 1) as f64;
            confidence = (confidence + LLM_BOOST * scale).min(MAX_CONFIDENCE);
        }
        confidence
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn label(polarity: f64) -> &'static str {
    if polarity > POLARITY_LABEL_THRESHOLD {
        "Positive"
    } else if polarity < -POLARITY_LABEL_THRESHOLD {
        "Negative"
    } else {
        "Neutral"
    }
}

impl Analyzer for NewsAnalyzer {
    fn name(&self) -> &str {
        NEWS
    }

    fn description(&self) -> &str {
        "News Analysis"
    }

    fn analyze(&self, snapshot: &StockSnapshot) -> Result<AnalysisResult> {
        let since = snapshot.as_of - self.lookback;
        let articles = dedupe(snapshot.news.iter().filter(|n| n.published_at >= since));
        if articles.is_empty() {
            return Ok(AnalysisResult::inapplicable(
                NEWS,
                format!("No news articles found in the last {} days", self.lookback.num_days()),
            ));
        }

        let sources: BTreeSet<&str> = articles.iter().map(|a| a.source.as_str()).collect();
        let mut card = Scorecard::new(NEWS);
        card.metric("articles", articles.len() as f64);
        card.metric("sources", sources.len() as f64);
        card.note(format!(
            "{} recent articles from {} sources",
            articles.len(),
            sources.len()
        ));

        if articles.len() >= HIGH_ACTIVITY_ARTICLES {
            card.add(0.1, "High news activity");
        }

        let providers = match &snapshot.news_sentiment {
            Some(assessment) if assessment.score.is_finite() => {
                let polarity = assessment.score.clamp(-1.0, 1.0);
                let via = match &assessment.method {
                    SentimentMethod::Llm { providers } if !providers.is_empty() => {
                        format!("language model ({})", providers.join(", "))
                    }
                    SentimentMethod::Llm { .. } => "language model".to_string(),
                    SentimentMethod::Keyword => "keyword analysis".to_string(),
                };
                card.add(
                    POLARITY_WEIGHT * polarity,
                    format!("{} news sentiment ({polarity:+.2}) via {via}", label(polarity)),
                );
                if !assessment.themes.is_empty() {
                    card.note(format!("Key themes: {}", assessment.themes.join(", ")));
                }
                if let Some(summary) = assessment.summary.as_deref().map(str::trim) {
                    if !summary.is_empty() {
                        card.note(format!("Summary: {}", truncate(summary, SUMMARY_CHARS)));
                    }
                }
                if assessment.confidence.is_finite() {
                    card.metric("sentiment_confidence", assessment.confidence);
                    if assessment.confidence < LOW_MODEL_CONFIDENCE {
                        card.note(format!(
                            "Model reports low confidence in this sentiment ({:.0}%)",
                            assessment.confidence * 100.0
                        ));
                    }
                }
                card.metric("sentiment", polarity);
                assessment.provider_count()
            }
            _ => {
                let reading = self.keywords.read(&articles);
                card.add(
                    POLARITY_WEIGHT * reading.polarity,
                    format!(
                        "{} news sentiment ({:+.2}) via keyword analysis: {} positive, {} negative, {} neutral",
                        label(reading.polarity),
                        reading.polarity,
                        reading.positive,
                        reading.negative,
                        reading.neutral
                    ),
                );
                card.metric("sentiment", reading.polarity);
                0
            }
        };

        let confidence = Self::confidence(articles.len(), sources.len(), providers);
        let mut kept: Vec<NewsItem> = articles.into_iter().cloned().collect();
        kept.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(card.finish(confidence, &self.classifier).with_articles(kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{news, start};
    use advisor_core::{RecommendationType, SentimentAssessment};

    fn analyzer() -> NewsAnalyzer {
        NewsAnalyzer::new(Classifier::default()).unwrap()
    }

    fn snapshot_with(headlines: &[(&str, &str)]) -> StockSnapshot {
        let as_of = start() + Duration::days(60);
        let items = headlines
            .iter()
            .enumerate()
            .map(|(i, (h, s))| news(h, s, as_of - Duration::days(i as i64)))
            .collect();
        StockSnapshot::new("TEST", 100.0, 99.0)
            .with_as_of(as_of)
            .with_news(items)
    }

    fn llm(score: f64, providers: &[&str]) -> SentimentAssessment {
        SentimentAssessment {
            score,
            confidence: 0.8,
            method: SentimentMethod::Llm {
                providers: providers.iter().map(ToString::to_string).collect(),
            },
            themes: vec!["earnings".to_string()],
            summary: None,
        }
    }

    #[test]
    fn test_no_news_is_inapplicable() {
        let result = analyzer().analyze(&snapshot_with(&[])).unwrap();
        assert!(!result.applicable);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_stale_news_is_inapplicable() {
        let as_of = start() + Duration::days(90);
        let snapshot = StockSnapshot::new("TEST", 100.0, 99.0)
            .with_as_of(as_of)
            .with_news(vec![news("Profit surges", "wire", start())]);
        let result = analyzer().analyze(&snapshot).unwrap();
        assert!(!result.applicable);
    }

    #[test]
    fn test_keyword_sentiment() {
        let snapshot = snapshot_with(&[
            ("Profit jumps to record high", "Reuters"),
            ("Analysts upgrade shares after strong quarter", "Bloomberg"),
            ("Company faces lawsuit over patents", "Reuters"),
            ("Revenue growth accelerates", "CNBC"),
        ]);
        let result = analyzer().analyze(&snapshot).unwrap();

        assert!(result.applicable);
        // polarity (1 + 1 - 1 + 1) / 4
        assert!((result.score - 0.3).abs() < 1e-9);
        assert_eq!(result.recommendation_type, RecommendationType::Buy);
        assert_eq!(result.reasoning[0], "4 recent articles from 3 sources");
        assert!(result.reasoning[1].contains("3 positive, 1 negative, 0 neutral"));
        assert!((result.confidence - (0.59 + 0.05)).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_headlines_counted_once() {
        let snapshot = snapshot_with(&[
            ("Shares plunge on weak guidance", "Reuters"),
            ("Shares plunge on weak guidance", "Yahoo"),
        ]);
        let result = analyzer().analyze(&snapshot).unwrap();
        assert_eq!(result.metrics.get("articles"), Some(&1.0));
        assert!(result.score < 0.0);
    }

    #[test]
    fn test_llm_confidence_strictly_higher() {
        let headlines = [
            ("Profit jumps to record high", "Reuters"),
            ("New product launch announced", "Bloomberg"),
        ];
        let keyword = analyzer().analyze(&snapshot_with(&headlines)).unwrap();
        let model = analyzer()
            .analyze(&snapshot_with(&headlines).with_news_sentiment(llm(0.5, &["provider-a"])))
            .unwrap();

        assert!(model.confidence > keyword.confidence);
        assert!((model.score - 0.3).abs() < 1e-9);
        assert!(model.reasoning.iter().any(|r| r.contains("Key themes: earnings")));
    }

    #[test]
    fn test_model_summary_and_confidence_reported() {
        let mut assessment = llm(-0.4, &["provider-a", "provider-b"]);
        assessment.confidence = 0.3;
        assessment.summary = Some("x".repeat(150));
        let snapshot = snapshot_with(&[("Guidance trimmed", "wire")]).with_news_sentiment(assessment);
        let result = analyzer().analyze(&snapshot).unwrap();

        let summary = result
            .reasoning
            .iter()
            .find(|r| r.starts_with("Summary: "))
            .unwrap();
        assert_eq!(summary, &format!("Summary: {}...", "x".repeat(100)));
        assert!(result.reasoning.iter().any(|r| r.contains("low confidence")));
        assert_eq!(result.metrics["sentiment_confidence"], 0.3);
    }

    #[test]
    fn test_kept_articles_attached_newest_first() {
        let snapshot = snapshot_with(&[
            ("Shares plunge on weak guidance", "Reuters"),
            ("Shares plunge on weak guidance", "Yahoo"),
            ("Board approves buyback", "Bloomberg"),
        ]);
        let result = analyzer().analyze(&snapshot).unwrap();

        let headlines: Vec<&str> = result.articles.iter().map(|a| a.headline.as_str()).collect();
        assert_eq!(headlines, vec!["Shares plunge on weak guidance", "Board approves buyback"]);
        assert!(result.articles[0].published_at > result.articles[1].published_at);
    }

    #[test]
    fn test_confidence_curve() {
        for articles in [1, 5, 15, 40] {
            for sources in [1, 3] {
                let keyword = NewsAnalyzer::confidence(articles, sources, 0);
                let one = NewsAnalyzer::confidence(articles, sources, 1);
                let three = NewsAnalyzer::confidence(articles, sources, 3);
                assert!(keyword < one, "{articles}/{sources}");
                assert!(one <= three);
                assert!(three <= MAX_CONFIDENCE);
            }
        }
        assert!(NewsAnalyzer::confidence(3, 2, 0) > NewsAnalyzer::confidence(3, 1, 0));
    }

    #[test]
    fn test_high_activity() {
        let headlines: Vec<String> = (0..12).map(|i| format!("Update number {i} on operations")).collect();
        let pairs: Vec<(&str, &str)> = headlines.iter().map(|h| (h.as_str(), "wire")).collect();
        let result = analyzer().analyze(&snapshot_with(&pairs)).unwrap();
        assert!((result.score - 0.1).abs() < 1e-9);
        assert!(result.reasoning.contains(&"High news activity".to_string()));
    }
}
