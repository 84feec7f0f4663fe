//! Data models for discovered links, extracted articles, and insight reports.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`CandidateLink`]: A URL found by discovery for a query term
//! - [`ArticleRecord`]: An accepted, summarized, sentiment-scored article
//! - [`SentimentTally`]: Per-label article counts for one run
//! - [`ComparisonEntry`]: Prose relating two adjacent articles
//! - [`InsightReport`]: Everything one run hands back to its caller
//!
//! Field names on the serialized types follow the JSON contract consumed by
//! the HTTP front-end (`sentiment_summary`, `tts_audio`, `"Comparison"`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A candidate article URL returned by a link source.
///
/// Links have no identity beyond their literal URL; `query` records which
/// search produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// The absolute article URL.
    pub url: String,
    /// The query term that discovered this link.
    pub query: String,
}

/// Polarity label for a span of text or a whole article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Classify a compound polarity value in `[-1, 1]`.
    ///
    /// Values above `0.05` are positive, below `-0.05` negative, and
    /// everything in between (inclusive) neutral.
    pub fn from_compound(compound: f64) -> Self {
        if compound > 0.05 {
            Sentiment::Positive
        } else if compound < -0.05 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Per-sentence label counts from fine-grained scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceCounts {
    #[serde(rename = "positive_sentences")]
    pub positive: usize,
    #[serde(rename = "negative_sentences")]
    pub negative: usize,
    #[serde(rename = "neutral_sentences")]
    pub neutral: usize,
}

impl SentenceCounts {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    /// Majority vote between positive and negative sentences.
    ///
    /// Ties, and texts whose sentences are mostly neutral, resolve to
    /// [`Sentiment::Neutral`].
    pub fn overall(&self) -> Sentiment {
        if self.positive > self.negative {
            Sentiment::Positive
        } else if self.negative > self.positive {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }

    /// Field-wise sum, used to aggregate sentence counts across articles.
    pub fn merge(&mut self, other: &SentenceCounts) {
        self.positive += other.positive;
        self.negative += other.negative;
        self.neutral += other.neutral;
    }
}

/// An article that passed every extraction filter.
///
/// Records are complete or never produced: the extractor substitutes
/// sentinels for a missing title or summary rather than leaving them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// The article headline, or `"No Title Found"`.
    pub title: String,
    /// The first few sentences of the extractive summary, or `"Summary not available"`.
    pub summary: String,
    /// Overall article sentiment.
    pub sentiment: Sentiment,
    /// Where the article was fetched from.
    pub url: String,
    /// Per-sentence counts when fine-grained scoring is enabled.
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub sentence_counts: Option<SentenceCounts>,
}

impl ArticleRecord {
    /// Extract the domain name (before .com/.org/etc) from the article URL
    /// For example: "https://www.reuters.com/business/..." -> "reuters"
    pub fn source_tag(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host.split('.').collect();
        if parts.len() >= 2 {
            return Some(parts[parts.len() - 2].to_string());
        }
        None
    }
}

/// Number of accepted articles per sentiment label in one run.
///
/// Serialized as `{"Positive": n, "Negative": n, "Neutral": n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    #[serde(rename = "Positive")]
    pub positive: usize,
    #[serde(rename = "Negative")]
    pub negative: usize,
    #[serde(rename = "Neutral")]
    pub neutral: usize,
}

impl SentimentTally {
    /// Build a tally from the article-level labels of `articles`.
    pub fn from_articles(articles: &[ArticleRecord]) -> Self {
        let mut tally = SentimentTally::default();
        for article in articles {
            tally.record(article.sentiment);
        }
        tally
    }

    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    #[cfg(test)]
    pub fn get(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Negative => self.negative,
            Sentiment::Neutral => self.neutral,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Prose relating article `i` to article `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    #[serde(rename = "Comparison")]
    pub comparison: String,
}

impl ComparisonEntry {
    /// Compare the article at zero-based `index` with its successor.
    ///
    /// Articles are numbered from one in the generated sentence.
    pub fn between(index: usize, first: &ArticleRecord, second: &ArticleRecord) -> Self {
        Self {
            comparison: format!(
                "Article {} discusses '{}' while Article {} covers '{}'.",
                index + 1,
                first.title,
                index + 2,
                second.title
            ),
        }
    }
}

/// A synthesized speech file written by the speech digest generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    /// The bare file name; this is the reference handed to callers.
    pub file_name: String,
    /// Full path on disk.
    pub path: PathBuf,
}

/// The outcome of one successful pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    /// The company the run was for.
    pub company: String,
    /// Accepted articles in discovery order, unique by title.
    pub articles: Vec<ArticleRecord>,
    /// One entry per adjacent pair of articles.
    pub comparative_analysis: Vec<ComparisonEntry>,
    /// Article counts per sentiment label.
    pub sentiment_summary: SentimentTally,
    /// Sentence counts summed over all articles (fine-grained mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_totals: Option<SentenceCounts>,
    /// File name of the Hindi audio digest, if synthesis succeeded.
    pub tts_audio: Option<String>,
}
