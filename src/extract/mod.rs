//! Article extraction: download, filter, summarize, and score one URL.
//!
//! [`ArticleExtractor::extract`] turns a candidate URL into a complete
//! [`ArticleRecord`] or a [`Rejection`] explaining why it was dropped. The
//! checks run in this order:
//!
//! 1. **Fetch**: download and parse the page ([`Rejection::Fetch`])
//! 2. **Length**: body text must reach `min_content_chars` ([`Rejection::TooShort`])
//! 3. **Summary**: extractive summary, first `summary_sentences` sentences
//! 4. **Relevance**: company must appear in title or summary ([`Rejection::Irrelevant`])
//! 5. **Sentiment**: scored over the summary, coarse or per sentence
//!
//! After a successful download the extractor can pause for a configurable
//! delay to stay under publishers' rate limits.

pub mod fetch;
pub mod relevance;
pub mod summarize;

use crate::config::{ExtractionConfig, SentimentMode};
use crate::error::{FetchError, Rejection};
use crate::models::ArticleRecord;
use crate::sentiment::SentimentScorer;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

pub use fetch::HttpArticleFetcher;
pub use relevance::RelevancePolicy;

pub const NO_TITLE: &str = "No Title Found";
pub const NO_SUMMARY: &str = "Summary not available";

/// Sentences produced by the summarizer before the record's own cut.
const SUMMARY_POOL: usize = 5;

/// A downloaded page reduced to plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub title: String,
    pub text: String,
}

/// A capability that downloads and parses one article page.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

#[derive(Clone)]
pub struct ArticleExtractor {
    fetcher: Arc<dyn ArticleFetcher>,
    scorer: SentimentScorer,
    config: ExtractionConfig,
}

impl fmt::Debug for ArticleExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArticleExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ArticleExtractor {
    pub fn new(
        fetcher: Arc<dyn ArticleFetcher>,
        scorer: SentimentScorer,
        config: ExtractionConfig,
    ) -> Self {
        Self {
            fetcher,
            scorer,
            config,
        }
    }

    /// Extract one article about `company` from `url`.
    ///
    /// Never panics and never returns a partially filled record.
    #[instrument(level = "info", skip(self), fields(%url))]
    pub async fn extract(&self, url: &str, company: &str) -> Result<ArticleRecord, Rejection> {
        let page = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| Rejection::Fetch(e.to_string()))?;

        let delay = self.config.politeness_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.build_record(url, company, page)
    }

    /// Apply the filters, summary, and sentiment to an already fetched page.
    pub fn build_record(
        &self,
        url: &str,
        company: &str,
        page: FetchedPage,
    ) -> Result<ArticleRecord, Rejection> {
        let chars = page.text.trim().chars().count();
        if chars < self.config.min_content_chars {
            debug!(chars, min = self.config.min_content_chars, "Body too short");
            return Err(Rejection::TooShort {
                chars,
                min: self.config.min_content_chars,
            });
        }

        let title = match page.title.trim() {
            "" => NO_TITLE.to_string(),
            t => t.to_string(),
        };

        let sentences = summarize::summarize(&title, &page.text, SUMMARY_POOL);
        let summary = sentences
            .into_iter()
            .take(self.config.summary_sentences)
            .collect::<Vec<_>>()
            .join(" ");
        let summary = if summary.trim().is_empty() {
            NO_SUMMARY.to_string()
        } else {
            summary
        };

        let policy = RelevancePolicy::new(company, &self.config.relevance);
        if !policy.matches(&title, &summary) {
            debug!(%title, "Article does not mention the company");
            return Err(Rejection::Irrelevant(company.to_string()));
        }

        let (sentiment, sentence_counts) = match self.config.sentiment_mode {
            SentimentMode::Coarse => (self.scorer.score(&summary), None),
            SentimentMode::Sentences => {
                let (overall, counts) = self.scorer.score_sentences(&summary);
                (overall, Some(counts))
            }
        };

        Ok(ArticleRecord {
            title,
            summary,
            sentiment,
            url: url.to_string(),
            sentence_counts,
        })
    }
}
