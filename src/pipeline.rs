//! The insight pipeline: discover, extract, aggregate, and voice.
//!
//! One [`InsightPipeline::run`] call processes a single company end to end:
//!
//! 1. **Discovery**: candidate URLs from the configured [`LinkSource`]
//! 2. **Extraction**: bounded concurrent fan-out over [`ArticleExtractor`],
//!    results kept in discovery order
//! 3. **Filtering**: rejections dropped, duplicate titles collapsed (first wins)
//! 4. **Aggregation**: sentiment tally, sentence totals, adjacent comparisons
//! 5. **Speech**: optional Hindi digest; failure only removes the audio
//!
//! The pipeline holds no per-run state, so one instance can serve many
//! concurrent runs.

use crate::audio::AudioStore;
use crate::config::{InsightConfig, PipelineConfig};
use crate::discovery::{LinkSource, build_link_source, discover_or_empty};
use crate::error::{NoResults, SetupError};
use crate::extract::{ArticleExtractor, HttpArticleFetcher};
use crate::models::{ArticleRecord, ComparisonEntry, InsightReport, SentenceCounts, SentimentTally};
use crate::sentiment::SentimentScorer;
use crate::speech::SpeechDigest;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct InsightPipeline {
    links: Arc<dyn LinkSource>,
    extractor: ArticleExtractor,
    speech: Option<SpeechDigest>,
    config: PipelineConfig,
    max_results: usize,
}

impl fmt::Debug for InsightPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightPipeline")
            .field("link_source", &self.links.name())
            .field("extractor", &self.extractor)
            .field("speech", &self.speech)
            .field("config", &self.config)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl InsightPipeline {
    pub fn new(
        links: Arc<dyn LinkSource>,
        extractor: ArticleExtractor,
        speech: Option<SpeechDigest>,
        config: PipelineConfig,
        max_results: usize,
    ) -> Self {
        Self {
            links,
            extractor,
            speech,
            config,
            max_results,
        }
    }

    /// Assemble the production pipeline described by `config`.
    pub fn from_config(config: &InsightConfig) -> Result<Self, SetupError> {
        let links = build_link_source(&config.discovery)?;
        let extractor = ArticleExtractor::new(
            Arc::new(HttpArticleFetcher::new(&config.extraction)?),
            SentimentScorer::bundled(),
            config.extraction.clone(),
        );
        let speech = SpeechDigest::google(AudioStore::new(&config.audio.dir), config.speech.clone())?
            .with_retention(config.audio.retention());
        Ok(Self::new(
            links,
            extractor,
            Some(speech),
            config.pipeline.clone(),
            config.discovery.max_results,
        ))
    }

    /// Drop the speech stage; reports will carry no audio.
    pub fn without_speech(mut self) -> Self {
        self.speech = None;
        self
    }

    /// Run the whole pipeline for `company`.
    ///
    /// Discovers links, extracts them with bounded concurrency, and builds
    /// the report. Speech failures only leave `tts_audio` empty.
    ///
    /// # Arguments
    ///
    /// * `company` - Company name; surrounding whitespace is ignored
    ///
    /// # Returns
    ///
    /// The report, with articles in discovery order and unique by title.
    ///
    /// # Errors
    ///
    /// [`NoResults::NoArticlesFound`] when discovery yields no links, and
    /// [`NoResults::NoRelevantArticles`] when every link is rejected.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, company: &str) -> Result<InsightReport, NoResults> {
        let company = company.trim();

        let links = discover_or_empty(self.links.as_ref(), company, self.max_results).await;
        if links.is_empty() {
            warn!("No candidate links discovered");
            return Err(NoResults::NoArticlesFound);
        }

        let t0 = Instant::now();
        let concurrency = self.config.concurrency.max(1);
        let outcomes: Vec<_> = stream::iter(links)
            .map(|link| async move {
                let outcome = self.extractor.extract(&link.url, company).await;
                (link.url, outcome)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let candidates = outcomes.len();
        let accepted: Vec<ArticleRecord> = outcomes
            .into_iter()
            .filter_map(|(url, outcome)| match outcome {
                Ok(record) => Some(record),
                Err(reason) => {
                    debug!(url = %truncate_for_log(&url, 120), %reason, "Article rejected");
                    None
                }
            })
            .collect();
        let articles = dedup_by_title(accepted);
        info!(
            candidates,
            accepted = articles.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            concurrency,
            "Extraction finished"
        );

        if articles.is_empty() {
            return Err(NoResults::NoRelevantArticles);
        }

        let sentiment_summary = SentimentTally::from_articles(&articles);
        let sentence_totals = sentence_totals(&articles);
        let comparative_analysis = build_comparisons(&articles);

        let tts_audio = match &self.speech {
            None => None,
            Some(speech) => {
                let text = digest_text(&articles, self.config.digest_articles);
                match speech.synthesize(company, &text, &sentiment_summary).await {
                    Ok(artifact) => Some(artifact.file_name),
                    Err(e) => {
                        warn!(error = %e, "Speech digest failed; continuing without audio");
                        None
                    }
                }
            }
        };

        Ok(InsightReport {
            company: company.to_string(),
            articles,
            comparative_analysis,
            sentiment_summary,
            sentence_totals,
            tts_audio,
        })
    }
}

/// Keep the first record for each title, preserving order.
pub fn dedup_by_title(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    let before = records.len();
    let unique: Vec<ArticleRecord> = records
        .into_iter()
        .unique_by(|r| r.title.clone())
        .collect();
    if unique.len() < before {
        debug!(dropped = before - unique.len(), "Collapsed duplicate titles");
    }
    unique
}

/// One comparison per adjacent pair, in order.
pub fn build_comparisons(articles: &[ArticleRecord]) -> Vec<ComparisonEntry> {
    articles
        .iter()
        .tuple_windows()
        .enumerate()
        .map(|(i, (first, second))| ComparisonEntry::between(i, first, second))
        .collect()
}

/// Summed per-sentence counts, present only when some record carries them.
fn sentence_totals(articles: &[ArticleRecord]) -> Option<SentenceCounts> {
    articles
        .iter()
        .filter_map(|a| a.sentence_counts.as_ref())
        .fold(None, |acc, counts| {
            let mut total = acc.unwrap_or_default();
            total.merge(counts);
            Some(total)
        })
}

/// The leading `k` summaries joined by a single space.
pub fn digest_text(articles: &[ArticleRecord], k: usize) -> String {
    articles.iter().take(k).map(|a| a.summary.as_str()).join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiscoveryError;
    use crate::models::{CandidateLink, Sentiment};
    use crate::config::ExtractionConfig;
    use crate::testing::{
        self, EchoTranslator, FailingTranslator, KeywordModel, SlowFetcher, StaticLinks, body,
    };
    use async_trait::async_trait;

    fn record(title: &str, summary: &str, sentiment: Sentiment) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            summary: summary.to_string(),
            sentiment,
            url: format!("https://news.example/{title}"),
            sentence_counts: None,
        }
    }

    fn store(tag: &str) -> AudioStore {
        AudioStore::new(testing::temp_dir(tag))
    }

    #[test]
    fn test_dedup_keeps_first_in_order() {
        let out = dedup_by_title(vec![
            record("A", "first", Sentiment::Positive),
            record("B", "b", Sentiment::Neutral),
            record("A", "second", Sentiment::Negative),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].summary, "first");
        assert_eq!(out[1].title, "B");
    }

    #[test]
    fn test_comparisons_cover_adjacent_pairs() {
        assert!(build_comparisons(&[]).is_empty());
        assert!(build_comparisons(&[record("A", "", Sentiment::Neutral)]).is_empty());

        let articles = vec![
            record("A", "", Sentiment::Neutral),
            record("B", "", Sentiment::Neutral),
            record("C", "", Sentiment::Neutral),
        ];
        let c = build_comparisons(&articles);
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].comparison, "Article 1 discusses 'A' while Article 2 covers 'B'.");
        assert_eq!(c[1].comparison, "Article 2 discusses 'B' while Article 3 covers 'C'.");
    }

    #[test]
    fn test_digest_text_takes_leading_summaries() {
        let articles: Vec<_> = ["one", "two", "three"]
            .iter()
            .map(|s| record(s, s, Sentiment::Neutral))
            .collect();
        assert_eq!(digest_text(&articles, 2), "one two");
        assert_eq!(digest_text(&articles, 5), "one two three");
    }

    #[tokio::test]
    async fn test_no_links_is_no_articles_found() {
        let p = testing::pipeline(vec![], vec![], Arc::new(EchoTranslator), store("nolinks"));
        assert_eq!(p.run("Acme").await.unwrap_err(), NoResults::NoArticlesFound);
    }

    #[tokio::test]
    async fn test_failing_discovery_is_no_articles_found() {
        struct Down;

        #[async_trait]
        impl LinkSource for Down {
            async fn discover(&self, _: &str, _: usize) -> Result<Vec<CandidateLink>, DiscoveryError> {
                Err(DiscoveryError::Status(503))
            }

            fn name(&self) -> &'static str {
                "down"
            }
        }

        let base = testing::pipeline(vec![], vec![], Arc::new(EchoTranslator), store("down"));
        let p = InsightPipeline::new(
            Arc::new(Down),
            base.extractor.clone(),
            None,
            PipelineConfig::default(),
            10,
        );
        assert_eq!(p.run("Acme").await.unwrap_err(), NoResults::NoArticlesFound);
    }

    #[tokio::test]
    async fn test_all_rejected_is_no_relevant_articles() {
        let p = testing::pipeline(
            vec!["https://a.example/1", "https://a.example/2"],
            vec![("https://a.example/1", "Acme", body("Acme", "good", 300))],
            Arc::new(EchoTranslator),
            store("rejected"),
        );
        assert_eq!(p.run("Acme").await.unwrap_err(), NoResults::NoRelevantArticles);
    }

    #[tokio::test]
    async fn test_acme_scenario() {
        let audio = store("acme");
        let p = testing::pipeline(
            vec!["https://a.example/1", "https://a.example/2", "https://a.example/3"],
            vec![
                ("https://a.example/1", "Globex expands", body("Globex", "good", 700)),
                ("https://a.example/2", "Acme wins contract", body("Acme", "good", 700)),
                ("https://a.example/3", "Initech update", body("Initech", "bad", 700)),
            ],
            Arc::new(EchoTranslator),
            audio.clone(),
        );

        let report = p.run("Acme").await.unwrap();
        assert_eq!(report.articles.len(), 1);
        assert_eq!(report.articles[0].title, "Acme wins contract");
        assert_eq!(report.articles[0].sentiment, Sentiment::Positive);
        assert_eq!(
            report.sentiment_summary,
            SentimentTally {
                positive: 1,
                negative: 0,
                neutral: 0
            }
        );
        assert!(report.comparative_analysis.is_empty());
        assert_eq!(report.sentence_totals.unwrap().positive, 3);

        let file = report.tts_audio.expect("audio reference");
        let spoken = String::from_utf8(audio.open(&file).await.unwrap()).unwrap();
        assert!(spoken.starts_with("सकारात्मक समाचार: 1, नकारात्मक समाचार: 0, तटस्थ समाचार: 0. "));
        assert!(spoken.contains("[hi] Acme reported good results"));
        let _ = std::fs::remove_dir_all(audio.dir());
    }

    #[tokio::test]
    async fn test_order_tally_and_duplicates() {
        let audio = store("order");
        let p = testing::pipeline(
            vec![
                "https://a.example/1",
                "https://a.example/2",
                "https://a.example/3",
                "https://a.example/4",
            ],
            vec![
                ("https://a.example/1", "Acme first", body("Acme", "good", 600)),
                ("https://a.example/2", "Acme second", body("Acme", "bad", 600)),
                ("https://a.example/3", "Acme first", body("Acme", "bad", 600)),
                ("https://a.example/4", "Acme third", body("Acme", "steady", 600)),
            ],
            Arc::new(EchoTranslator),
            audio.clone(),
        );

        let report = p.run("Acme").await.unwrap();
        let titles: Vec<_> = report.articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Acme first", "Acme second", "Acme third"]);
        assert_eq!(report.articles[0].url, "https://a.example/1");
        assert_eq!(report.sentiment_summary.total(), report.articles.len());
        assert_eq!(report.sentiment_summary.positive, 1);
        assert_eq!(report.sentiment_summary.negative, 1);
        assert_eq!(report.sentiment_summary.neutral, 1);
        assert_eq!(report.comparative_analysis.len(), 2);
        assert!(report.comparative_analysis[1].comparison.contains("'Acme second'"));
        let _ = std::fs::remove_dir_all(audio.dir());
    }

    #[tokio::test]
    async fn test_translation_failure_keeps_report() {
        let audio = store("ttsfail");
        let p = testing::pipeline(
            vec!["https://a.example/1", "https://a.example/2"],
            vec![
                ("https://a.example/1", "Acme one", body("Acme", "good", 600)),
                ("https://a.example/2", "Acme two", body("Acme", "bad", 600)),
            ],
            Arc::new(FailingTranslator),
            audio.clone(),
        );

        let report = p.run("Acme").await.unwrap();
        assert_eq!(report.articles.len(), 2);
        assert_eq!(report.sentiment_summary.total(), 2);
        assert_eq!(report.comparative_analysis.len(), 1);
        assert_eq!(report.tts_audio, None);
        assert!(!audio.dir().exists());
    }

    #[tokio::test]
    async fn test_without_speech_has_no_audio() {
        let p = testing::pipeline(
            vec!["https://a.example/1"],
            vec![("https://a.example/1", "Acme one", body("Acme", "good", 600))],
            Arc::new(EchoTranslator),
            store("nospeech"),
        )
        .without_speech();
        assert_eq!(p.run("Acme").await.unwrap().tts_audio, None);
    }

    #[tokio::test]
    async fn test_slow_early_fetches_keep_discovery_order_and_bound() {
        let urls: Vec<String> = (0..8).map(|i| format!("https://a.example/{i}")).collect();
        let titles = ["Acme 0", "Acme 1", "Acme 2", "Acme 1", "Acme 4", "Acme 5", "Acme 6", "Acme 7"];
        let pages = urls
            .iter()
            .zip(titles)
            .map(|(u, t)| (u.as_str(), t, body("Acme", "good", 600)))
            .collect();
        let delays = urls
            .iter()
            .enumerate()
            .map(|(i, u)| (u.as_str(), 80 - 10 * i as u64))
            .collect();
        let fetcher = Arc::new(SlowFetcher::new(pages, delays));

        let extractor = ArticleExtractor::new(
            fetcher.clone(),
            SentimentScorer::new(Arc::new(KeywordModel)),
            ExtractionConfig {
                politeness_delay_ms: 0,
                ..ExtractionConfig::default()
            },
        );
        let pipeline = InsightPipeline::new(
            Arc::new(StaticLinks(urls.clone())),
            extractor,
            None,
            PipelineConfig {
                concurrency: 3,
                ..PipelineConfig::default()
            },
            10,
        );

        let report = pipeline.run("Acme").await.unwrap();
        let got: Vec<(&str, &str)> = report
            .articles
            .iter()
            .map(|a| (a.title.as_str(), a.url.as_str()))
            .collect();
        let want: Vec<(&str, &str)> = [0, 1, 2, 4, 5, 6, 7]
            .iter()
            .map(|&i| (titles[i], urls[i].as_str()))
            .collect();
        assert_eq!(got, want);

        let peak = fetcher.peak();
        assert!(peak > 1, "fetches never overlapped");
        assert!(peak <= 3, "peak {peak} exceeded concurrency");
    }
}
