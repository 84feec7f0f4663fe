//! In-memory fakes of the pipeline capabilities for unit tests.

use crate::audio::AudioStore;
use crate::config::{ExtractionConfig, PipelineConfig, SpeechConfig};
use crate::discovery::LinkSource;
use crate::error::{DiscoveryError, FetchError, SpeechError};
use crate::extract::{ArticleExtractor, ArticleFetcher, FetchedPage};
use crate::models::CandidateLink;
use crate::pipeline::InsightPipeline;
use crate::sentiment::{PolarityModel, SentimentScorer};
use crate::speech::{SpeechDigest, SpeechSynthesizer, Translator};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Returns a fixed list of URLs.
pub struct StaticLinks(pub Vec<String>);

#[async_trait]
impl LinkSource for StaticLinks {
    async fn discover(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateLink>, DiscoveryError> {
        Ok(self
            .0
            .iter()
            .take(max_results)
            .map(|url| CandidateLink {
                url: url.clone(),
                query: query.to_string(),
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Serves pages from a map; unknown URLs are a 404.
pub struct PageFetcher {
    pages: HashMap<String, FetchedPage>,
}

impl PageFetcher {
    pub fn new(pages: Vec<(&str, &str, String)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, title, text)| {
                    (
                        url.to_string(),
                        FetchedPage {
                            title: title.to_string(),
                            text,
                        },
                    )
                })
                .collect(),
        }
    }
}

#[async_trait]
impl ArticleFetcher for PageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

/// Serves pages after a per-URL delay and records the peak number of
/// fetches in flight.
pub struct SlowFetcher {
    pages: PageFetcher,
    delays: HashMap<String, Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl SlowFetcher {
    pub fn new(pages: Vec<(&str, &str, String)>, delays: Vec<(&str, u64)>) -> Self {
        Self {
            pages: PageFetcher::new(pages),
            delays: delays
                .into_iter()
                .map(|(url, ms)| (url.to_string(), Duration::from_millis(ms)))
                .collect(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleFetcher for SlowFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.pages.fetch(url).await
    }
}

/// "good" scores positive, "bad" negative, anything else neutral.
pub struct KeywordModel;

impl PolarityModel for KeywordModel {
    fn compound(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        match (lower.contains("good"), lower.contains("bad")) {
            (true, false) => 0.6,
            (false, true) => -0.6,
            _ => 0.0,
        }
    }
}

pub struct EchoTranslator;

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate(&self, text: &str, _: &str, target: &str) -> Result<String, SpeechError> {
        Ok(format!("[{target}] {text}"))
    }
}

pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(&self, _: &str, _: &str, _: &str) -> Result<String, SpeechError> {
        Err(SpeechError::Translation("service unavailable".to_string()))
    }
}

/// Returns the UTF-8 bytes of the spoken text as "audio".
pub struct BytesSynth;

#[async_trait]
impl SpeechSynthesizer for BytesSynth {
    async fn synthesize(&self, text: &str, _: &str) -> Result<Vec<u8>, SpeechError> {
        Ok(text.as_bytes().to_vec())
    }
}

/// An article body of exactly `len` ASCII characters about `subject`.
pub fn body(subject: &str, mood: &str, len: usize) -> String {
    let sentence = format!("{subject} reported {mood} results for the latest quarter. ");
    let mut text = sentence.repeat(len / sentence.len() + 1);
    text.truncate(len);
    text
}

pub fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("news_insight_{tag}_{:08x}", rand::random::<u32>()))
}

/// A pipeline over fakes with no politeness delay.
pub fn pipeline(
    links: Vec<&str>,
    pages: Vec<(&str, &str, String)>,
    translator: Arc<dyn Translator>,
    store: AudioStore,
) -> InsightPipeline {
    let extractor = ArticleExtractor::new(
        Arc::new(PageFetcher::new(pages)),
        SentimentScorer::new(Arc::new(KeywordModel)),
        ExtractionConfig {
            politeness_delay_ms: 0,
            ..ExtractionConfig::default()
        },
    );
    let speech = SpeechDigest::new(
        translator,
        Arc::new(BytesSynth),
        store,
        SpeechConfig::default(),
    );
    InsightPipeline::new(
        Arc::new(StaticLinks(links.into_iter().map(String::from).collect())),
        extractor,
        Some(speech),
        PipelineConfig::default(),
        10,
    )
}
