//! Runtime configuration loaded from an optional `config.yaml`.
//!
//! Every field has a default, so an empty or partial file is valid:
//!
//! ```yaml
//! discovery:
//!   source: rss
//!   max_results: 8
//! extraction:
//!   politeness_delay_ms: 0
//!   relevance:
//!     aliases: ["Alphabet"]
//! audio:
//!   dir: ./audio
//!   retention_hours: 12
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// Top-level configuration for a pipeline instance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InsightConfig {
    pub discovery: DiscoveryConfig,
    pub extraction: ExtractionConfig,
    pub pipeline: PipelineConfig,
    pub speech: SpeechConfig,
    pub audio: AudioConfig,
}

impl InsightConfig {
    /// Load configuration from a YAML file.
    ///
    /// `None` yields the defaults without touching the filesystem.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }
}

/// Which link source implementation discovery uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSourceKind {
    /// Scrape anchors from the HTML results page.
    #[default]
    Html,
    /// Read the provider's RSS results feed.
    Rss,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub source: LinkSourceKind,
    /// Results page template; `{query}` is replaced by the encoded query.
    pub endpoint: String,
    /// RSS feed template; `{query}` is replaced by the encoded query.
    pub rss_endpoint: String,
    pub user_agent: String,
    pub max_results: usize,
    pub timeout_secs: u64,
    /// Hosts whose links are never returned (the search engine itself and
    /// aggregators that wrap original sources). Subdomains match too.
    pub excluded_domains: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            source: LinkSourceKind::Html,
            endpoint: "https://www.bing.com/news/search?q={query}&count=20".to_string(),
            rss_endpoint: "https://www.bing.com/news/search?q={query}&format=rss".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            max_results: 10,
            timeout_secs: 5,
            excluded_domains: vec!["bing.com".to_string(), "msn.com".to_string()],
        }
    }
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Sentiment granularity used when scoring article summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentMode {
    /// One label for the whole summary.
    Coarse,
    /// Per-sentence labels aggregated by majority vote.
    #[default]
    Sentences,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub min_content_chars: usize,
    pub summary_sentences: usize,
    pub politeness_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub sentiment_mode: SentimentMode,
    pub relevance: RelevanceConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 500,
            summary_sentences: 3,
            politeness_delay_ms: 2000,
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            sentiment_mode: SentimentMode::Sentences,
            relevance: RelevanceConfig::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// How a company name is matched against article text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RelevanceConfig {
    /// Extra names that count as a mention (tickers, former names, brands).
    pub aliases: Vec<String>,
    /// Also match the name with a trailing legal suffix removed
    /// ("Acme Corp" matches "Acme"). Off unless configured.
    pub strip_legal_suffixes: bool,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            aliases: Vec::new(),
            strip_legal_suffixes: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum extractions in flight at once.
    pub concurrency: usize,
    /// How many leading article summaries go into the speech digest.
    pub digest_articles: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            digest_articles: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub source_language: String,
    pub target_language: String,
    /// Ceiling on tally sentence plus summary text, in characters.
    pub max_input_chars: usize,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub retry_base_delay_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            source_language: "en".to_string(),
            target_language: "hi".to_string(),
            max_input_chars: 5000,
            timeout_secs: 20,
            max_retries: 2,
            retry_base_delay_ms: 500,
        }
    }
}

impl SpeechConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioConfig {
    pub dir: PathBuf,
    /// Delete generated audio older than this many hours; `None` keeps
    /// files forever.
    pub retention_hours: Option<u64>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("audio"),
            retention_hours: Some(24),
        }
    }
}

impl AudioConfig {
    pub fn retention(&self) -> Option<Duration> {
        self.retention_hours.map(|h| Duration::from_secs(h * 3600))
    }
}
