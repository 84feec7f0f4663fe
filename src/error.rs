//! Typed failure outcomes for each stage of the insight pipeline.
//!
//! Every component reports failure through its own error type so the caller
//! can see from the signature what may go wrong:
//!
//! | Type | Raised by | Handling |
//! |------|-----------|----------|
//! | [`DiscoveryError`] | link sources | logged, degrades to an empty link list |
//! | [`FetchError`] | article fetchers | becomes [`Rejection::Fetch`] |
//! | [`Rejection`] | article extractor | per URL, dropped from the result set |
//! | [`NoResults`] | pipeline | surfaced to the caller as "no results" |
//! | [`SpeechError`] | speech digest | logged, audio reference becomes `None` |
//! | [`ArtifactNotFound`] | audio store | surfaced as not-found |
//! | [`SetupError`] | pipeline construction | fatal at startup |

use thiserror::Error;

/// A link source could not produce candidate URLs.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search endpoint returned status {0}")]
    Status(u16),

    #[error("Feed parse error: {0}")]
    Feed(String),

    #[error("Invalid search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// An article page could not be downloaded or was not a document.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Article returned status {0}")]
    Status(u16),

    #[error("Unsupported content type: {0}")]
    NotHtml(String),

    #[error("Article body exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Why an article URL was excluded from the result set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("failed to fetch or parse article: {0}")]
    Fetch(String),

    #[error("article body too short ({chars} < {min} chars)")]
    TooShort { chars: usize, min: usize },

    #[error("article does not mention '{0}'")]
    Irrelevant(String),
}

/// The run produced no usable articles. Never a system error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoResults {
    #[error("No valid news articles found.")]
    NoArticlesFound,

    #[error("No relevant articles found")]
    NoRelevantArticles,
}

/// The speech digest could not be produced.
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("translation failed: {0}")]
    Translation(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("input of {chars} chars exceeds the {limit} char limit")]
    InputTooLong { chars: usize, limit: usize },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A requested audio reference does not resolve to a stored file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Audio file not found: {0}")]
pub struct ArtifactNotFound(pub String);

/// Configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A pipeline could not be assembled from configuration.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("link source: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("article fetcher: {0}")]
    Fetch(#[from] FetchError),

    #[error("speech digest: {0}")]
    Speech(#[from] SpeechError),
}
