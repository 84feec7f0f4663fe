//! Speech digest: a translated, spoken summary of a run.
//!
//! The digest opens with a fixed Hindi sentence announcing the sentiment
//! tally, followed by the translated article summaries. Translation and
//! synthesis are injected capabilities so the digest can be exercised
//! without network access.

pub mod google;

use crate::audio::AudioStore;
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::models::{AudioArtifact, SentimentTally};
use crate::retry::{RetryPolicy, Retrying};
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub use google::{GoogleTranslator, GoogleTts};

/// Translates text between two language codes.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, SpeechError>;
}

/// Produces MP3 audio for text in a given language.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError>;
}

/// The Hindi tally sentence that opens every digest.
pub fn tally_sentence(tally: &SentimentTally) -> String {
    format!(
        "सकारात्मक समाचार: {}, नकारात्मक समाचार: {}, तटस्थ समाचार: {}. ",
        tally.positive, tally.negative, tally.neutral
    )
}

/// Cut `text` so that `prefix_chars + text` fits in `limit` characters.
fn fit_to_limit(text: &str, prefix_chars: usize, limit: usize) -> &str {
    let budget = limit.saturating_sub(prefix_chars);
    match text.char_indices().nth(budget) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

#[derive(Clone)]
pub struct SpeechDigest {
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: AudioStore,
    config: SpeechConfig,
    retention: Option<Duration>,
}

impl fmt::Debug for SpeechDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechDigest")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

impl SpeechDigest {
    pub fn new(
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: AudioStore,
        config: SpeechConfig,
    ) -> Self {
        Self {
            translator,
            synthesizer,
            store,
            config,
            retention: None,
        }
    }

    /// Google-backed digest with retries around both remote calls.
    pub fn google(store: AudioStore, config: SpeechConfig) -> Result<Self, SpeechError> {
        let policy = RetryPolicy::new(config.max_retries, config.retry_base_delay());
        let translator = Retrying::new(GoogleTranslator::new(&config)?, policy);
        let synthesizer = Retrying::new(GoogleTts::new(&config)?, policy);
        Ok(Self::new(
            Arc::new(translator),
            Arc::new(synthesizer),
            store,
            config,
        ))
    }

    /// Prune digests older than `max_age` after every generation.
    pub fn with_retention(mut self, max_age: Option<Duration>) -> Self {
        self.retention = max_age;
        self
    }

    /// Translate, voice, and store a digest of `text` for `label`.
    #[instrument(level = "info", skip(self, text, tally), fields(chars = text.chars().count()))]
    pub async fn synthesize(
        &self,
        label: &str,
        text: &str,
        tally: &SentimentTally,
    ) -> Result<AudioArtifact, SpeechError> {
        let prefix = tally_sentence(tally);
        let body = fit_to_limit(text, prefix.chars().count(), self.config.max_input_chars);
        if body.len() < text.len() {
            info!(
                kept = body.chars().count(),
                limit = self.config.max_input_chars,
                "Digest text truncated to fit speech limit"
            );
        }

        let translated = self
            .translator
            .translate(
                body,
                &self.config.source_language,
                &self.config.target_language,
            )
            .await?;
        debug!(translated = %truncate_for_log(&translated, 120), "Digest translated");

        let spoken = format!("{prefix}{translated}");
        let audio = self
            .synthesizer
            .synthesize(&spoken, &self.config.target_language)
            .await?;
        if audio.is_empty() {
            return Err(SpeechError::Synthesis("empty audio response".to_string()));
        }

        let artifact = self.store.store(label, &audio).await?;
        if let Some(max_age) = self.retention {
            self.store.prune_older_than(max_age).await;
        }
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTranslator {
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl Translator for RecordingTranslator {
        async fn translate(&self, text: &str, _: &str, _: &str) -> Result<String, SpeechError> {
            self.seen.lock().unwrap().push(text.to_string());
            if self.fail {
                Err(SpeechError::Translation("service unavailable".to_string()))
            } else {
                Ok(format!("[hi]{text}"))
            }
        }
    }

    #[derive(Default)]
    struct EchoSynth {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for EchoSynth {
        async fn synthesize(&self, text: &str, _: &str) -> Result<Vec<u8>, SpeechError> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(text.as_bytes().to_vec())
        }
    }

    fn temp_store() -> AudioStore {
        AudioStore::new(
            std::env::temp_dir().join(format!("news_insight_speech_{:08x}", rand::random::<u32>())),
        )
    }

    fn tally(p: usize, n: usize, u: usize) -> SentimentTally {
        SentimentTally {
            positive: p,
            negative: n,
            neutral: u,
        }
    }

    #[test]
    fn test_tally_sentence_template() {
        assert_eq!(
            tally_sentence(&tally(2, 1, 0)),
            "सकारात्मक समाचार: 2, नकारात्मक समाचार: 1, तटस्थ समाचार: 0. "
        );
    }

    #[test]
    fn test_fit_to_limit_counts_chars() {
        assert_eq!(fit_to_limit("abcdef", 2, 5), "abc");
        assert_eq!(fit_to_limit("abc", 2, 5), "abc");
        assert_eq!(fit_to_limit("नमस्ते", 0, 2), "नम");
        assert_eq!(fit_to_limit("abc", 10, 5), "");
    }

    #[tokio::test]
    async fn test_digest_prefix_then_translation() {
        let translator = Arc::new(RecordingTranslator::default());
        let synth = Arc::new(EchoSynth::default());
        let store = temp_store();
        let digest = SpeechDigest::new(
            translator.clone(),
            synth.clone(),
            store.clone(),
            SpeechConfig::default(),
        );

        let artifact = digest.synthesize("Acme", "Acme rose.", &tally(1, 0, 0)).await.unwrap();
        let spoken = synth.seen.lock().unwrap()[0].clone();
        assert_eq!(spoken, format!("{}[hi]Acme rose.", tally_sentence(&tally(1, 0, 0))));
        assert_eq!(store.open(&artifact.file_name).await.unwrap(), spoken.as_bytes());
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_overlong_input_truncated_before_translation() {
        let translator = Arc::new(RecordingTranslator::default());
        let synth = Arc::new(EchoSynth::default());
        let store = temp_store();
        let config = SpeechConfig {
            max_input_chars: 100,
            ..SpeechConfig::default()
        };
        let digest = SpeechDigest::new(translator.clone(), synth.clone(), store.clone(), config);

        let t = tally(3, 1, 1);
        let prefix_chars = tally_sentence(&t).chars().count();
        let text = "word ".repeat(200);
        digest.synthesize("Acme", &text, &t).await.unwrap();

        let sent = translator.seen.lock().unwrap()[0].clone();
        assert_eq!(sent.chars().count(), 100 - prefix_chars);
        assert!(synth.seen.lock().unwrap()[0].starts_with(&tally_sentence(&t)));
        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_translation_failure_is_error_and_writes_nothing() {
        let translator = Arc::new(RecordingTranslator {
            fail: true,
            ..Default::default()
        });
        let synth = Arc::new(EchoSynth::default());
        let store = temp_store();
        let digest = SpeechDigest::new(translator, synth.clone(), store.clone(), SpeechConfig::default());

        let err = digest.synthesize("Acme", "text", &tally(0, 0, 1)).await.unwrap_err();
        assert!(matches!(err, SpeechError::Translation(_)));
        assert!(synth.seen.lock().unwrap().is_empty());
        assert!(!store.dir().exists());
    }
}
