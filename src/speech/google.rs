//! Translation and speech through Google Translate's public web endpoints.
//!
//! Neither endpoint needs an API key. The translator scrapes the mobile
//! translation page; the synthesizer calls the TTS endpoint once per chunk
//! of at most [`TTS_CHUNK_CHARS`] characters and concatenates the MP3
//! segments.

use super::{SpeechSynthesizer, Translator};
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use tracing::{debug, instrument};

const TRANSLATE_URL: &str = "https://translate.google.com/m";
const TTS_URL: &str = "https://translate.google.com/translate_tts";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Longest text the mobile translation page accepts.
pub const TRANSLATE_MAX_CHARS: usize = 5000;
/// Longest text the TTS endpoint accepts per request.
pub const TTS_CHUNK_CHARS: usize = 100;

static RESULT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result-container").expect("static selector"));

fn client(config: &SpeechConfig) -> Result<Client, SpeechError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.timeout())
        .build()?)
}

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
}

impl GoogleTranslator {
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        Ok(Self {
            client: client(config)?,
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    #[instrument(level = "debug", skip(self, text), fields(chars = text.chars().count()))]
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, SpeechError> {
        let chars = text.chars().count();
        if chars > TRANSLATE_MAX_CHARS {
            return Err(SpeechError::InputTooLong {
                chars,
                limit: TRANSLATE_MAX_CHARS,
            });
        }
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let url = Url::parse_with_params(TRANSLATE_URL, &[("sl", source), ("tl", target), ("q", text)])
            .map_err(|e| SpeechError::Translation(e.to_string()))?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SpeechError::Translation(format!("status {status}")));
        }
        let page = response.text().await?;
        translation_from_page(&page)
    }
}

/// Pull the translated text out of the mobile translation page.
pub fn translation_from_page(html: &str) -> Result<String, SpeechError> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .find(|t| !t.is_empty())
        .ok_or_else(|| SpeechError::Translation("no translation in response".to_string()))
}

#[derive(Debug, Clone)]
pub struct GoogleTts {
    client: Client,
}

impl GoogleTts {
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        Ok(Self {
            client: client(config)?,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTts {
    #[instrument(level = "debug", skip(self, text), fields(chars = text.chars().count()))]
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError> {
        let chunks = tts_chunks(text, TTS_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SpeechError::Synthesis("nothing to speak".to_string()));
        }

        let total = chunks.len().to_string();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();
            let url = Url::parse_with_params(
                TTS_URL,
                &[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", language),
                    ("q", chunk.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ],
            )
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;

            let response = self.client.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(SpeechError::Synthesis(format!("status {status} on chunk {idx}")));
            }
            audio.extend_from_slice(&response.bytes().await?);
        }
        debug!(chunks = chunks.len(), bytes = audio.len(), "Synthesized speech");
        Ok(audio)
    }
}

/// Split `text` into pieces of at most `max` characters on word boundaries.
///
/// Words longer than `max` are split mid-word.
pub fn tts_chunks(text: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for word in text.split_whitespace() {
        let mut word = word;
        let mut word_chars = word.chars().count();

        while word_chars > max {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            let cut = word.char_indices().nth(max).map_or(word.len(), |(i, _)| i);
            chunks.push(word[..cut].to_string());
            word = &word[cut..];
            word_chars -= max;
        }
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() { word_chars } else { current_chars + 1 + word_chars };
        if needed > max {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_chars += 1;
        }
        current.push_str(word);
        current_chars += word_chars;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_from_page() {
        let html = r#"<html><body>
            <div class="result-container">  नमस्ते दुनिया &amp; मित्र </div>
        </body></html>"#;
        assert_eq!(translation_from_page(html).unwrap(), "नमस्ते दुनिया & मित्र");
    }

    #[test]
    fn test_translation_missing_container() {
        let err = translation_from_page("<html><body><p>blocked</p></body></html>").unwrap_err();
        assert!(matches!(err, SpeechError::Translation(_)));
    }

    #[tokio::test]
    async fn test_translator_rejects_long_input_before_request() {
        let t = GoogleTranslator::new(&SpeechConfig::default()).unwrap();
        let text = "a".repeat(TRANSLATE_MAX_CHARS + 1);
        let err = t.translate(&text, "en", "hi").await.unwrap_err();
        assert!(matches!(
            err,
            SpeechError::InputTooLong { chars: 5001, limit: 5000 }
        ));
    }

    #[test]
    fn test_chunks_respect_word_boundaries() {
        let text = "alpha beta gamma delta";
        assert_eq!(tts_chunks(text, 11), vec!["alpha beta", "gamma delta"]);
        assert_eq!(tts_chunks(text, 100), vec![text]);
    }

    #[test]
    fn test_chunks_split_long_words_and_count_chars() {
        let chunks = tts_chunks("ab abcdefgh", 3);
        assert_eq!(chunks, vec!["ab", "abc", "def", "gh"]);

        let hindi = "समाचार ".repeat(40);
        for chunk in tts_chunks(&hindi, TTS_CHUNK_CHARS) {
            assert!(chunk.chars().count() <= TTS_CHUNK_CHARS);
        }
    }

    #[test]
    fn test_chunks_of_blank_text() {
        assert!(tts_chunks("   ", 100).is_empty());
    }
}
