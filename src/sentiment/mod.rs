//! Sentiment scoring for article summaries.
//!
//! A [`SentimentScorer`] wraps a [`PolarityModel`] that maps text to a
//! compound polarity in `[-1, 1]`, and classifies it with a fixed rule
//! (see [`Sentiment::from_compound`]). Two granularities share that rule:
//!
//! - **Coarse** ([`SentimentScorer::score`]): one label for the whole text.
//! - **Fine** ([`SentimentScorer::score_sentences`]): one label per sentence,
//!   combined by majority vote between positive and negative sentences.
//!
//! The scorer is built once and shared (`Arc`) by every extraction worker.

pub mod vader;

use crate::models::{SentenceCounts, Sentiment};
use std::fmt;
use std::sync::Arc;

pub use vader::VaderModel;

/// Anything that can turn text into a compound polarity value.
pub trait PolarityModel: Send + Sync {
    /// Compound polarity in `[-1, 1]`; `0.0` for text with no signal.
    fn compound(&self, text: &str) -> f64;
}

#[derive(Clone)]
pub struct SentimentScorer {
    model: Arc<dyn PolarityModel>,
}

impl fmt::Debug for SentimentScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentimentScorer").finish_non_exhaustive()
    }
}

impl SentimentScorer {
    pub fn new(model: Arc<dyn PolarityModel>) -> Self {
        Self { model }
    }

    /// Scorer backed by the full VADER model.
    pub fn bundled() -> Self {
        Self::new(Arc::new(VaderModel::new()))
    }

    /// Classify `text` as a whole.
    pub fn score(&self, text: &str) -> Sentiment {
        Sentiment::from_compound(self.model.compound(text))
    }

    /// Classify each sentence of `text` and vote.
    ///
    /// Returns the overall label together with the per-label sentence counts.
    pub fn score_sentences(&self, text: &str) -> (Sentiment, SentenceCounts) {
        let mut counts = SentenceCounts::default();
        for sentence in split_sentences(text) {
            counts.record(self.score(sentence));
        }
        (counts.overall(), counts)
    }
}

/// Split on the terminator-plus-space boundary (`". "`).
///
/// Blank pieces are skipped so trailing separators do not count as
/// sentences.
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(". ").map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scores each sentence by a keyword so votes are easy to predict.
    struct KeywordModel;

    impl PolarityModel for KeywordModel {
        fn compound(&self, text: &str) -> f64 {
            if text.contains("up") {
                0.5
            } else if text.contains("down") {
                -0.5
            } else {
                0.0
            }
        }
    }

    fn scorer() -> SentimentScorer {
        SentimentScorer::new(Arc::new(KeywordModel))
    }

    #[test]
    fn coarse_uses_thresholds() {
        let s = scorer();
        assert_eq!(s.score("shares up"), Sentiment::Positive);
        assert_eq!(s.score("shares down"), Sentiment::Negative);
        assert_eq!(s.score("shares flat"), Sentiment::Neutral);
    }

    #[test]
    fn fine_counts_every_sentence() {
        let (overall, counts) = scorer().score_sentences("Sales up. Costs down. Margins up. Guidance flat.");
        assert_eq!(overall, Sentiment::Positive);
        assert_eq!(counts, SentenceCounts { positive: 2, negative: 1, neutral: 1 });
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn fine_tie_is_neutral() {
        let (overall, counts) = scorer().score_sentences("Sales up. Costs down.");
        assert_eq!(overall, Sentiment::Neutral);
        assert_eq!(counts.positive, 1);
        assert_eq!(counts.negative, 1);
    }

    #[test]
    fn neutral_sentences_do_not_vote() {
        let (overall, _) = scorer().score_sentences("Flat. Flat again. Sales up. Still flat.");
        assert_eq!(overall, Sentiment::Positive);

        let (overall, counts) = scorer().score_sentences("Flat. Flat again. Still flat.");
        assert_eq!(overall, Sentiment::Neutral);
        assert_eq!(counts.neutral, 3);
    }

    #[test]
    fn split_ignores_trailing_separator() {
        let parts: Vec<&str> = split_sentences("One. Two. ").collect();
        assert_eq!(parts, vec!["One", "Two"]);
    }

    #[test]
    fn bundled_scorer_reads_news_tone() {
        let s = SentimentScorer::bundled();
        assert_eq!(
            s.score("Acme posts record profit and strong growth"),
            Sentiment::Positive
        );
        assert_eq!(
            s.score("Acme faces lawsuit over accounting fraud"),
            Sentiment::Negative
        );
    }
}
