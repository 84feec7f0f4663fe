//! VADER polarity backed by the `vader_sentiment` crate.
//!
//! The analyzer carries the full VADER lexicon and rule set (boosters,
//! negation, caps emphasis, "but" contrast, punctuation emphasis). Only its
//! `compound` score is used.

use super::PolarityModel;
use vader_sentiment::SentimentIntensityAnalyzer;

pub struct VaderModel {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderModel {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityModel for VaderModel {
    fn compound(&self, text: &str) -> f64 {
        self.analyzer
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0)
    }
}
