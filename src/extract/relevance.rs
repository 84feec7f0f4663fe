//! Topical relevance check for extracted articles.
//!
//! An article is relevant when any "needle" for the company appears,
//! case-insensitively, in its title or summary. Needles are the company name
//! itself, configured aliases, and optionally the name without a trailing
//! legal suffix ("Acme Corp." also matches plain "Acme").

use crate::config::RelevanceConfig;

const LEGAL_SUFFIXES: &[&str] = &[
    "inc", "incorporated", "corp", "corporation", "co", "company", "ltd", "limited", "llc", "plc",
    "group", "holdings", "ag", "sa", "nv", "gmbh",
];

/// Case-insensitive substring matcher for one company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevancePolicy {
    needles: Vec<String>,
}

impl RelevancePolicy {
    pub fn new(company: &str, config: &RelevanceConfig) -> Self {
        let mut needles = vec![company.trim().to_lowercase()];
        if config.strip_legal_suffixes {
            needles.push(strip_legal_suffixes(company).to_lowercase());
        }
        needles.extend(config.aliases.iter().map(|a| a.trim().to_lowercase()));
        needles.retain(|n| !n.is_empty());
        needles.sort();
        needles.dedup();
        Self { needles }
    }

    /// Whether the title or summary mentions the company.
    pub fn matches(&self, title: &str, summary: &str) -> bool {
        let title = title.to_lowercase();
        let summary = summary.to_lowercase();
        self.needles
            .iter()
            .any(|n| title.contains(n.as_str()) || summary.contains(n.as_str()))
    }

    #[cfg(test)]
    pub fn needles(&self) -> &[String] {
        &self.needles
    }
}

/// Drop trailing legal-form words, keeping at least one word.
fn strip_legal_suffixes(company: &str) -> String {
    let mut words: Vec<&str> = company
        .split_whitespace()
        .map(|w| w.trim_end_matches([',', '.']))
        .filter(|w| !w.is_empty())
        .collect();
    while words.len() > 1 {
        let last = words[words.len() - 1].to_lowercase();
        if LEGAL_SUFFIXES.contains(&last.as_str()) {
            words.pop();
        } else {
            break;
        }
    }
    words.join(" ")
}
