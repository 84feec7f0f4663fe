//! Extractive summarization of article bodies.
//!
//! Sentences are scored on four features and the best ones are returned in
//! their original order:
//!
//! | Feature | Weight | Meaning |
//! |---------|--------|---------|
//! | Title overlap | 1.5 | share of title keywords present in the sentence |
//! | Keyword frequency | 2.0 | how many of the body's top keywords it carries |
//! | Length | 1.0 | closeness to an ideal sentence length |
//! | Position | 1.0 | leads and endings score higher than the middle |

use itertools::Itertools;
use std::collections::{HashMap, HashSet};

const IDEAL_SENTENCE_WORDS: f64 = 20.0;
const TOP_KEYWORDS: usize = 10;
const MIN_SENTENCE_WORDS: usize = 4;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own",
    "said", "same", "says", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
    "yours", "yourself", "yourselves",
];

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "jr", "sr", "inc", "co", "corp", "ltd", "vs", "etc",
    "no", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
];

/// Pick up to `max_sentences` representative sentences from `text`.
///
/// The result preserves document order. Bodies with fewer sentences than
/// requested are returned whole.
pub fn summarize(title: &str, text: &str, max_sentences: usize) -> Vec<String> {
    let sentences: Vec<String> = split_into_sentences(text)
        .into_iter()
        .filter(|s| words(s).len() >= MIN_SENTENCE_WORDS)
        .collect();
    if sentences.len() <= max_sentences {
        return sentences;
    }

    let keywords = keyword_weights(text);
    let title_words: HashSet<String> = words(title)
        .into_iter()
        .filter(|w| !is_stopword(w))
        .collect();
    let total = sentences.len();

    sentences
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let score = score_sentence(&s, i, total, &title_words, &keywords);
            (i, s, score)
        })
        .sorted_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)))
        .take(max_sentences)
        .sorted_by_key(|(i, _, _)| *i)
        .map(|(_, s, _)| s)
        .collect()
}

/// Split prose into sentences on `.`, `!`, or `?` followed by whitespace.
///
/// Common abbreviations ("Mr.", "Inc.") and single-letter initials do not end
/// a sentence. Line breaks always do.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.lines() {
        let paragraph = paragraph.split_whitespace().join(" ");
        if paragraph.is_empty() {
            continue;
        }
        let mut start = 0;
        let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
        for (pos, &(idx, c)) in chars.iter().enumerate() {
            if !matches!(c, '.' | '!' | '?') {
                continue;
            }
            let at_boundary = chars.get(pos + 1).is_none_or(|(_, next)| next.is_whitespace());
            if !at_boundary {
                continue;
            }
            let candidate = &paragraph[start..idx + c.len_utf8()];
            if c == '.' && ends_with_abbreviation(candidate) {
                continue;
            }
            let sentence = candidate.trim();
            if !sentence.is_empty() {
                out.push(sentence.to_string());
            }
            start = idx + c.len_utf8();
        }
        let rest = paragraph[start..].trim();
        if !rest.is_empty() {
            out.push(rest.to_string());
        }
    }
    out
}

fn ends_with_abbreviation(candidate: &str) -> bool {
    let last = candidate
        .trim_end_matches('.')
        .rsplit(|c: char| c.is_whitespace())
        .next()
        .unwrap_or("");
    let bare = last.trim_start_matches(|c: char| !c.is_alphanumeric());
    if bare.chars().count() == 1 && bare.chars().all(char::is_uppercase) {
        return true;
    }
    ABBREVIATIONS.contains(&bare.to_lowercase().as_str())
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn is_stopword(word: &str) -> bool {
    word.chars().count() < 3 || STOPWORDS.contains(&word)
}

/// Top keywords of the body, weighted by frequency relative to the most
/// frequent one.
fn keyword_weights(text: &str) -> HashMap<String, f64> {
    let counts = words(text)
        .into_iter()
        .filter(|w| !is_stopword(w) && !w.chars().all(|c| c.is_ascii_digit()))
        .counts();
    let top: Vec<(String, usize)> = counts
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .take(TOP_KEYWORDS)
        .collect();
    let Some(max) = top.first().map(|(_, n)| *n as f64) else {
        return HashMap::new();
    };
    top.into_iter().map(|(w, n)| (w, n as f64 / max)).collect()
}

fn score_sentence(
    sentence: &str,
    index: usize,
    total: usize,
    title_words: &HashSet<String>,
    keywords: &HashMap<String, f64>,
) -> f64 {
    let ws = words(sentence);
    if ws.is_empty() {
        return 0.0;
    }

    let title = if title_words.is_empty() {
        0.0
    } else {
        let present: HashSet<&String> = ws.iter().filter(|w| title_words.contains(*w)).collect();
        present.len() as f64 / title_words.len() as f64
    };

    let keyword_sum: f64 = ws.iter().filter_map(|w| keywords.get(w)).sum();
    let frequency = keyword_sum / ws.len() as f64 * 10.0;

    let length = 1.0 - ((IDEAL_SENTENCE_WORDS - ws.len() as f64).abs() / IDEAL_SENTENCE_WORDS);

    let position = position_score(index + 1, total);

    (title * 1.5 + frequency * 2.0 + length.max(0.0) + position) / 4.0
}

fn position_score(position: usize, total: usize) -> f64 {
    let normalized = position as f64 / total as f64;
    match normalized {
        n if n <= 0.1 => 0.17,
        n if n <= 0.2 => 0.23,
        n if n <= 0.3 => 0.14,
        n if n <= 0.4 => 0.08,
        n if n <= 0.5 => 0.05,
        n if n <= 0.6 => 0.04,
        n if n <= 0.7 => 0.06,
        n if n <= 0.8 => 0.04,
        n if n <= 0.9 => 0.04,
        _ => 0.15,
    }
}
