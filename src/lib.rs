//! # Awful News Insight
//!
//! Company news intelligence: given a company name, discover recent news
//! articles, extract and summarize them, score their sentiment, compare
//! adjacent coverage, and produce a Hindi audio digest.
//!
//! ## Architecture
//!
//! 1. **Discovery** ([`discovery`]): candidate article URLs from a news search
//! 2. **Extraction** ([`extract`]): fetch, filter, summarize, and score each URL
//! 3. **Aggregation** ([`pipeline`]): dedup, tally, and compare the survivors
//! 4. **Speech** ([`speech`], [`audio`]): translated, spoken digest on disk
//! 5. **Front-ends** ([`server`], [`outputs`]): HTTP API and CLI reports

pub mod audio;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod retry;
pub mod sentiment;
pub mod server;
pub mod speech;
pub mod utils;

#[cfg(test)]
mod testing;
