//! Candidate article discovery for a query term.
//!
//! Discovery is a pluggable capability: anything implementing [`LinkSource`]
//! can feed the pipeline. Two implementations ship with the crate:
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | News results page | [`html`] | HTML scraping | Default; every `a[href]` on the page |
//! | News results feed | [`rss`] | RSS parsing | Unwraps click-tracking redirect links |
//!
//! # Common Rules
//!
//! Both sources run their raw hrefs through [`LinkFilter`], which:
//! - Accepts only absolute `http`/`https` URLs
//! - Drops links on excluded domains (the search engine and its aggregator)
//! - Deduplicates by exact string, keeping first-seen order
//! - Stops after `max_results` accepted links
//!
//! Network or parse failures surface as [`DiscoveryError`]; callers that want
//! the "degrade to empty" behaviour use [`discover_or_empty`].

pub mod html;
pub mod rss;

use crate::config::{DiscoveryConfig, LinkSourceKind};
use crate::error::DiscoveryError;
use crate::models::CandidateLink;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use url::Url;

pub use html::HtmlResultsSource;
pub use rss::RssResultsSource;

/// A capability that turns a query into candidate article URLs.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Return up to `max_results` unique, acceptable links for `query`.
    async fn discover(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateLink>, DiscoveryError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Build the link source selected in configuration.
pub fn build_link_source(config: &DiscoveryConfig) -> Result<Arc<dyn LinkSource>, DiscoveryError> {
    Ok(match config.source {
        LinkSourceKind::Html => Arc::new(HtmlResultsSource::new(config)?),
        LinkSourceKind::Rss => Arc::new(RssResultsSource::new(config)?),
    })
}

/// Run discovery, logging and swallowing any failure as an empty list.
#[instrument(level = "info", skip(source), fields(link_source = source.name()))]
pub async fn discover_or_empty(
    source: &dyn LinkSource,
    query: &str,
    max_results: usize,
) -> Vec<CandidateLink> {
    match source.discover(query, max_results).await {
        Ok(links) => {
            if links.len() < max_results {
                warn!(
                    found = links.len(),
                    wanted = max_results,
                    "Fewer candidate links than requested"
                );
            }
            info!(count = links.len(), "Discovered candidate links");
            links
        }
        Err(e) => {
            warn!(error = %e, "Discovery failed; treating as no links");
            Vec::new()
        }
    }
}

/// Fill a `{query}` placeholder with the percent-encoded query.
pub fn search_url(template: &str, query: &str) -> Result<Url, DiscoveryError> {
    let filled = template.replace("{query}", &urlencoding::encode(query.trim()));
    Ok(Url::parse(&filled)?)
}

/// Acceptance, dedup, and cap rules shared by every link source.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    excluded_domains: Vec<String>,
}

impl LinkFilter {
    pub fn new<I, S>(excluded_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded_domains: excluded_domains
                .into_iter()
                .map(|d| d.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether a single href is an absolute link off the excluded domains.
    pub fn accepts(&self, href: &str) -> bool {
        let Ok(url) = Url::parse(href) else {
            return false;
        };
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        !self
            .excluded_domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")))
    }

    /// Apply the rules to raw hrefs in page order.
    pub fn collect<I, S>(&self, hrefs: I, query: &str, max_results: usize) -> Vec<CandidateLink>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen: HashSet<String> = HashSet::new();
        let mut links = Vec::new();
        for href in hrefs {
            if links.len() >= max_results {
                break;
            }
            let href = href.as_ref().trim();
            if !self.accepts(href) {
                continue;
            }
            if seen.insert(href.to_string()) {
                links.push(CandidateLink {
                    url: href.to_string(),
                    query: query.to_string(),
                });
            }
        }
        links
    }
}
