//! News search results page scraper.
//!
//! Fetches the provider's HTML results page for a query and takes every
//! `a[href]` in document order. No result-card class names are used; the
//! shared [`LinkFilter`] does the selection.
//!
//! # URL Pattern
//!
//! `https://www.bing.com/news/search?q={query}&count=20`

use super::{LinkFilter, LinkSource, search_url};
use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use crate::models::CandidateLink;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Link source that scrapes the HTML results page.
#[derive(Debug, Clone)]
pub struct HtmlResultsSource {
    client: Client,
    endpoint: String,
    filter: LinkFilter,
}

impl HtmlResultsSource {
    /// Build the source with a browser-like user agent and the discovery timeout.
    pub fn new(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            filter: LinkFilter::new(&config.excluded_domains),
        })
    }
}

#[async_trait]
impl LinkSource for HtmlResultsSource {
    #[instrument(level = "info", skip(self), fields(endpoint = %self.endpoint))]
    async fn discover(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<CandidateLink>, DiscoveryError> {
        let url = search_url(&self.endpoint, query)?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status(status.as_u16()));
        }
        let html = response.text().await?;
        let links = links_from_page(&html, &self.filter, query, max_results);

        info!(count = links.len(), source = %url, "Indexed result page links");
        debug!(urls = ?links.iter().map(|l| &l.url).collect::<Vec<_>>(), "Result links");
        Ok(links)
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

/// Extract candidate links from a results page body.
pub fn links_from_page(
    html: &str,
    filter: &LinkFilter,
    query: &str,
    max_results: usize,
) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);
    let hrefs = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"));
    filter.collect(hrefs, query, max_results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <a href="/news/search?q=acme&page=2">Next</a>
          <a href="https://www.bing.com/images/search?q=acme">Images</a>
          <div class="news-card">
            <a href="https://www.reuters.com/business/acme-beats">Acme beats</a>
            <a href="https://www.msn.com/en-us/money/acme">MSN copy</a>
          </div>
          <div class="news-card">
            <a href="https://www.cnbc.com/acme-lawsuit">Acme lawsuit</a>
            <a href="https://www.reuters.com/business/acme-beats">Acme beats again</a>
          </div>
          <a>no href</a>
          <a href="https://apnews.com/acme-ceo">CEO</a>
        </body></html>
    "#;

    #[test]
    fn test_links_from_page_filters_and_dedups() {
        let filter = LinkFilter::new(["bing.com", "msn.com"]);
        let links = links_from_page(PAGE, &filter, "Acme", 10);
        let urls: Vec<&str> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.reuters.com/business/acme-beats",
                "https://www.cnbc.com/acme-lawsuit",
                "https://apnews.com/acme-ceo",
            ]
        );
    }

    #[test]
    fn test_links_from_page_respects_cap() {
        let filter = LinkFilter::new(["bing.com", "msn.com"]);
        let links = links_from_page(PAGE, &filter, "Acme", 2);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_empty_page_yields_no_links() {
        let filter = LinkFilter::new(["bing.com"]);
        assert!(links_from_page("<html></html>", &filter, "Acme", 10).is_empty());
    }
}
