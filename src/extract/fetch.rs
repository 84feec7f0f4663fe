//! Article download and HTML-to-text parsing.
//!
//! Pages come from arbitrary publishers, so parsing relies on a short list
//! of common conventions rather than per-site selectors:
//!
//! - **Title**: `og:title` meta tag, then `<title>`, then the first `<h1>`
//! - **Body**: paragraphs inside `<article>`, falling back to every `<p>`
//!   on the page when the article element is missing or nearly empty

use super::{ArticleFetcher, FetchedPage};
use crate::config::ExtractionConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use itertools::Itertools;
use once_cell::sync::Lazy;
use reqwest::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("static selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("static selector"));
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("static selector"));
static ARTICLE_P: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article p").expect("static selector"));
static ANY_P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("static selector"));

/// Paragraph text below this many characters inside `<article>` is treated
/// as a teaser and the whole page is used instead.
const ARTICLE_FALLBACK_CHARS: usize = 200;

/// Pages larger than this are rejected rather than buffered.
const MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Fetches article pages over HTTP.
#[derive(Debug, Clone)]
pub struct HttpArticleFetcher {
    client: Client,
}

impl HttpArticleFetcher {
    pub fn new(config: &ExtractionConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        if let Some(ct) = response.headers().get(CONTENT_TYPE) {
            let ct = ct.to_str().unwrap_or_default().to_ascii_lowercase();
            if !ct.contains("html") {
                return Err(FetchError::NotHtml(ct));
            }
        }
        let body = read_capped(response, MAX_BODY_BYTES).await?;
        let page = parse_article_page(&body);
        debug!(title = %page.title, chars = page.text.chars().count(), "Parsed article page");
        Ok(page)
    }
}

/// Read the response body, giving up once it passes `limit` bytes.
async fn read_capped(mut response: Response, limit: usize) -> Result<String, FetchError> {
    if response.content_length().is_some_and(|n| n > limit as u64) {
        return Err(FetchError::TooLarge { limit });
    }
    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if buf.len() + chunk.len() > limit {
            return Err(FetchError::TooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Pull the title and body text out of an article document.
pub fn parse_article_page(html: &str) -> FetchedPage {
    let document = Html::parse_document(html);

    let title = document
        .select(&OG_TITLE)
        .filter_map(|m| m.value().attr("content"))
        .map(collapse_whitespace)
        .find(|t| !t.is_empty())
        .or_else(|| first_text(&document, &TITLE))
        .or_else(|| first_text(&document, &H1))
        .unwrap_or_default();

    let mut text = paragraphs(&document, &ARTICLE_P);
    if text.chars().count() < ARTICLE_FALLBACK_CHARS {
        text = paragraphs(&document, &ANY_P);
    }

    FetchedPage { title, text }
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(element_text)
        .find(|t| !t.is_empty())
}

fn paragraphs(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .join("\n")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}
