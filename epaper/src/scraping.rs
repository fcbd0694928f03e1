use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Producer of article body text. An empty string means "no body available".
#[async_trait::async_trait]
pub trait ArticleBodySource: Send + Sync {
    async fn fetch_body(&self, url: &str) -> String;
}

/// Fetches article pages over HTTP and extracts their main text.
pub struct HttpArticleBodySource {
    timeout_secs: u64,
}

impl HttpArticleBodySource {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

#[async_trait::async_trait]
impl ArticleBodySource for HttpArticleBodySource {
    async fn fetch_body(&self, url: &str) -> String {
        match scrape_article_content(url, self.timeout_secs).await {
            Ok(text) => text,
            Err(e) => {
                warn!("scraping: body extraction failed for {}: {:#}", url, e);
                String::new()
            }
        }
    }
}

/// Scrapes the content of an article from the given URL.
/// Returns the extracted text content (possibly empty).
pub async fn scrape_article_content(url: &str, timeout_secs: u64) -> Result<String> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("Mozilla/5.0 (compatible; epaper/0.1.0)")
        .build()
        .context("failed to build reqwest client")?;

    let response = client.get(url).send().await.context("failed to fetch article page")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("article fetch failed with status: {}", status));
    }

    let bytes = response.bytes().await.context("failed to read response body")?;
    let url_obj = url::Url::parse(url).context("failed to parse article URL")?;

    Ok(extract_main_text(&bytes, &url_obj))
}

/// Main-content extraction: readability first, rendered to plain text; if that
/// fails, the page's paragraphs joined by blank lines.
pub fn extract_main_text(html: &[u8], url: &url::Url) -> String {
    let mut reader = Cursor::new(html);

    match readability::extractor::extract(&mut reader, url) {
        Ok(product) => match html2text::from_read(product.content.as_bytes(), 100) {
            Ok(text) => {
                let text = text.trim().to_string();
                info!("scraping: readability extracted {} chars from {}", text.len(), url);
                if text.is_empty() {
                    product.text.trim().to_string()
                } else {
                    text
                }
            }
            Err(e) => {
                warn!("scraping: failed to render extracted HTML as text: {}", e);
                product.text.trim().to_string()
            }
        },
        Err(e) => {
            debug!("scraping: readability failed for {}: {}, trying paragraphs", url, e);
            paragraph_text(&String::from_utf8_lossy(html))
        }
    }
}

/// Text of all `<p>` elements, one paragraph per block.
pub fn paragraph_text(html: &str) -> String {
    let Ok(selector) = Selector::parse("p") else {
        return String::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(|p| p.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Cap text at `max_chars` characters (not bytes).
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
