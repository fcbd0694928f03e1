use anyhow::{Context, Result};
use feed_rs::model::{Entry, Feed};
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::events::Headline;
use crate::models::{ArticleRecord, Section};

/// Fetches a feed from the given URL and parses it. Single attempt: a failed
/// feed is the caller's to log and skip.
pub async fn fetch_and_parse_feed(url: &str, timeout_secs: u64) -> Result<Feed> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent("epaper/0.1.0")
        .build()
        .context("failed to build reqwest client")?;

    let response = client
        .get(url)
        .send()
        .await
        .context("network error during feed fetch")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("feed fetch failed with status: {}", status);
    }

    let bytes = response.bytes().await.context("failed to read response body")?;
    parse_feed(bytes.as_ref())
}

pub fn parse_feed(bytes: &[u8]) -> Result<Feed> {
    parser::parse(bytes).context("failed to parse feed")
}

/// Title and first link of an entry, whitespace-normalized. Entries missing
/// either are skipped.
fn entry_title_link(entry: &Entry) -> Option<(String, String)> {
    let title = entry
        .title
        .as_ref()
        .map(|t| clean_text(&t.content))
        .unwrap_or_default();
    let link = entry
        .links
        .first()
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default();

    if title.is_empty() || link.is_empty() {
        debug!("Skipping entry without title or URL: {:?}", entry.id);
        return None;
    }
    Some((title, link))
}

/// First `limit` usable entries of a feed as a section of articles.
pub fn section_from_feed(feed: &Feed, page: &str, limit: usize) -> Section {
    let articles = feed
        .entries
        .iter()
        .filter_map(entry_title_link)
        .take(limit)
        .map(|(title, link)| ArticleRecord::new(title, link))
        .collect();
    Section::new(page, articles)
}

/// First `limit` usable entries of a feed as headline+link pairs.
pub fn headlines_from_feed(feed: &Feed, limit: usize) -> Vec<Headline> {
    feed.entries
        .iter()
        .filter_map(entry_title_link)
        .take(limit)
        .map(|(title, link)| Headline::new(title, link))
        .collect()
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
