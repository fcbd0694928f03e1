use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One scraped or syndicated article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub link: String,
    /// Extracted body text. Lives only for the duration of a run and is never serialized.
    #[serde(skip)]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_translated: Option<String>,
}

impl ArticleRecord {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            body: None,
            title_translated: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Body text if present and not blank.
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.trim().is_empty())
    }
}

/// Which fallback tier produced a section summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMethod {
    Ai,
    Extractive,
    Headlines,
}

/// Result of summarizing one section: a summary or an error, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryOutcome {
    Summary {
        text: String,
        translated: Option<String>,
        method: SummaryMethod,
    },
    Error(String),
}

impl SummaryOutcome {
    pub fn method(&self) -> Option<SummaryMethod> {
        match self {
            SummaryOutcome::Summary { method, .. } => Some(*method),
            SummaryOutcome::Error(_) => None,
        }
    }
}

/// A named bucket of articles from one source carrying one aggregate summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub page: String,
    pub articles: Vec<ArticleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_translated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_method: Option<SummaryMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Section {
    pub fn new(page: impl Into<String>, articles: Vec<ArticleRecord>) -> Self {
        Self {
            page: page.into(),
            articles,
            summary: None,
            summary_translated: None,
            summary_method: None,
            error: None,
        }
    }

    /// Record a summarizer outcome. Any state from a previous run is cleared first,
    /// so a section carries either a summary or an error. The method is only
    /// recorded for the non-AI tiers.
    pub fn apply_outcome(&mut self, outcome: SummaryOutcome) {
        self.summary = None;
        self.summary_translated = None;
        self.summary_method = None;
        self.error = None;

        match outcome {
            SummaryOutcome::Summary {
                text,
                translated,
                method,
            } => {
                self.summary = Some(text);
                self.summary_translated = translated;
                if method != SummaryMethod::Ai {
                    self.summary_method = Some(method);
                }
            }
            SummaryOutcome::Error(message) => self.error = Some(message),
        }
    }
}

/// The daily brief artifact consumed by the front end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefDocument {
    #[serde(rename = "lastUpdated")]
    pub last_updated: String,
    pub sources: BTreeMap<String, Vec<Section>>,
}

impl BriefDocument {
    pub fn article_count(&self) -> usize {
        self.sources
            .values()
            .flatten()
            .map(|s| s.articles.len())
            .sum()
    }

    pub fn summary_count(&self) -> usize {
        self.sources
            .values()
            .flatten()
            .filter(|s| s.summary.is_some())
            .count()
    }
}
