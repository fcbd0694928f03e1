// Section summarizer: an ordered chain of tiers, first one with output wins
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{LlmFailure, LlmProvider, LlmRequest};
use crate::extractive;
use crate::models::{ArticleRecord, SummaryMethod, SummaryOutcome};

/// Titles embedded in the AI prompt
const AI_TITLE_LIMIT: usize = 15;
/// Bodies concatenated for the extractive tier
const EXTRACTIVE_BODY_LIMIT: usize = 5;
/// Below this many characters of body text the extractive tier is skipped
const EXTRACTIVE_MIN_CHARS: usize = 200;
const EXTRACTIVE_SENTENCES: usize = 8;
/// Titles rendered by the headlines tier
const HEADLINE_LIMIT: usize = 10;
/// Delimiter between the two languages of a bilingual AI summary
const BILINGUAL_DELIMITER: &str = "|||";

/// One summarization strategy in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Ai,
    Extractive,
    Headlines,
}

/// Tiers in the order they are tried.
pub const TIER_CHAIN: [Tier; 3] = [Tier::Ai, Tier::Extractive, Tier::Headlines];

/// What a single tier produced.
#[derive(Debug)]
enum TierOutput {
    Summary {
        text: String,
        translated: Option<String>,
    },
    /// Nothing to offer (unavailable, insufficient input, empty result)
    Skipped,
    /// The tier tried and failed; carries a user-visible label when one applies
    Failed(Option<&'static str>),
}

pub struct Summarizer {
    llm: Option<Arc<dyn LlmProvider>>,
    extractive_enabled: bool,
    bilingual_sources: HashSet<String>,
}

impl Summarizer {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self {
            llm,
            extractive_enabled: true,
            bilingual_sources: HashSet::new(),
        }
    }

    /// Sources whose AI summary comes in two languages.
    pub fn with_bilingual_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bilingual_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extractive(mut self, enabled: bool) -> Self {
        self.extractive_enabled = enabled;
        self
    }

    pub fn is_bilingual(&self, source_name: &str) -> bool {
        self.bilingual_sources.contains(source_name)
    }

    /// Summarize one section. Returns a summary from the first tier that
    /// yields output, or an error when none does.
    pub async fn summarize(
        &self,
        source_name: &str,
        section_name: &str,
        articles: &[ArticleRecord],
    ) -> SummaryOutcome {
        if articles.is_empty() {
            return SummaryOutcome::Error("No articles to summarize".to_string());
        }

        let mut last_error: Option<&'static str> = None;

        for tier in TIER_CHAIN {
            let output = match tier {
                Tier::Ai => self.ai_tier(source_name, section_name, articles).await,
                Tier::Extractive => self.extractive_tier(articles),
                Tier::Headlines => headlines_tier(articles),
            };

            match output {
                TierOutput::Summary { text, translated } => {
                    let method = tier.method();
                    info!(
                        source = %source_name,
                        page = %section_name,
                        ?method,
                        "section summarized"
                    );
                    return SummaryOutcome::Summary {
                        text,
                        translated,
                        method,
                    };
                }
                TierOutput::Skipped => {
                    debug!(source = %source_name, page = %section_name, ?tier, "tier skipped");
                }
                TierOutput::Failed(label) => last_error = label,
            }
        }

        SummaryOutcome::Error(last_error.unwrap_or("No summary generated").to_string())
    }

    async fn ai_tier(
        &self,
        source_name: &str,
        section_name: &str,
        articles: &[ArticleRecord],
    ) -> TierOutput {
        let Some(llm) = &self.llm else {
            return TierOutput::Skipped;
        };

        let bilingual = self.is_bilingual(source_name);
        let request = LlmRequest {
            prompt: build_summary_prompt(source_name, section_name, articles, bilingual),
            max_tokens: Some(1000),
            temperature: Some(0.5),
            timeout_seconds: None,
        };

        match llm.generate(request).await {
            Ok(response) => {
                let text = response.content.trim();
                if text.is_empty() {
                    warn!(source = %source_name, page = %section_name, "LLM returned an empty summary");
                    return TierOutput::Skipped;
                }
                let (summary, translated) = if bilingual {
                    split_bilingual(text)
                } else {
                    (text.to_string(), None)
                };
                if summary.is_empty() {
                    return TierOutput::Skipped;
                }
                TierOutput::Summary {
                    text: summary,
                    translated,
                }
            }
            Err(e) => {
                let failure = LlmFailure::classify(&e);
                warn!(
                    source = %source_name,
                    page = %section_name,
                    ?failure,
                    "LLM summarization failed, falling through: {:#}",
                    e
                );
                TierOutput::Failed(failure.label())
            }
        }
    }

    fn extractive_tier(&self, articles: &[ArticleRecord]) -> TierOutput {
        if !self.extractive_enabled {
            return TierOutput::Skipped;
        }

        let bodies: Vec<&str> = articles
            .iter()
            .filter_map(ArticleRecord::body_text)
            .take(EXTRACTIVE_BODY_LIMIT)
            .collect();
        if bodies.is_empty() {
            return TierOutput::Skipped;
        }

        let source_chars: usize = bodies.iter().map(|b| b.chars().count()).sum();
        if source_chars < EXTRACTIVE_MIN_CHARS {
            debug!(source_chars, "not enough body text for extractive summary");
            return TierOutput::Skipped;
        }

        let combined = bodies.join("\n\n");
        match extractive::lexrank_summary(&combined, EXTRACTIVE_SENTENCES) {
            Some(text) => TierOutput::Summary {
                text,
                translated: None,
            },
            None => TierOutput::Skipped,
        }
    }
}

impl Tier {
    pub fn method(self) -> SummaryMethod {
        match self {
            Tier::Ai => SummaryMethod::Ai,
            Tier::Extractive => SummaryMethod::Extractive,
            Tier::Headlines => SummaryMethod::Headlines,
        }
    }
}

fn headlines_tier(articles: &[ArticleRecord]) -> TierOutput {
    match headline_bullets(articles) {
        Some(text) => TierOutput::Summary {
            text,
            translated: None,
        },
        None => TierOutput::Skipped,
    }
}

/// Bullet list of the first ten non-empty titles, one per line.
pub fn headline_bullets(articles: &[ArticleRecord]) -> Option<String> {
    let lines: Vec<String> = articles
        .iter()
        .take(HEADLINE_LIMIT)
        .map(|a| a.title.trim())
        .filter(|t| !t.is_empty())
        .map(|t| format!("• {}", t))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn split_bilingual(text: &str) -> (String, Option<String>) {
    let mut parts = text.split(BILINGUAL_DELIMITER);
    let primary = parts.next().unwrap_or_default().trim().to_string();
    let secondary = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    (primary, secondary)
}

fn build_summary_prompt(
    source_name: &str,
    section_name: &str,
    articles: &[ArticleRecord],
    bilingual: bool,
) -> String {
    let headlines = articles
        .iter()
        .take(AI_TITLE_LIMIT)
        .map(|a| format!("- {}", a.title))
        .collect::<Vec<_>>()
        .join("\n");

    let mut prompt = format!(
        "You are a professional news editor. Summarize the following news headlines from \
         {} - {} into a concise, insightful daily briefing.\n\nHeadlines:\n{}\n",
        source_name, section_name, headlines
    );

    if bilingual {
        prompt.push_str(
            r#"
REQUIREMENTS:
1. Provide the summary in TWO languages: English and the source language.
2. Format: 3-4 bullet points highlighting the most important stories.
3. Style: Professional, objective, and journalistic.
4. SEPARATE the English summary and the source-language summary with "|||".

OUTPUT FORMAT:
<English Summary>
|||
<Source-language Summary>
"#,
        );
    } else {
        prompt.push_str(
            r#"
REQUIREMENTS:
1. Language: English ONLY. (Translate if source is not English).
2. Format: 3-4 bullet points highlighting the most important stories.
3. Style: Professional, objective, and journalistic.
4. No introductory text.
"#,
        );
    }

    prompt
}
