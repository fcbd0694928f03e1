// Batched headline translation, best effort
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{LlmProvider, LlmRequest};
use crate::models::ArticleRecord;

pub struct Translator {
    llm: Option<Arc<dyn LlmProvider>>,
    target_language: String,
}

impl Translator {
    pub fn new(llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self {
            llm,
            target_language: "English".to_string(),
        }
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = language.into();
        self
    }

    pub fn is_available(&self) -> bool {
        self.llm.is_some()
    }

    /// Translate every title in one LLM call and store the results in
    /// `title_translated`. Failures leave the articles untouched.
    pub async fn translate_titles(&self, articles: &mut [ArticleRecord]) {
        let Some(llm) = &self.llm else {
            return;
        };
        if articles.is_empty() {
            return;
        }

        let request = LlmRequest {
            prompt: build_translation_prompt(articles, &self.target_language),
            max_tokens: None,
            temperature: Some(0.3),
            timeout_seconds: None,
        };

        match llm.generate(request).await {
            Ok(response) => {
                let applied = apply_translations(articles, &response.content);
                info!("translated {}/{} titles", applied, articles.len());
            }
            Err(e) => warn!("title translation failed: {:#}", e),
        }
    }
}

fn build_translation_prompt(articles: &[ArticleRecord], target_language: &str) -> String {
    let numbered = articles
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {}", i + 1, a.title))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Translate the following news headlines to {}.\n\
         Maintain the original meaning and journalistic style.\n\
         Return ONLY the translated titles, one per line, numbered exactly as input.\n\n\
         Headlines:\n{}\n",
        target_language, numbered
    )
}

/// Attribute each `N. text` line to article `N` (1-indexed). Lines whose index
/// does not parse or is out of range are dropped. Returns the number applied.
fn apply_translations(articles: &mut [ArticleRecord], response: &str) -> usize {
    let mut applied = 0;
    for line in response.trim().lines() {
        let Some((index, text)) = line.split_once('.') else {
            continue;
        };
        let Some(slot) = index
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| articles.get_mut(i))
        else {
            debug!(line, "dropping unattributable translation line");
            continue;
        };

        let text = text.trim();
        if !text.is_empty() {
            slot.title_translated = Some(text.to_string());
            applied += 1;
        }
    }
    applied
}
