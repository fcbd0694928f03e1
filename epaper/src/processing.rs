use anyhow::Result;
use chrono::Local;
use common::{politeness_pause, Config, SourceConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::ingestion;
use crate::llm::summarizer::Summarizer;
use crate::llm::translator::Translator;
use crate::llm::LlmProvider;
use crate::models::{BriefDocument, Section, SummaryOutcome};
use crate::scraping::{truncate_chars, ArticleBodySource};
use crate::storage;

/// Limits and pauses applied while processing one section.
#[derive(Debug, Clone)]
pub struct SectionLimits {
    pub body_fetch_limit: usize,
    pub body_max_chars: usize,
    pub body_delay: Duration,
    pub call_delay: Duration,
}

impl SectionLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            body_fetch_limit: config.brief.body_fetch_limit,
            body_max_chars: config.brief.body_max_chars,
            body_delay: config.body_delay(),
            call_delay: config.call_delay(),
        }
    }
}

/// Runs the daily brief: fetch, enrich, summarize and translate every section
/// of every source, strictly one after another.
pub struct BriefPipeline {
    summarizer: Summarizer,
    translator: Translator,
    bodies: Arc<dyn ArticleBodySource>,
    limits: SectionLimits,
}

impl BriefPipeline {
    pub fn new(
        llm: Option<Arc<dyn LlmProvider>>,
        bodies: Arc<dyn ArticleBodySource>,
        bilingual_sources: Vec<String>,
        limits: SectionLimits,
    ) -> Self {
        Self {
            summarizer: Summarizer::new(llm.clone()).with_bilingual_sources(bilingual_sources),
            translator: Translator::new(llm),
            bodies,
            limits,
        }
    }

    pub fn from_config(
        config: &Config,
        llm: Option<Arc<dyn LlmProvider>>,
        bodies: Arc<dyn ArticleBodySource>,
    ) -> Self {
        let bilingual = config
            .brief
            .sources
            .iter()
            .filter(|s| s.bilingual)
            .map(|s| s.key.clone())
            .collect();
        Self::new(llm, bodies, bilingual, SectionLimits::from_config(config))
    }

    /// Body fetch → summarize → translate for one section. Bodies are dropped
    /// again before returning.
    pub async fn process_section(&self, source_key: &str, section: &mut Section) {
        for article in section.articles.iter_mut().take(self.limits.body_fetch_limit) {
            let body = self.bodies.fetch_body(&article.link).await;
            if !body.trim().is_empty() {
                article.body = Some(truncate_chars(&body, self.limits.body_max_chars));
            }
            politeness_pause(self.limits.body_delay).await;
        }

        politeness_pause(self.limits.call_delay).await;
        let outcome = self
            .summarizer
            .summarize(source_key, &section.page, &section.articles)
            .await;
        if let SummaryOutcome::Error(message) = &outcome {
            warn!(source = %source_key, page = %section.page, "no summary: {}", message);
        }
        section.apply_outcome(outcome);

        if self.summarizer.is_bilingual(source_key) && self.translator.is_available() {
            politeness_pause(self.limits.call_delay).await;
            self.translator.translate_titles(&mut section.articles).await;
        }

        for article in &mut section.articles {
            article.body = None;
        }
    }

    /// Process every section of one source in order.
    pub async fn process_sections(&self, source_key: &str, sections: &mut [Section]) {
        let article_count: usize = sections.iter().map(|s| s.articles.len()).sum();
        info!(source = %source_key, "processing {} sections ({} articles)", sections.len(), article_count);

        for section in sections.iter_mut() {
            self.process_section(source_key, section).await;
        }
    }
}

/// Fetch every feed of a source into sections. Failed or empty feeds are
/// logged and skipped.
pub async fn fetch_source_sections(source: &SourceConfig, config: &Config) -> Vec<Section> {
    let mut sections = Vec::new();

    for feed in &source.feeds {
        match ingestion::fetch_and_parse_feed(&feed.url, config.politeness.feed_timeout_seconds).await {
            Ok(parsed) => {
                let section = ingestion::section_from_feed(
                    &parsed,
                    &feed.page,
                    config.brief.max_articles_per_section,
                );
                if section.articles.is_empty() {
                    warn!(source = %source.key, url = %feed.url, "feed has no usable entries");
                } else {
                    sections.push(section);
                }
            }
            Err(e) => error!(source = %source.key, url = %feed.url, "feed error: {:#}", e),
        }
        politeness_pause(config.body_delay()).await;
    }

    sections
}

/// Build the whole brief document. Output is written by the caller once this
/// returns, so an interrupted run leaves the previous file untouched.
pub async fn build_brief(config: &Config, pipeline: &BriefPipeline) -> BriefDocument {
    let mut doc = BriefDocument {
        last_updated: Local::now().to_rfc3339(),
        ..Default::default()
    };

    for source in &config.brief.sources {
        info!(source = %source.key, "fetching source");
        let mut sections = fetch_source_sections(source, config).await;
        if sections.is_empty() {
            warn!(source = %source.key, "no sections found");
        }

        pipeline.process_sections(&source.key, &mut sections).await;
        doc.sources.insert(source.key.clone(), sections);
    }

    doc
}

/// Entry point of the `brief` command.
pub async fn run_brief(
    config: &Config,
    llm: Option<Arc<dyn LlmProvider>>,
    bodies: Arc<dyn ArticleBodySource>,
) -> Result<BriefDocument> {
    info!("Starting daily brief aggregation at {}", Local::now().to_rfc3339());
    let pipeline = BriefPipeline::from_config(config, llm, bodies);
    let doc = build_brief(config, &pipeline).await;

    let output = Path::new(&config.brief.output_path);
    storage::save_json_document(output, &doc).await?;

    info!(
        "Done! {} articles, {} summaries saved to {}",
        doc.article_count(),
        doc.summary_count(),
        output.display()
    );
    Ok(doc)
}
