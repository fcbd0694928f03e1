use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use common::{politeness_pause, Config};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::events::{self, EventDocument, Headline, DATE_FORMAT};
use crate::ingestion;
use crate::llm::{extract_json_from_text, LlmProvider, LlmRequest};
use crate::storage;

/// Collect headline+link pairs from every configured feed. Failed feeds are
/// logged and skipped.
pub async fn fetch_headlines(config: &Config) -> Vec<Headline> {
    let mut headlines = Vec::new();

    info!("Fetching {} RSS feeds...", config.up_ahead.feeds.len());
    for url in &config.up_ahead.feeds {
        match ingestion::fetch_and_parse_feed(url, config.politeness.feed_timeout_seconds).await {
            Ok(feed) => headlines.extend(ingestion::headlines_from_feed(
                &feed,
                config.up_ahead.per_feed_limit,
            )),
            Err(e) => error!(url = %url, "Error fetching feed: {:#}", e),
        }
        politeness_pause(config.body_delay()).await;
    }

    headlines
}

pub fn build_up_ahead_prompt(headlines: &[Headline], today: NaiveDate) -> String {
    let listing = headlines
        .iter()
        .map(|h| format!("- {} ({})", h.title, h.link))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an intelligent lifestyle and events editor.
Today is {today}.

I have a list of recent news headlines (below).
Your task is to generate a structured JSON output for an "Up Ahead" dashboard.

Sources Headlines:
{listing}

Instructions:
1. Analyze Headlines: Look for movie releases, events, festivals, or important dates mentioned in the headlines for the NEXT 7-14 DAYS.
2. Internal Knowledge: Supplement the news with your own knowledge of:
   - Major Movie Releases (Tamil, Hindi, English) scheduled for this week/next week.
   - Upcoming Holidays, Festivals, or Bank Closures in India/Tamil Nadu.
   - Major Sporting Events (Cricket, Football) this week.
3. "Plan My Week": Create a fun, curated 7-day plan (starting Today).

Output JSON Format (Strict JSON only, no markdown blocks):
{{
    "timeline": [
        {{
            "date": "YYYY-MM-DD",
            "dayLabel": "Monday (Today)",
            "items": [
                {{
                    "id": "unique_id",
                    "type": "movie|event|festival|alert|sport",
                    "title": "Leo Release",
                    "subtitle": "In Theaters",
                    "description": "Short 1-line description.",
                    "tags": ["Tamil", "Action"]
                }}
            ]
        }}
    ],
    "sections": {{
        "movies": [ {{ "title": "...", "releaseDate": "...", "language": "..." }} ],
        "festivals": [ {{ "title": "...", "date": "..." }} ],
        "alerts": [ {{ "text": "Heavy Rain expected on Tuesday", "severity": "high|medium|low" }} ]
    }},
    "weekly_plan": {{
        "monday": "...",
        "tuesday": "...",
        "wednesday": "...",
        "thursday": "...",
        "friday": "...",
        "saturday": "...",
        "sunday": "..."
    }}
}}
Generate the timeline for the next 7 days. If a day has no specific event, suggest a generic activity.
"#,
        today = today.format("%A, %d %B %Y"),
        listing = listing,
    )
}

/// Parse an LLM response into an event document. Malformed records (an unknown
/// item type, a bucket with a bad date) are dropped one by one; only text that
/// is not an event document at all is an error. The timeline is put in date order.
pub fn parse_event_document(text: &str) -> Result<EventDocument> {
    let json = extract_json_from_text(text).context("no JSON object in LLM response")?;
    let mut doc: EventDocument =
        serde_json::from_str(&json).context("LLM response is not a valid event document")?;

    doc.timeline.retain(|bucket| {
        let valid = NaiveDate::parse_from_str(&bucket.date, DATE_FORMAT).is_ok();
        if !valid {
            warn!(date = %bucket.date, "discarding generated day with invalid date");
        }
        valid
    });
    doc.timeline.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(doc)
}

/// One LLM call producing the event document; `None` on any failure.
pub async fn generate_with_llm(
    llm: &dyn LlmProvider,
    headlines: &[Headline],
    today: NaiveDate,
) -> Option<EventDocument> {
    info!("Generating Up Ahead data with the LLM...");
    let request = LlmRequest {
        prompt: build_up_ahead_prompt(headlines, today),
        max_tokens: Some(4000),
        temperature: Some(0.7),
        timeout_seconds: None,
    };

    let response = match llm.generate(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Up Ahead generation failed: {:#}", e);
            return None;
        }
    };

    match parse_event_document(&response.content) {
        Ok(doc) => Some(doc),
        Err(e) => {
            warn!("Up Ahead response unusable: {:#}", e);
            None
        }
    }
}

/// AI generation with the keyword fallback behind it.
pub async fn generate_event_document(
    llm: Option<&dyn LlmProvider>,
    headlines: &[Headline],
    today: NaiveDate,
) -> EventDocument {
    if let Some(llm) = llm {
        if let Some(doc) = generate_with_llm(llm, headlines, today).await {
            return doc;
        }
        info!("AI generation failed. Falling back to RSS headlines...");
    }
    events::fallback_document(headlines, today)
}

/// Load the persisted document; unreadable documents count as absent.
pub async fn load_existing(path: &Path) -> Option<EventDocument> {
    match storage::load_json_document(path).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Error loading existing data, starting fresh: {:#}", e);
            None
        }
    }
}

/// Entry point of the `up-ahead` command.
pub async fn run_up_ahead(config: &Config, llm: Option<Arc<dyn LlmProvider>>) -> Result<EventDocument> {
    info!("Starting Up Ahead generation...");
    let today = Local::now().date_naive();

    let headlines = fetch_headlines(config).await;
    let fresh = generate_event_document(llm.as_deref(), &headlines, today).await;

    let output = Path::new(&config.up_ahead.output_path);
    let existing = load_existing(output).await;

    let mut merged = events::merge(existing, fresh, today);
    merged.last_updated = Some(Local::now().to_rfc3339());

    storage::save_json_document(output, &merged).await?;
    info!(
        "Success! {} days merged and saved to {}",
        merged.timeline.len(),
        output.display()
    );
    Ok(merged)
}
