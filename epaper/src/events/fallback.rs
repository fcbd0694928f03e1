//! Keyword-based event document built from raw headlines, used when the LLM
//! is unavailable or returns something unusable.

use chrono::NaiveDate;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::info;

use super::{CategoryItem, DayBucket, EventDocument, EventItem, EventType, Headline, DATE_FORMAT};

/// Checked in order; the first rule with a matching keyword decides the type.
const CLASSIFICATION_RULES: &[(EventType, &[&str])] = &[
    (EventType::Movie, &["movie", "review", "release"]),
    (EventType::Festival, &["festival", "holiday"]),
    (EventType::Sport, &["cricket", "match"]),
    (EventType::Alert, &["rain", "alert"]),
];

/// Gossip and procedural news that never belongs on the timeline.
const NOISE_KEYWORDS: &[&str] = &[
    "review",
    "gossip",
    "rumour",
    "spotted",
    "dating",
    "box office",
    "collection",
    "shocking",
    "viral",
    "video",
    "photo",
    "leaked",
    "renamed",
    "locks release date",
    "casts",
    "producer",
    "court",
    "petition",
    "arrested",
    "stealing",
    "sewage",
    "warns",
    "talks",
    "deal",
    "financial results",
    "board meeting",
    "fog",
    "mist",
];

const MAX_TIMELINE_ITEMS: usize = 20;
const FALLBACK_DAY_LABEL: &str = "Latest Updates";
const FALLBACK_NOTE: &str = "AI generation unavailable. Showing latest RSS feeds.";
const MAX_ID_LEN: usize = 64;

pub fn classify_headline(title: &str) -> EventType {
    let lower = title.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(kind, _)| *kind)
        .unwrap_or(EventType::Event)
}

pub fn is_noise(title: &str) -> bool {
    let lower = title.to_lowercase();
    NOISE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Id derived from the title as a lowercase slug. Ids are persisted and
/// referenced from `hiddenEvents`, so they must not depend on the toolchain.
fn item_id(title: &str) -> String {
    let slug = title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let slug: String = slug.chars().take(MAX_ID_LEN).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "event".to_string()
    } else {
        slug.to_string()
    }
}

/// Build an event document for `today` from headline+link pairs.
pub fn fallback_document(headlines: &[Headline], today: NaiveDate) -> EventDocument {
    let items: Vec<EventItem> = headlines
        .iter()
        .filter(|h| !h.title.trim().is_empty())
        .filter_map(|h| {
            // Classification first; noise filtering gates inclusion only
            let kind = classify_headline(&h.title);
            if is_noise(&h.title) {
                return None;
            }
            Some(EventItem {
                id: item_id(&h.title),
                kind,
                title: h.title.clone(),
                subtitle: Some("From RSS".to_string()),
                description: Some("Latest update".to_string()),
                link: Some(h.link.clone()).filter(|l| !l.is_empty()),
                tags: vec![kind.as_str().to_string()],
                extra: Default::default(),
            })
        })
        .collect();

    info!(
        "fallback generator kept {}/{} headlines",
        items.len(),
        headlines.len()
    );

    let linked = |kind: EventType| -> Vec<CategoryItem> {
        items
            .iter()
            .filter(|i| i.kind == kind)
            .map(|i| CategoryItem::from(json!({"title": i.title, "text": i.title, "link": i.link})))
            .collect()
    };

    let mut sections = BTreeMap::new();
    sections.insert("movies".to_string(), linked(EventType::Movie));
    sections.insert("festivals".to_string(), linked(EventType::Festival));
    sections.insert(
        "alerts".to_string(),
        items
            .iter()
            .filter(|i| i.kind == EventType::Alert)
            .map(|i| CategoryItem::from(json!({"text": i.title, "severity": "medium"})))
            .collect(),
    );

    let timeline = vec![DayBucket {
        date: today.format(DATE_FORMAT).to_string(),
        day_label: FALLBACK_DAY_LABEL.to_string(),
        items: items.iter().take(MAX_TIMELINE_ITEMS).cloned().collect(),
        extra: Default::default(),
    }];

    EventDocument {
        timeline,
        sections,
        weekly_plan: Some(BTreeMap::from([(
            "note".to_string(),
            FALLBACK_NOTE.to_string(),
        )])),
        last_updated: None,
    }
}
