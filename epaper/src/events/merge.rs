use chrono::{Local, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, warn};

use super::{CategoryItem, DayBucket, EventDocument, DATE_FORMAT};

/// Merge a freshly generated document into the persisted one.
///
/// - Timeline: existing buckets dated before `today` (or with unparseable dates)
///   are dropped; incoming buckets for new dates are added verbatim, and for
///   known dates only items with an unseen title are appended. The result is
///   sorted by date.
/// - Sections: per category, existing items first, then incoming items whose
///   title was not seen yet.
/// - Weekly plan: incoming wins whenever it has one.
///
/// With no existing document, `incoming` is returned unchanged.
pub fn merge(
    existing: Option<EventDocument>,
    incoming: EventDocument,
    today: NaiveDate,
) -> EventDocument {
    let Some(existing) = existing else {
        return incoming;
    };

    EventDocument {
        timeline: merge_timeline(existing.timeline, incoming.timeline, today),
        sections: merge_sections(existing.sections, incoming.sections),
        weekly_plan: incoming.weekly_plan.or(existing.weekly_plan),
        last_updated: incoming.last_updated.or(existing.last_updated),
    }
}

/// [`merge`] against the local calendar date.
pub fn merge_as_of_today(existing: Option<EventDocument>, incoming: EventDocument) -> EventDocument {
    merge(existing, incoming, Local::now().date_naive())
}

/// A bucket plus the dedup keys of the items it holds.
struct KeyedBucket {
    bucket: DayBucket,
    keys: HashSet<String>,
}

impl KeyedBucket {
    fn new(bucket: DayBucket) -> Self {
        let keys = bucket.items.iter().map(|i| i.dedup_key()).collect();
        Self { bucket, keys }
    }

    /// Append items whose title is not present yet; first write wins.
    fn absorb(&mut self, other: DayBucket) {
        for item in other.items {
            if self.keys.insert(item.dedup_key()) {
                self.bucket.items.push(item);
            }
        }
    }
}

/// Parse the bucket date and rewrite it in canonical `YYYY-MM-DD` form, so that
/// string order stays chronological. Unparseable dates drop the bucket.
fn normalize_date(mut bucket: DayBucket) -> Option<(NaiveDate, DayBucket)> {
    match NaiveDate::parse_from_str(bucket.date.trim(), DATE_FORMAT) {
        Ok(date) => {
            bucket.date = date.format(DATE_FORMAT).to_string();
            Some((date, bucket))
        }
        Err(e) => {
            warn!(date = %bucket.date, "dropping day bucket with invalid date: {}", e);
            None
        }
    }
}

fn merge_timeline(
    existing: Vec<DayBucket>,
    incoming: Vec<DayBucket>,
    today: NaiveDate,
) -> Vec<DayBucket> {
    // BTreeMap over ISO date strings keeps the timeline in chronological order
    let mut by_date: BTreeMap<String, KeyedBucket> = BTreeMap::new();

    let upcoming = existing
        .into_iter()
        .filter_map(normalize_date)
        .filter_map(|(date, bucket)| {
            if date >= today {
                Some(bucket)
            } else {
                debug!(date = %bucket.date, "pruning past day bucket");
                None
            }
        });
    let fresh = incoming
        .into_iter()
        .filter_map(normalize_date)
        .map(|(_, bucket)| bucket);

    for bucket in upcoming.chain(fresh) {
        match by_date.get_mut(&bucket.date) {
            Some(known) => known.absorb(bucket),
            None => {
                by_date.insert(bucket.date.clone(), KeyedBucket::new(bucket));
            }
        }
    }

    by_date.into_values().map(|keyed| keyed.bucket).collect()
}

fn merge_sections(
    mut existing: BTreeMap<String, Vec<CategoryItem>>,
    mut incoming: BTreeMap<String, Vec<CategoryItem>>,
) -> BTreeMap<String, Vec<CategoryItem>> {
    let categories: BTreeSet<String> = existing.keys().chain(incoming.keys()).cloned().collect();

    categories
        .into_iter()
        .map(|category| {
            let old = existing.remove(&category).unwrap_or_default();
            let new = incoming.remove(&category).unwrap_or_default();

            let mut seen = HashSet::new();
            let merged = old
                .into_iter()
                .chain(new)
                .filter(|item| seen.insert(item.dedup_key()))
                .collect();
            (category, merged)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventItem, EventType};
    use serde_json::json;

    fn item(title: &str) -> EventItem {
        EventItem {
            id: title.to_lowercase(),
            kind: EventType::Event,
            title: title.to_string(),
            subtitle: None,
            description: None,
            link: None,
            tags: vec![],
            extra: Default::default(),
        }
    }

    fn bucket(date: &str, titles: &[&str]) -> DayBucket {
        DayBucket {
            date: date.to_string(),
            day_label: date.to_string(),
            items: titles.iter().map(|t| item(t)).collect(),
            extra: Default::default(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).expect("date")
    }

    #[test]
    fn first_run_returns_incoming() {
        let incoming = EventDocument {
            timeline: vec![bucket("2020-01-01", &["Old but incoming"])],
            ..Default::default()
        };
        let merged = merge(None, incoming.clone(), day("2024-01-02"));
        assert_eq!(merged, incoming);
    }

    #[test]
    fn past_buckets_are_pruned() {
        let existing = EventDocument {
            timeline: vec![bucket("2024-01-01", &["A"])],
            ..Default::default()
        };
        let incoming = EventDocument {
            timeline: vec![bucket("2024-01-02", &["B"])],
            ..Default::default()
        };

        let merged = merge(Some(existing), incoming, day("2024-01-02"));
        assert_eq!(merged.timeline, vec![bucket("2024-01-02", &["B"])]);
    }

    #[test]
    fn same_day_items_dedup_case_insensitively() {
        let existing = EventDocument {
            timeline: vec![bucket("2024-01-05", &["X"])],
            ..Default::default()
        };
        let incoming = EventDocument {
            timeline: vec![bucket("2024-01-05", &["x", "Y"])],
            ..Default::default()
        };

        let merged = merge(Some(existing), incoming, day("2024-01-02"));
        let titles: Vec<&str> = merged.timeline[0].items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["X", "Y"]);
        assert_eq!(merged.timeline[0].day_label, "2024-01-05");
    }

    #[test]
    fn timeline_is_sorted_and_invalid_dates_dropped() {
        let existing = EventDocument {
            timeline: vec![bucket("2024-01-09", &["Late"]), bucket("not-a-date", &["Bad"])],
            ..Default::default()
        };
        let incoming = EventDocument {
            timeline: vec![bucket("2024-01-03", &["Early"]), bucket("2024/01/04", &["Slashed"])],
            ..Default::default()
        };

        let merged = merge(Some(existing), incoming, day("2024-01-02"));
        let dates: Vec<&str> = merged.timeline.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-09"]);
    }

    #[test]
    fn sections_union_with_existing_first() {
        let mut existing = EventDocument::default();
        existing.sections.insert(
            "movies".into(),
            vec![CategoryItem::from(json!({"title": "Leo", "language": "Tamil"}))],
        );
        existing.sections.insert(
            "alerts".into(),
            vec![CategoryItem::from(json!({"text": "Heavy rain", "severity": "high"}))],
        );

        let mut incoming = EventDocument::default();
        incoming.sections.insert(
            "movies".into(),
            vec![
                CategoryItem::from(json!({"title": " leo ", "language": "Hindi"})),
                CategoryItem::from(json!({"title": "Jawan"})),
            ],
        );
        incoming.sections.insert(
            "festivals".into(),
            vec![CategoryItem::from(json!({"title": "Pongal"}))],
        );

        let merged = merge(Some(existing), incoming, day("2024-01-02"));
        let movies: Vec<Option<&str>> = merged.sections["movies"].iter().map(|m| m.title()).collect();
        assert_eq!(movies, vec![Some("Leo"), Some("Jawan")]);
        assert_eq!(merged.sections["movies"][0].field("language"), Some("Tamil"));
        assert_eq!(merged.sections["alerts"].len(), 1);
        assert_eq!(merged.sections["festivals"].len(), 1);
    }

    #[test]
    fn weekly_plan_prefers_incoming() {
        let plan = |text: &str| Some(BTreeMap::from([("monday".to_string(), text.to_string())]));

        let existing = EventDocument {
            weekly_plan: plan("old"),
            ..Default::default()
        };
        let incoming = EventDocument {
            weekly_plan: plan("new"),
            ..Default::default()
        };
        let merged = merge(Some(existing.clone()), incoming, day("2024-01-02"));
        assert_eq!(merged.weekly_plan, plan("new"));

        let merged = merge(Some(existing), EventDocument::default(), day("2024-01-02"));
        assert_eq!(merged.weekly_plan, plan("old"));
    }

    #[test]
    fn merging_with_itself_is_idempotent() {
        let mut doc = EventDocument {
            timeline: vec![bucket("2024-01-02", &["A", "B"]), bucket("2024-01-03", &["C"])],
            weekly_plan: Some(BTreeMap::from([("note".to_string(), "plan".to_string())])),
            ..Default::default()
        };
        doc.sections.insert(
            "alerts".into(),
            vec![CategoryItem::from(json!({"text": "Fog", "severity": "medium"}))],
        );

        let merged = merge(Some(doc.clone()), doc.clone(), day("2024-01-02"));
        assert_eq!(merged, doc);
    }
}
