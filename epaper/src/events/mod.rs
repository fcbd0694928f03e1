//! "Up Ahead" event documents: a dated timeline of upcoming items plus
//! per-category lists and a weekly plan, persisted as JSON and merged run
//! over run.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

pub mod fallback;
pub mod merge;

pub use fallback::fallback_document;
pub use merge::{merge, merge_as_of_today};

/// Date format of `DayBucket::date`. Lexicographic order equals chronological order.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Movie,
    Event,
    Festival,
    Alert,
    Sport,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Movie => "movie",
            EventType::Event => "event",
            EventType::Festival => "festival",
            EventType::Alert => "alert",
            EventType::Sport => "sport",
        }
    }
}

impl FromStr for EventType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(EventType::Movie),
            "event" => Ok(EventType::Event),
            "festival" => Ok(EventType::Festival),
            "alert" => Ok(EventType::Alert),
            "sport" => Ok(EventType::Sport),
            other => anyhow::bail!("unknown event type `{}`", other),
        }
    }
}

// Generated and hand-edited documents spell types as "Movie", "MOVIE", ...
impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Fields this crate does not model (`venue`, `time`, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventItem {
    pub fn dedup_key(&self) -> String {
        dedup_key(&self.title)
    }
}

/// Events for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: String,
    #[serde(rename = "dayLabel", default)]
    pub day_label: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub items: Vec<EventItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A category entry (movie, festival, alert, ...). Each category has its own
/// shape, so the raw JSON object is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryItem(pub Map<String, Value>);

impl CategoryItem {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    /// Normalized title; alerts carry only `text`, and entries with neither
    /// are identified by their whole content.
    pub fn dedup_key(&self) -> String {
        ["title", "text"]
            .iter()
            .filter_map(|name| self.field(name))
            .map(dedup_key)
            .find(|key| !key.is_empty())
            .unwrap_or_else(|| Value::Object(self.0.clone()).to_string())
    }
}

impl From<Value> for CategoryItem {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => CategoryItem(map),
            other => {
                let mut map = Map::new();
                map.insert("text".to_string(), other);
                CategoryItem(map)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDocument {
    #[serde(default, deserialize_with = "lenient_list")]
    pub timeline: Vec<DayBucket>,
    #[serde(default, deserialize_with = "lenient_sections")]
    pub sections: BTreeMap<String, Vec<CategoryItem>>,
    #[serde(default, deserialize_with = "lenient_plan", skip_serializing_if = "Option::is_none")]
    pub weekly_plan: Option<BTreeMap<String, String>>,
    #[serde(rename = "lastUpdated", default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// A raw headline + link pair harvested from a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub link: String,
}

impl Headline {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Decode a list one element at a time. Elements that do not fit `T` are
/// logged and dropped; a value that is not a list at all is still an error.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("discarding malformed event record: {}", e);
                None
            }
        })
        .collect())
}

fn lenient_sections<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<CategoryItem>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(category, entries)| match entries {
            Value::Array(entries) => {
                Some((category, entries.into_iter().map(CategoryItem::from).collect()))
            }
            other => {
                warn!(category = %category, "discarding category that is not a list: {}", other);
                None
            }
        })
        .collect())
}

fn lenient_plan<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<BTreeMap<String, Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        raw.into_iter()
            .filter_map(|(day, entry)| match entry {
                Value::String(text) => Some((day, text)),
                other => {
                    warn!(day = %day, "discarding non-text plan entry: {}", other);
                    None
                }
            })
            .collect(),
    ))
}

/// Dedup key for titles: trimmed and lower-cased.
pub fn dedup_key(title: &str) -> String {
    title.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_document_json_shape() {
        let raw = json!({
            "timeline": [{
                "date": "2024-05-01",
                "dayLabel": "Wednesday (Today)",
                "weather": "Sunny",
                "items": [{
                    "id": "leo",
                    "type": "movie",
                    "title": "Leo Release",
                    "subtitle": "In Theaters",
                    "tags": ["Tamil", "Action"],
                    "venue": "PVR",
                    "time": "7pm"
                }]
            }],
            "sections": {
                "alerts": [{"text": "Heavy Rain expected on Tuesday", "severity": "high"}]
            },
            "weekly_plan": {"monday": "Catch a movie"}
        });

        let doc: EventDocument = serde_json::from_value(raw.clone()).expect("parse");
        assert_eq!(doc.timeline[0].day_label, "Wednesday (Today)");
        assert_eq!(doc.timeline[0].items[0].kind, EventType::Movie);
        assert_eq!(doc.sections["alerts"][0].field("severity"), Some("high"));
        assert_eq!(doc.timeline[0].items[0].extra["venue"], "PVR");
        assert_eq!(doc.timeline[0].extra["weather"], "Sunny");

        let back = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(back, raw);
    }

    #[test]
    fn category_keys_fall_back_to_text() {
        let alert = CategoryItem::from(json!({"text": "  Heavy RAIN ", "severity": "low"}));
        assert_eq!(alert.dedup_key(), "heavy rain");

        let movie = CategoryItem::from(json!({"title": "Leo", "text": "other"}));
        assert_eq!(movie.dedup_key(), "leo");

        let bare = CategoryItem::from(json!({"severity": "low"}));
        assert_eq!(bare.dedup_key(), r#"{"severity":"low"}"#);
    }

    #[test]
    fn event_types_ignore_case() {
        assert_eq!(" Movie ".parse::<EventType>().expect("parse"), EventType::Movie);
        assert_eq!("SPORT".parse::<EventType>().expect("parse"), EventType::Sport);
        assert!("holiday".parse::<EventType>().is_err());
    }

    #[test]
    fn malformed_records_are_dropped_one_by_one() {
        let raw = json!({
            "timeline": [
                {"date": "2030-01-01", "dayLabel": "Tue", "items": [
                    {"id": "a", "type": "Movie", "title": "Keep me"},
                    {"id": "b", "type": "holiday", "title": "Drop me"},
                    {"id": "c", "type": "festival", "title": 42}
                ]},
                {"date": 20300102, "dayLabel": "Wed", "items": []},
                {"date": "2030-01-03", "items": null}
            ],
            "sections": {
                "movies": [{"title": "Leo"}, "Jawan"],
                "alerts": "none today"
            },
            "weekly_plan": {"monday": "Rest", "tuesday": {"plan": "?"}}
        });

        let doc: EventDocument = serde_json::from_value(raw).expect("parse");
        let dates: Vec<&str> = doc.timeline.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(dates, vec!["2030-01-01", "2030-01-03"]);

        let titles: Vec<&str> = doc.timeline[0].items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Keep me"]);
        assert!(doc.timeline[1].items.is_empty());

        assert_eq!(doc.sections["movies"].len(), 2);
        assert_eq!(doc.sections["movies"][1].field("text"), Some("Jawan"));
        assert!(!doc.sections.contains_key("alerts"));

        let plan = doc.weekly_plan.expect("plan");
        assert_eq!(plan.len(), 1);
        assert_eq!(plan["monday"], "Rest");
    }

    #[test]
    fn timeline_that_is_not_a_list_is_rejected() {
        assert!(serde_json::from_value::<EventDocument>(json!({"timeline": "nope"})).is_err());
    }
}
