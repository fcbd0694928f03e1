use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;

use crate::storage;

pub type PlanDocument = Map<String, Value>;

const HIDDEN_EVENTS: &str = "hiddenEvents";

/// Read the plan document. Missing or unreadable files yield an empty plan.
pub async fn load_plan(path: &Path) -> PlanDocument {
    match storage::load_json_document::<Value>(path).await {
        Ok(Some(Value::Object(map))) => map,
        Ok(Some(_)) => {
            warn!(path = %path.display(), "user plan is not a JSON object, ignoring");
            Map::new()
        }
        Ok(None) => Map::new(),
        Err(e) => {
            warn!("failed to load user plan: {:#}", e);
            Map::new()
        }
    }
}

/// Shallow merge of `update` into `current`. `hiddenEvents` arrays are unioned
/// keeping the existing order; everything else is overwritten.
pub fn update_plan(current: &PlanDocument, update: PlanDocument) -> PlanDocument {
    let mut merged = current.clone();

    for (key, value) in update {
        match (key.as_str(), value) {
            (HIDDEN_EVENTS, Value::Array(incoming)) => {
                let mut hidden = match merged.remove(HIDDEN_EVENTS) {
                    Some(Value::Array(existing)) => existing,
                    _ => Vec::new(),
                };
                for id in incoming {
                    if !hidden.contains(&id) {
                        hidden.push(id);
                    }
                }
                merged.insert(key, Value::Array(hidden));
            }
            (_, value) => {
                merged.insert(key, value);
            }
        }
    }

    merged
}

/// Parse the `--data` argument. Only JSON objects are accepted.
pub fn parse_update(data: &str) -> Result<PlanDocument> {
    match serde_json::from_str(data).context("invalid JSON string provided in --data")? {
        Value::Object(map) => Ok(map),
        other => bail!("--data must be a JSON object, got {}", json_kind(&other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Load, merge `data` in and persist. Returns the stored document.
pub async fn apply_update(path: &Path, data: &str) -> Result<PlanDocument> {
    let update = parse_update(data)?;
    let current = load_plan(path).await;
    let updated = update_plan(&current, update);
    storage::save_json_document(path, &updated).await?;
    Ok(updated)
}
