use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Load a JSON document. A missing file is "no prior state", not an error.
pub async fn load_json_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let doc = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse JSON document {}", path.display()))?;
    Ok(Some(doc))
}

/// Write a JSON document (pretty-printed UTF-8), creating parent directories.
pub async fn save_json_document<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.with_context(|| {
            format!("failed to create output directory: {}", parent.display())
        })?;
    }

    let json = serde_json::to_string_pretty(doc).context("failed to serialize document")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!(path = %path.display(), "document saved");
    Ok(())
}
