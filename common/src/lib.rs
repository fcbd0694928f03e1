/*!
common/src/lib.rs

Shared configuration types and helpers for epaper.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader that merges a default config file with an optional override
- The politeness sleep helper used between network calls
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Remote LLM config (used if `llm.adapter = "remote"`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<usize>,
}

/// LLM top-level config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub adapter: Option<String>, // "remote", "none"
    pub remote: Option<RemoteLlmConfig>,
}

/// Politeness / fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolitenessConfig {
    /// Pause after every article body fetch
    #[serde(default = "default_body_delay")]
    pub body_delay_millis: u64,
    /// Pause before every LLM call (summary, translation)
    #[serde(default = "default_call_delay")]
    pub call_delay_millis: u64,
    /// Timeout for article body fetches
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_seconds: u64,
    /// Timeout for RSS feed fetches
    #[serde(default = "default_feed_timeout")]
    pub feed_timeout_seconds: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            body_delay_millis: default_body_delay(),
            call_delay_millis: default_call_delay(),
            fetch_timeout_seconds: default_fetch_timeout(),
            feed_timeout_seconds: default_feed_timeout(),
        }
    }
}

fn default_body_delay() -> u64 {
    500
}

fn default_call_delay() -> u64 {
    1000
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_feed_timeout() -> u64 {
    30
}

/// One RSS feed feeding a named section of a source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Section label shown in the front end (e.g. "Front Page")
    pub page: String,
    pub url: String,
}

/// A news source (newspaper) made of one or more section feeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Key used in the output document (e.g. "INDIAN_EXPRESS")
    pub key: String,
    /// Bilingual sources get a translated summary and translated titles
    #[serde(default)]
    pub bilingual: bool,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

/// Daily brief configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefConfig {
    #[serde(default = "default_brief_output")]
    pub output_path: String,
    #[serde(default = "default_max_articles")]
    pub max_articles_per_section: usize,
    #[serde(default = "default_body_fetch_limit")]
    pub body_fetch_limit: usize,
    #[serde(default = "default_body_max_chars")]
    pub body_max_chars: usize,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            output_path: default_brief_output(),
            max_articles_per_section: default_max_articles(),
            body_fetch_limit: default_body_fetch_limit(),
            body_max_chars: default_body_max_chars(),
            sources: Vec::new(),
        }
    }
}

fn default_brief_output() -> String {
    "public/data/epaper_data.json".to_string()
}

fn default_max_articles() -> usize {
    15
}

fn default_body_fetch_limit() -> usize {
    5
}

fn default_body_max_chars() -> usize {
    3000
}

/// "Up Ahead" events configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpAheadConfig {
    #[serde(default = "default_up_ahead_output")]
    pub output_path: String,
    /// Number of entries taken from each feed
    #[serde(default = "default_per_feed_limit")]
    pub per_feed_limit: usize,
    #[serde(default)]
    pub feeds: Vec<String>,
}

impl Default for UpAheadConfig {
    fn default() -> Self {
        Self {
            output_path: default_up_ahead_output(),
            per_feed_limit: default_per_feed_limit(),
            feeds: Vec::new(),
        }
    }
}

fn default_up_ahead_output() -> String {
    "public/data/up_ahead.json".to_string()
}

fn default_per_feed_limit() -> usize {
    10
}

/// User plan store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPlanConfig {
    #[serde(default = "default_user_plan_path")]
    pub path: String,
}

impl Default for UserPlanConfig {
    fn default() -> Self {
        Self {
            path: default_user_plan_path(),
        }
    }
}

fn default_user_plan_path() -> String {
    "public/data/user_plan.json".to_string()
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(default)]
    pub brief: BriefConfig,
    #[serde(default)]
    pub up_ahead: UpAheadConfig,
    #[serde(default)]
    pub user_plan: UserPlanConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Pause inserted after each body fetch.
    pub fn body_delay(&self) -> Duration {
        Duration::from_millis(self.politeness.body_delay_millis)
    }

    /// Pause inserted before each LLM call.
    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.politeness.call_delay_millis)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Fixed-rate politeness pause between upstream calls. A zero duration is a no-op.
pub async fn politeness_pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
