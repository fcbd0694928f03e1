#![allow(dead_code)]

use anyhow::{anyhow, Result};
use epaper::llm::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use epaper::models::ArticleRecord;
use epaper::scraping::ArticleBodySource;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// LLM double answering from a script, in call order. Once the script runs
/// out every call fails.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, content: &str) -> Self {
        self.push(Ok(content.to_string()))
    }

    pub fn fail(self, message: &str) -> Self {
        self.push(Err(message.to_string()))
    }

    fn push(self, reply: Result<String, String>) -> Self {
        self.replies.lock().expect("replies lock").push_back(reply);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().expect("prompts lock").len()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.prompts.lock().expect("prompts lock").push(request.prompt);
        let next = self.replies.lock().expect("replies lock").pop_front();
        match next {
            Some(Ok(content)) => Ok(LlmResponse {
                content,
                usage: UsageMetadata::default(),
                model: "scripted".to_string(),
            }),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("script exhausted")),
        }
    }
}

/// Body source serving canned bodies by URL; unknown URLs have no body.
#[derive(Default)]
pub struct CannedBodies {
    bodies: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl CannedBodies {
    pub fn with(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("requested lock").clone()
    }
}

#[async_trait::async_trait]
impl ArticleBodySource for CannedBodies {
    async fn fetch_body(&self, url: &str) -> String {
        self.requested.lock().expect("requested lock").push(url.to_string());
        self.bodies.get(url).cloned().unwrap_or_default()
    }
}

pub fn articles(titles: &[&str]) -> Vec<ArticleRecord> {
    titles
        .iter()
        .enumerate()
        .map(|(i, t)| ArticleRecord::new(*t, format!("https://news.example/{}", i)))
        .collect()
}

/// Prose body of roughly `sentences * 60` characters.
pub fn body(topic: &str, sentences: usize) -> String {
    (0..sentences)
        .map(|i| format!("The {} committee reviewed item number {} during the long session.", topic, i))
        .collect::<Vec<_>>()
        .join(" ")
}
