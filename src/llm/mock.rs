use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::error::LlmError;
use super::{ChatModel, ChatRequest, WebSearchModel};

/// Scripted responses for tests.
///
/// A prompt containing a registered needle gets that rule's reply; otherwise the
/// next queued response is used. With neither, the call fails.
#[derive(Debug, Default)]
struct Script {
    rules: Vec<(String, String)>,
    queue: VecDeque<Result<String, LlmError>>,
    prompts: Vec<String>,
}

impl Script {
    fn next(&mut self, model: &str, prompt: &str) -> Result<String, LlmError> {
        self.prompts.push(prompt.to_string());

        if let Some((_, reply)) = self.rules.iter().find(|(needle, _)| prompt.contains(needle)) {
            return Ok(reply.clone());
        }

        self.queue.pop_front().unwrap_or_else(|| {
            Err(LlmError::Transport {
                model: model.to_string(),
                message: "mock has no scripted response".to_string(),
            })
        })
    }
}

fn lock(script: &Mutex<Script>) -> std::sync::MutexGuard<'_, Script> {
    script
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
pub struct MockChatModel {
    model: String,
    script: Mutex<Script>,
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatModel {
    pub fn new() -> Self {
        Self {
            model: "mock-chat".to_string(),
            script: Mutex::new(Script::default()),
        }
    }

    pub fn push_response(&self, reply: impl Into<String>) -> &Self {
        lock(&self.script).queue.push_back(Ok(reply.into()));
        self
    }

    pub fn push_error(&self, err: LlmError) -> &Self {
        lock(&self.script).queue.push_back(Err(err));
        self
    }

    /// Always answers prompts containing `needle` with `reply`.
    pub fn respond_to(&self, needle: impl Into<String>, reply: impl Into<String>) -> &Self {
        lock(&self.script).rules.push((needle.into(), reply.into()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.script).prompts.clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.script).prompts.len()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        lock(&self.script).next(&self.model, &request.prompt)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug)]
pub struct MockWebSearch {
    model: String,
    script: Mutex<Script>,
}

impl Default for MockWebSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWebSearch {
    pub fn new() -> Self {
        Self {
            model: "mock-search".to_string(),
            script: Mutex::new(Script::default()),
        }
    }

    pub fn push_response(&self, reply: impl Into<String>) -> &Self {
        lock(&self.script).queue.push_back(Ok(reply.into()));
        self
    }

    pub fn push_error(&self, err: LlmError) -> &Self {
        lock(&self.script).queue.push_back(Err(err));
        self
    }

    pub fn respond_to(&self, needle: impl Into<String>, reply: impl Into<String>) -> &Self {
        lock(&self.script).rules.push((needle.into(), reply.into()));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.script).prompts.clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.script).prompts.len()
    }
}

#[async_trait]
impl WebSearchModel for MockWebSearch {
    async fn search(&self, prompt: &str) -> Result<String, LlmError> {
        lock(&self.script).next(&self.model, prompt)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
