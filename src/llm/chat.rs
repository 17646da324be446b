use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use super::error::LlmError;
use super::{ChatModel, ChatRequest};

/// Client for any OpenAI-compatible `/chat/completions` endpoint (Groq by default).
#[derive(Clone)]
pub struct OpenAiCompatibleChat {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiCompatibleChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatibleChat")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiCompatibleChat {
    pub fn new(
        api_base: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::InvalidRequest {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleChat {
    #[instrument(skip(self, request), fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt)
            .build()
            .map_err(|e| LlmError::InvalidRequest {
                reason: e.to_string(),
            })?;

        #[allow(deprecated)]
        let body = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(vec![ChatCompletionRequestMessage::User(message)])
            .temperature(request.temperature)
            .max_tokens(request.max_tokens)
            .build()
            .map_err(|e| LlmError::InvalidRequest {
                reason: e.to_string(),
            })?;

        let timeout_secs = self.timeout.as_secs();
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(&self.model, timeout_secs, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                model: self.model.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CreateChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse {
                model: self.model.clone(),
                reason: e.to_string(),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| LlmError::EmptyCompletion {
                model: self.model.clone(),
            })?;

        debug!(content_len = content.len(), "Chat completion received");
        Ok(content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
