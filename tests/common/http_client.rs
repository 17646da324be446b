//! HTTP client helpers for tests.

use adhikaar::answer::Answer;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

/// A successful `/query` reply with the tagging headers.
#[derive(Debug)]
pub struct QueryReply {
    pub answer: Answer,
    pub status: String,
    pub category: String,
    pub language: String,
    pub source: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unexpected status {0}: {1} ({2})")]
    UnexpectedStatus(u16, String, String),
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

fn header(resp: &reqwest::Response, name: &str) -> String {
    resp.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{}", self.base_url, path)
    }

    async fn into_reply(resp: reqwest::Response) -> Result<QueryReply, TestClientError> {
        let status = header(&resp, "x-adhikaar-status");
        let category = header(&resp, "x-adhikaar-category");
        let language = header(&resp, "x-adhikaar-language");
        let source = header(&resp, "x-adhikaar-answer");

        match resp.status().as_u16() {
            200 => Ok(QueryReply {
                answer: resp.json().await?,
                status,
                category,
                language,
                source,
            }),
            400 => Err(TestClientError::BadRequest(resp.text().await?)),
            code => {
                let body = resp.text().await.unwrap_or_default();
                Err(TestClientError::UnexpectedStatus(code, status, body))
            }
        }
    }

    pub async fn query(&self, user_query: &str) -> Result<QueryReply, TestClientError> {
        let resp = self
            .client
            .get(self.url("/query"))
            .query(&[("user_query", user_query)])
            .send()
            .await?;
        Self::into_reply(resp).await
    }

    pub async fn query_post(&self, user_query: &str) -> Result<QueryReply, TestClientError> {
        let resp = self
            .client
            .post(self.url("/query"))
            .json(&serde_json::json!({ "user_query": user_query }))
            .send()
            .await?;
        Self::into_reply(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, TestClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.json().await?)
    }

    /// Returns the status code and the raw readiness report.
    pub async fn ready(&self) -> Result<(u16, serde_json::Value), TestClientError> {
        let resp = self.client.get(self.url("/ready")).send().await?;
        let code = resp.status().as_u16();
        Ok((code, resp.json().await?))
    }
}
