//! Local stand-ins for the hosted model APIs.
//!
//! Each stub answers with the reply of the first rule whose needle appears in
//! the prompt, so a single server can play classifier and answer model at once.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct StubState {
    rules: Arc<Vec<(String, String)>>,
    prompts: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl StubState {
    fn reply_for(&self, prompt: String) -> Option<String> {
        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());
        self.prompts.lock().unwrap().push(prompt);
        reply
    }
}

pub struct StubServer {
    pub base_url: String,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn rules(pairs: &[(&str, &str)]) -> Arc<Vec<(String, String)>> {
    Arc::new(
        pairs
            .iter()
            .map(|(n, r)| (n.to_string(), r.to_string()))
            .collect(),
    )
}

async fn chat_completions(State(state): State<StubState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
    let prompt = body["messages"][0]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let model = body["model"].as_str().unwrap_or("stub").to_string();

    match state.reply_for(prompt) {
        Some(content) => (
            StatusCode::OK,
            Json(json!({
                "id": "chatcmpl-stub",
                "object": "chat.completion",
                "created": 1_700_000_000,
                "model": model,
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            })),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "no stub rule matched"})),
        ),
    }
}

async fn generate_content(State(state): State<StubState>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    match state.reply_for(prompt) {
        Some(text) => (
            StatusCode::OK,
            Json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]}
                }]
            })),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": {"message": "no stub rule matched"}})),
        ),
    }
}

/// OpenAI-compatible chat endpoint; the returned base URL ends in `/v1`.
pub async fn spawn_chat_stub(pairs: &[(&str, &str)]) -> StubServer {
    spawn_chat_stub_with_delay(pairs, None).await
}

pub async fn spawn_chat_stub_with_delay(
    pairs: &[(&str, &str)],
    delay: Option<Duration>,
) -> StubServer {
    let state = StubState {
        rules: rules(pairs),
        delay,
        ..Default::default()
    };
    let prompts = state.prompts.clone();
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .with_state(state);

    StubServer {
        base_url: format!("{}/v1", serve(app).await),
        prompts,
    }
}

/// Gemini `generateContent` endpoint for any model name.
pub async fn spawn_search_stub(pairs: &[(&str, &str)]) -> StubServer {
    let state = StubState {
        rules: rules(pairs),
        ..Default::default()
    };
    let prompts = state.prompts.clone();
    let app = Router::new()
        .route("/v1beta/models/{action}", post(generate_content))
        .with_state(state);

    StubServer {
        base_url: format!("{}/v1beta", serve(app).await),
        prompts,
    }
}
