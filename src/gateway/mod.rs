//! HTTP gateway (Axum): the query endpoint plus liveness and readiness probes.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{QueryRequest, query_get_handler, query_post_handler};
pub use state::HandlerState;

use crate::constants::{
    ADHIKAAR_STATUS_ERROR, ADHIKAAR_STATUS_HEADER, ADHIKAAR_STATUS_HEALTHY, ADHIKAAR_STATUS_READY,
};
use crate::prompts::PROMPT_SET_VERSION;
use crate::vectordb::VectorDbClient;

pub fn create_router_with_state<V>(state: HandlerState<V>) -> Router
where
    V: VectorDbClient + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler::<V>))
        .route(
            "/query",
            get(query_get_handler::<V>).post(query_post_handler::<V>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub vectordb: &'static str,
    pub collection: String,
    pub collection_status: &'static str,
    pub embedder_mode: &'static str,
    pub reranker_mode: &'static str,
    pub prompt_set: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        ADHIKAAR_STATUS_HEADER,
        HeaderValue::from_static(ADHIKAAR_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

fn mode(is_stub: bool) -> &'static str {
    if is_stub { "stub" } else { "model" }
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<V>(State(state): State<HandlerState<V>>) -> Response
where
    V: VectorDbClient + 'static,
{
    let retrieval = state.assistant.retrieval();
    let vectordb = retrieval.vectordb();

    let vectordb_status = match vectordb.health_check().await {
        Ok(()) => ADHIKAAR_STATUS_READY,
        Err(e) => {
            tracing::warn!(error = %e, "Vector store health check failed");
            ADHIKAAR_STATUS_ERROR
        }
    };

    let collection_status = match vectordb.collection_exists(retrieval.collection()).await {
        Ok(true) => ADHIKAAR_STATUS_READY,
        Ok(false) => "missing",
        Err(_) => ADHIKAAR_STATUS_ERROR,
    };

    let components = ComponentStatus {
        http: ADHIKAAR_STATUS_READY,
        vectordb: vectordb_status,
        collection: retrieval.collection().to_string(),
        collection_status,
        embedder_mode: mode(retrieval.embedder().is_stub()),
        reranker_mode: mode(retrieval.scorer().is_stub()),
        prompt_set: PROMPT_SET_VERSION,
    };

    let is_ready = components.vectordb == ADHIKAAR_STATUS_READY
        && components.collection_status == ADHIKAAR_STATUS_READY;

    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(ADHIKAAR_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
