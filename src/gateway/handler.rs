use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::assistant::QueryOutcome;
use crate::constants::{
    ADHIKAAR_ANSWER_HEADER, ADHIKAAR_CATEGORY_HEADER, ADHIKAAR_LANGUAGE_HEADER,
    ADHIKAAR_STATUS_HEADER,
};
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::vectordb::VectorDbClient;

/// Query string or JSON body of `GET /query`, and body of `POST /query`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub user_query: String,
}

/// The query string wins; the JSON body is read only when the query string
/// has no `user_query`.
#[instrument(skip(state, params, body), fields(request_id = tracing::field::Empty))]
pub async fn query_get_handler<V>(
    State(state): State<HandlerState<V>>,
    params: Result<Query<QueryRequest>, QueryRejection>,
    body: Bytes,
) -> Result<Response, GatewayError>
where
    V: VectorDbClient + 'static,
{
    let Query(mut request) = params.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    if request.user_query.trim().is_empty() && !body.is_empty() {
        request = serde_json::from_slice(&body).map_err(|e| {
            GatewayError::InvalidRequest(format!("Failed to parse the request body as JSON: {e}"))
        })?;
    }
    answer_request(&state, request).await
}

#[instrument(skip(state, body), fields(request_id = tracing::field::Empty))]
pub async fn query_post_handler<V>(
    State(state): State<HandlerState<V>>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    V: VectorDbClient + 'static,
{
    let Json(request) = body.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    answer_request(&state, request).await
}

async fn answer_request<V>(
    state: &HandlerState<V>,
    request: QueryRequest,
) -> Result<Response, GatewayError>
where
    V: VectorDbClient + 'static,
{
    let request_id = uuid::Uuid::new_v4();
    tracing::Span::current().record("request_id", tracing::field::display(request_id));

    if request.user_query.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "user_query must not be empty".to_string(),
        ));
    }

    debug!(query_len = request.user_query.len(), "Handling query");

    let outcome = state.assistant.answer(&request.user_query).await?;
    Ok(make_response(outcome))
}

pub(crate) fn make_response(outcome: QueryOutcome) -> Response {
    let QueryOutcome { query, answer } = outcome;

    let mut headers = HeaderMap::new();
    let status = if answer.is_degraded() { "degraded" } else { "ok" };
    headers.insert(ADHIKAAR_STATUS_HEADER, HeaderValue::from_static(status));
    headers.insert(
        ADHIKAAR_CATEGORY_HEADER,
        HeaderValue::from_static(query.category().as_str()),
    );
    headers.insert(
        ADHIKAAR_LANGUAGE_HEADER,
        HeaderValue::from_static(query.language().as_str()),
    );
    headers.insert(
        ADHIKAAR_ANSWER_HEADER,
        HeaderValue::from_static(answer.source.as_str()),
    );

    (StatusCode::OK, headers, Json(answer)).into_response()
}
