use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::answer::{CompositionError, FallbackError};
use crate::assistant::AssistantError;
use crate::classifier::ClassificationError;
use crate::constants::ADHIKAAR_STATUS_HEADER;
use crate::llm::{LlmError, UpstreamJsonError};
use crate::retrieval::RetrievalError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("classification failed: {0}")]
    ClassificationFailed(#[from] ClassificationError),

    #[error("retrieval failed: {0}")]
    RetrievalFailed(#[from] RetrievalError),

    #[error("answer composition failed: {0}")]
    CompositionFailed(#[from] CompositionError),
}

impl From<AssistantError> for GatewayError {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::EmptyQuery => {
                GatewayError::InvalidRequest("user_query must not be empty".to_string())
            }
            AssistantError::Classification(e) => GatewayError::ClassificationFailed(e),
            AssistantError::Retrieval(e) => GatewayError::RetrievalFailed(e),
            AssistantError::Composition(e) => GatewayError::CompositionFailed(e),
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    /// The failing upstream call, if this error came from a hosted model.
    fn upstream_call(&self) -> Option<&LlmError> {
        match self {
            GatewayError::ClassificationFailed(ClassificationError::Call(e))
            | GatewayError::ClassificationFailed(ClassificationError::Schema(
                UpstreamJsonError::RepairCallFailed { source: e, .. },
            ))
            | GatewayError::CompositionFailed(CompositionError::Call(e))
            | GatewayError::CompositionFailed(CompositionError::Fallback(FallbackError::Call(
                e,
            )))
            | GatewayError::CompositionFailed(CompositionError::Fallback(FallbackError::Schema(
                UpstreamJsonError::RepairCallFailed { source: e, .. },
            ))) => Some(e),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ if self.upstream_call().is_some_and(LlmError::is_timeout) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            _ => StatusCode::BAD_GATEWAY,
        }
    }

    /// Value of the `X-Adhikaar-Status` header.
    pub fn status_tag(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            _ if self.upstream_call().is_some_and(LlmError::is_timeout) => "upstream_timeout",
            GatewayError::ClassificationFailed(_) => "classification_error",
            GatewayError::RetrievalFailed(_) => "retrieval_error",
            GatewayError::CompositionFailed(CompositionError::Fallback(_)) => "fallback_error",
            GatewayError::CompositionFailed(_) => "composition_error",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = status.as_u16(), "Request failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ADHIKAAR_STATUS_HEADER,
            HeaderValue::from_static(self.status_tag()),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
