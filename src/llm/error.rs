use thiserror::Error;

#[derive(Debug, Error)]
/// Failures talking to a hosted model.
pub enum LlmError {
    #[error("request to '{model}' timed out after {after_secs}s")]
    Timeout { model: String, after_secs: u64 },

    #[error("request to '{model}' failed: {message}")]
    Transport { model: String, message: String },

    #[error("'{model}' returned HTTP {status}: {body}")]
    Status {
        model: String,
        status: u16,
        body: String,
    },

    #[error("'{model}' returned no completion text")]
    EmptyCompletion { model: String },

    #[error("'{model}' returned an unreadable response: {reason}")]
    MalformedResponse { model: String, reason: String },

    #[error("could not build request: {reason}")]
    InvalidRequest { reason: String },
}

impl LlmError {
    pub(crate) fn from_reqwest(model: &str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout {
                model: model.to_string(),
                after_secs: timeout_secs,
            }
        } else {
            LlmError::Transport {
                model: model.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Timeout { .. })
    }
}

#[derive(Debug, Error)]
/// Model output that failed schema validation even after the single repair attempt.
pub enum UpstreamJsonError {
    #[error("model output is not valid JSON after repair: {source}")]
    Invalid {
        /// Last text the model produced (the repaired attempt).
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("repair call failed: {source}")]
    RepairCallFailed {
        /// The original unparseable output.
        raw: String,
        #[source]
        source: LlmError,
    },
}

impl UpstreamJsonError {
    /// Best available text for degraded responses.
    pub fn raw(&self) -> &str {
        match self {
            UpstreamJsonError::Invalid { raw, .. } => raw,
            UpstreamJsonError::RepairCallFailed { raw, .. } => raw,
        }
    }
}
