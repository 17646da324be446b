//! Strict JSON extraction from model output.

use serde::de::DeserializeOwned;
use std::future::Future;
use tracing::warn;

use super::error::{LlmError, UpstreamJsonError};

/// Removes a surrounding markdown code fence (```` ```json ```` or bare ```` ``` ````).
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parses `raw` as `T` after removing code fences. No other leniency.
pub fn parse_strict<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fences(raw))
}

/// Parses `raw`; on failure calls `repair` exactly once with the broken text and
/// parses its output.
pub async fn parse_or_repair<T, F, Fut>(raw: &str, repair: F) -> Result<T, UpstreamJsonError>
where
    T: DeserializeOwned,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<String, LlmError>>,
{
    let first_err = match parse_strict::<T>(raw) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    warn!(error = %first_err, raw_len = raw.len(), "Model output failed validation, repairing once");

    let repaired = repair(raw.to_string())
        .await
        .map_err(|source| UpstreamJsonError::RepairCallFailed {
            raw: raw.to_string(),
            source,
        })?;

    parse_strict::<T>(&repaired).map_err(|source| UpstreamJsonError::Invalid {
        raw: strip_code_fences(&repaired).to_string(),
        source,
    })
}
