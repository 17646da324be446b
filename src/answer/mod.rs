//! Answer wire type, context-grounded composition and the web-search fallback.

mod composer;
mod error;
mod fallback;


pub use composer::{AnswerComposer, Route, format_context, route};
pub use error::{CompositionError, FallbackError};
pub use fallback::WebSearchFallback;

use serde::{Deserialize, Deserializer, Serialize};

use crate::query::Category;

/// Which path produced an [`Answer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// Grounded in retrieved chunks.
    #[default]
    Context,
    /// Produced by the web-search fallback.
    WebSearch,
    /// Classifier reply or safety message; no retrieval involved.
    Conversation,
    /// Unparseable model text passed through after a failed repair.
    Degraded,
}

impl AnswerSource {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerSource::Context => "context",
            AnswerSource::WebSearch => "web_search",
            AnswerSource::Conversation => "conversation",
            AnswerSource::Degraded => "degraded",
        }
    }
}

/// Response body returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Markdown answer text.
    pub message: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub reference: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub category: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Category,
    /// True iff no chunk cleared the relevance threshold or the context model
    /// reported it could not answer.
    #[serde(default)]
    pub fallback: bool,
    #[serde(default)]
    pub source: AnswerSource,
}

impl Answer {
    /// A reply that involved no retrieval: reference and category stay empty.
    pub fn conversation(kind: Category, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reference: Vec::new(),
            category: Vec::new(),
            kind,
            fallback: false,
            source: AnswerSource::Conversation,
        }
    }

    pub fn degraded(raw: impl Into<String>) -> Self {
        Self {
            message: raw.into(),
            reference: Vec::new(),
            category: Vec::new(),
            kind: Category::LegalQuery,
            fallback: false,
            source: AnswerSource::Degraded,
        }
    }

    pub(crate) fn from_model(output: ModelAnswer, source: AnswerSource, fallback: bool) -> Self {
        Self {
            message: output.message.trim().to_string(),
            reference: clean(output.reference),
            category: clean(output.category),
            kind: Category::LegalQuery,
            fallback,
            source,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message.trim().is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        self.source == AnswerSource::Degraded
    }
}

/// What the answer and web-search models are asked to emit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ModelAnswer {
    pub message: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub reference: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub category: Vec<String>,
}

/// Accepts `"x"`, `["x", "y"]`, `""` or `null`. A blank string is an empty list;
/// lists are kept verbatim.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.trim().is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
    })
}

fn clean(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
