//! Query vocabulary: detected language, category and the classifier's verdict.

mod safety;


pub use safety::safety_message;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[serde(alias = "en", alias = "English")]
    English,
    #[serde(
        alias = "ne",
        alias = "Nepali",
        alias = "nepali_devanagari",
        alias = "devanagari"
    )]
    Nepali,
    #[serde(
        alias = "roman_nepali",
        alias = "romanised_nepali",
        alias = "Romanized Nepali",
        alias = "nepali_romanized"
    )]
    RomanizedNepali,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Nepali => "nepali",
            Language::RomanizedNepali => "romanized_nepali",
        }
    }

    /// How the answer prompts name the reply language.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Nepali => "Nepali (Devanagari script)",
            Language::RomanizedNepali => "Romanized Nepali (Nepali written in Latin script)",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    LegalQuery,
    GeneralChat,
    Unsupported,
    HarmfulIntent,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::LegalQuery => "legal_query",
            Category::GeneralChat => "general_chat",
            Category::Unsupported => "unsupported",
            Category::HarmfulIntent => "harmful_intent",
        }
    }

    pub fn needs_retrieval(self) -> bool {
        matches!(self, Category::LegalQuery)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classifier's schema: exactly one category per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Classification {
    pub language: Language,
    pub category: Category,
    /// English translation for `legal_query`, otherwise a short reply.
    pub response: String,
}

/// A classified user query. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    raw: String,
    classification: Classification,
}

impl Query {
    pub fn new(raw: impl Into<String>, classification: Classification) -> Self {
        Self {
            raw: raw.into(),
            classification,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn language(&self) -> Language {
        self.classification.language
    }

    pub fn category(&self) -> Category {
        self.classification.category
    }

    /// Text to retrieve with: the English translation when one was produced,
    /// else the raw query.
    pub fn search_text(&self) -> &str {
        let translated = self.classification.response.trim();
        if self.category() == Category::LegalQuery && !translated.is_empty() {
            translated
        } else {
            &self.raw
        }
    }

    pub fn response(&self) -> &str {
        &self.classification.response
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }
}
