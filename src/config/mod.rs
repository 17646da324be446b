//! Environment-backed configuration.
//!
//! Credentials, the vector index and every model identifier are required and
//! fail start-up when absent. Everything else has a default and can be
//! overridden with `ADHIKAAR_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{DEFAULT_LLM_TIMEOUT_SECS, DEFAULT_RELEVANCE_THRESHOLD};

/// Default Qdrant URL used when `ADHIKAAR_VECTOR_URL` is not set.
pub const DEFAULT_VECTOR_URL: &str = "http://localhost:6334";
/// OpenAI-compatible chat-completion endpoint (Groq).
pub const DEFAULT_CHAT_API_BASE: &str = "https://api.groq.com/openai/v1";
/// Gemini REST endpoint used for grounded web search.
pub const DEFAULT_SEARCH_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SEARCH_MODEL: &str = "gemini-2.5-flash";

/// Sites the web-search fallback may cite.
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "lawcommission.gov.np",
    "supremecourt.gov.np",
    "moljpa.gov.np",
    "hr.parliament.gov.np",
    "nhrcnepal.org",
    "nepalpolice.gov.np",
    "dao.gov.np",
];

/// Where a local model comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Deterministic in-process stand-in; needs no files.
    Stub,
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    Directory(PathBuf),
}

impl ModelSource {
    /// Parses an identifier; the literal `stub` selects [`ModelSource::Stub`].
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("stub") {
            ModelSource::Stub
        } else {
            ModelSource::Directory(PathBuf::from(value))
        }
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, ModelSource::Stub)
    }
}

/// What to do when embedding or vector search fails outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetrievalFailurePolicy {
    /// Treat the failure as "no relevant context" and ask the web-search fallback.
    #[default]
    Fallback,
    /// Fail the request.
    Abort,
}

impl std::str::FromStr for RetrievalFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallback" => Ok(Self::Fallback),
            "abort" => Ok(Self::Abort),
            _ => Err(format!("unknown retrieval failure policy: {}", s)),
        }
    }
}

/// Server configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,
    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Bearer key for the chat-completion provider.
    pub chat_api_key: String,
    /// Base URL of the OpenAI-compatible chat-completion API.
    pub chat_api_base: String,
    /// Model used for language detection, classification and translation.
    pub classifier_model: String,
    /// Model used to compose answers from retrieved context.
    pub answer_model: String,

    /// Key for the web-search-capable model API.
    pub search_api_key: String,
    pub search_api_base: String,
    pub search_model: String,
    /// Allow-list of domains the web-search fallback may rely on.
    pub trusted_domains: Vec<String>,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub vector_url: String,
    pub vector_api_key: String,
    /// Collection holding the indexed legal corpus.
    pub vector_index: String,

    pub embedding_model: ModelSource,
    pub reranker_model: ModelSource,
    /// Text prepended to each query before embedding. Default: none, matching
    /// an index built from unprefixed text. Set `query: ` for e5-prefixed indexes.
    pub query_prefix: String,

    /// Bound on every outbound LLM call. Default: 15s.
    pub llm_timeout: Duration,
    /// Top-chunk similarity below which the web-search fallback answers. Default: `0.7`.
    pub relevance_threshold: f32,
    pub retrieval_failure: RetrievalFailurePolicy,

    /// Optional directory overriding the built-in prompt templates.
    pub prompts_dir: Option<PathBuf>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_addr", &self.bind_addr)
            .field("chat_api_key", &"<redacted>")
            .field("chat_api_base", &self.chat_api_base)
            .field("classifier_model", &self.classifier_model)
            .field("answer_model", &self.answer_model)
            .field("search_api_key", &"<redacted>")
            .field("search_api_base", &self.search_api_base)
            .field("search_model", &self.search_model)
            .field("trusted_domains", &self.trusted_domains)
            .field("vector_url", &self.vector_url)
            .field("vector_api_key", &"<redacted>")
            .field("vector_index", &self.vector_index)
            .field("embedding_model", &self.embedding_model)
            .field("reranker_model", &self.reranker_model)
            .field("query_prefix", &self.query_prefix)
            .field("llm_timeout", &self.llm_timeout)
            .field("relevance_threshold", &self.relevance_threshold)
            .field("retrieval_failure", &self.retrieval_failure)
            .field("prompts_dir", &self.prompts_dir)
            .finish()
    }
}

impl Config {
    pub const ENV_PORT: &'static str = "ADHIKAAR_PORT";
    pub const ENV_BIND_ADDR: &'static str = "ADHIKAAR_BIND_ADDR";
    pub const ENV_CHAT_API_KEY: &'static str = "ADHIKAAR_CHAT_API_KEY";
    pub const ENV_CHAT_API_BASE: &'static str = "ADHIKAAR_CHAT_API_BASE";
    pub const ENV_CLASSIFIER_MODEL: &'static str = "ADHIKAAR_CLASSIFIER_MODEL";
    pub const ENV_ANSWER_MODEL: &'static str = "ADHIKAAR_ANSWER_MODEL";
    pub const ENV_SEARCH_API_KEY: &'static str = "ADHIKAAR_SEARCH_API_KEY";
    pub const ENV_SEARCH_API_BASE: &'static str = "ADHIKAAR_SEARCH_API_BASE";
    pub const ENV_SEARCH_MODEL: &'static str = "ADHIKAAR_SEARCH_MODEL";
    pub const ENV_TRUSTED_DOMAINS: &'static str = "ADHIKAAR_TRUSTED_DOMAINS";
    pub const ENV_VECTOR_URL: &'static str = "ADHIKAAR_VECTOR_URL";
    pub const ENV_VECTOR_API_KEY: &'static str = "ADHIKAAR_VECTOR_API_KEY";
    pub const ENV_VECTOR_INDEX: &'static str = "ADHIKAAR_VECTOR_INDEX";
    pub const ENV_EMBEDDING_MODEL: &'static str = "ADHIKAAR_EMBEDDING_MODEL";
    pub const ENV_RERANKER_MODEL: &'static str = "ADHIKAAR_RERANKER_MODEL";
    pub const ENV_QUERY_PREFIX: &'static str = "ADHIKAAR_QUERY_PREFIX";
    pub const ENV_LLM_TIMEOUT_SECS: &'static str = "ADHIKAAR_LLM_TIMEOUT_SECS";
    pub const ENV_RELEVANCE_THRESHOLD: &'static str = "ADHIKAAR_RELEVANCE_THRESHOLD";
    pub const ENV_RETRIEVAL_FAILURE: &'static str = "ADHIKAAR_RETRIEVAL_FAILURE";
    pub const ENV_PROMPTS_DIR: &'static str = "ADHIKAAR_PROMPTS_DIR";

    /// Variables that must be present for [`Config::from_env`] to succeed.
    pub const REQUIRED_VARS: &'static [&'static str] = &[
        Self::ENV_CHAT_API_KEY,
        Self::ENV_SEARCH_API_KEY,
        Self::ENV_VECTOR_API_KEY,
        Self::ENV_VECTOR_INDEX,
        Self::ENV_EMBEDDING_MODEL,
        Self::ENV_RERANKER_MODEL,
        Self::ENV_CLASSIFIER_MODEL,
    ];

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let chat_api_key = Self::require(Self::ENV_CHAT_API_KEY)?;
        let search_api_key = Self::require(Self::ENV_SEARCH_API_KEY)?;
        let vector_api_key = Self::require(Self::ENV_VECTOR_API_KEY)?;
        let vector_index = Self::require(Self::ENV_VECTOR_INDEX)?;
        let embedding_model = ModelSource::parse(&Self::require(Self::ENV_EMBEDDING_MODEL)?);
        let reranker_model = ModelSource::parse(&Self::require(Self::ENV_RERANKER_MODEL)?);
        let classifier_model = Self::require(Self::ENV_CLASSIFIER_MODEL)?;

        let port = Self::parse_port_from_env(8080)?;
        let bind_addr =
            Self::parse_bind_addr_from_env(IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)))?;

        let answer_model = Self::optional(Self::ENV_ANSWER_MODEL)
            .unwrap_or_else(|| classifier_model.clone());

        let llm_timeout_secs =
            Self::parse_from_env(Self::ENV_LLM_TIMEOUT_SECS, DEFAULT_LLM_TIMEOUT_SECS)?;
        let relevance_threshold =
            Self::parse_from_env(Self::ENV_RELEVANCE_THRESHOLD, DEFAULT_RELEVANCE_THRESHOLD)?;

        let retrieval_failure = match Self::optional(Self::ENV_RETRIEVAL_FAILURE) {
            Some(value) => value
                .parse::<RetrievalFailurePolicy>()
                .map_err(|reason| ConfigError::InvalidValue {
                    name: Self::ENV_RETRIEVAL_FAILURE,
                    value,
                    reason,
                })?,
            None => RetrievalFailurePolicy::default(),
        };

        let trusted_domains = Self::optional(Self::ENV_TRUSTED_DOMAINS)
            .map(|v| parse_domain_list(&v))
            .unwrap_or_else(default_trusted_domains);

        Ok(Self {
            port,
            bind_addr,
            chat_api_key,
            chat_api_base: Self::optional(Self::ENV_CHAT_API_BASE)
                .unwrap_or_else(|| DEFAULT_CHAT_API_BASE.to_string()),
            classifier_model,
            answer_model,
            search_api_key,
            search_api_base: Self::optional(Self::ENV_SEARCH_API_BASE)
                .unwrap_or_else(|| DEFAULT_SEARCH_API_BASE.to_string()),
            search_model: Self::optional(Self::ENV_SEARCH_MODEL)
                .unwrap_or_else(|| DEFAULT_SEARCH_MODEL.to_string()),
            trusted_domains,
            vector_url: Self::optional(Self::ENV_VECTOR_URL)
                .unwrap_or_else(|| DEFAULT_VECTOR_URL.to_string()),
            vector_api_key,
            vector_index,
            embedding_model,
            reranker_model,
            // Not trimmed: e5 prefixes end in a space.
            query_prefix: env::var(Self::ENV_QUERY_PREFIX).unwrap_or_default(),
            llm_timeout: Duration::from_secs(llm_timeout_secs),
            relevance_threshold,
            retrieval_failure,
            prompts_dir: Self::optional(Self::ENV_PROMPTS_DIR).map(PathBuf::from),
        })
    }

    /// Validates paths, URLs and numeric ranges (does not touch the network).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.relevance_threshold) {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_RELEVANCE_THRESHOLD,
                value: self.relevance_threshold.to_string(),
                reason: "must be between 0.0 and 1.0".to_string(),
            });
        }

        if self.llm_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_LLM_TIMEOUT_SECS,
                value: "0".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        if self.trusted_domains.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_TRUSTED_DOMAINS,
                value: String::new(),
                reason: "at least one trusted domain is required".to_string(),
            });
        }

        for (name, value) in [
            (Self::ENV_CHAT_API_BASE, &self.chat_api_base),
            (Self::ENV_SEARCH_API_BASE, &self.search_api_base),
            (Self::ENV_VECTOR_URL, &self.vector_url),
        ] {
            reqwest::Url::parse(value).map_err(|e| ConfigError::InvalidUrl {
                name,
                value: value.clone(),
                reason: e.to_string(),
            })?;
        }

        for source in [&self.embedding_model, &self.reranker_model] {
            if let ModelSource::Directory(path) = source {
                Self::require_dir(path)?;
            }
        }

        if let Some(ref path) = self.prompts_dir {
            Self::require_dir(path)?;
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn require_dir(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn require(name: &'static str) -> Result<String, ConfigError> {
        Self::optional(name).ok_or(ConfigError::MissingEnvVar { name })
    }

    fn optional(name: &str) -> Option<String> {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match Self::optional(Self::ENV_PORT) {
            Some(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            None => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match Self::optional(Self::ENV_BIND_ADDR) {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            None => Ok(default),
        }
    }

    fn parse_from_env<T>(name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::optional(name) {
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                name,
                reason: e.to_string(),
                value,
            }),
            None => Ok(default),
        }
    }

    /// A fully stubbed configuration for tests and local development.
    #[cfg(any(test, feature = "mock"))]
    pub fn for_testing() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            chat_api_key: "test-chat-key".to_string(),
            chat_api_base: DEFAULT_CHAT_API_BASE.to_string(),
            classifier_model: "llama3-70b-8192".to_string(),
            answer_model: "llama3-70b-8192".to_string(),
            search_api_key: "test-search-key".to_string(),
            search_api_base: DEFAULT_SEARCH_API_BASE.to_string(),
            search_model: DEFAULT_SEARCH_MODEL.to_string(),
            trusted_domains: default_trusted_domains(),
            vector_url: DEFAULT_VECTOR_URL.to_string(),
            vector_api_key: "test-vector-key".to_string(),
            vector_index: "legal-chatbot-index".to_string(),
            embedding_model: ModelSource::Stub,
            reranker_model: ModelSource::Stub,
            query_prefix: String::new(),
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            retrieval_failure: RetrievalFailurePolicy::Fallback,
            prompts_dir: None,
        }
    }
}

/// Returns [`DEFAULT_TRUSTED_DOMAINS`] as owned strings.
pub fn default_trusted_domains() -> Vec<String> {
    DEFAULT_TRUSTED_DOMAINS
        .iter()
        .map(|d| d.to_string())
        .collect()
}

fn parse_domain_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|d| d.trim().trim_start_matches("https://").trim_end_matches('/'))
        .filter(|d| !d.is_empty())
        .map(|d| d.to_lowercase())
        .collect()
}
