use crate::config::ModelSource;
use crate::constants::DEFAULT_MAX_SEQ_LEN;

#[derive(Debug, Clone)]
pub struct RerankerConfig {
    pub source: ModelSource,

    /// Max tokens for the concatenated (query, passage) pair.
    pub max_seq_len: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            source: ModelSource::Stub,
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
        }
    }
}

impl RerankerConfig {
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_seq_len == 0 {
            return Err("max_seq_len must be positive".to_string());
        }

        if let ModelSource::Directory(ref path) = self.source
            && path.as_os_str().is_empty()
        {
            return Err("model directory cannot be empty".to_string());
        }

        Ok(())
    }
}
