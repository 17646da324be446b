use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("template '{template}' needs variable '{name}' which was not supplied")]
    MissingVariable {
        template: &'static str,
        name: String,
    },

    #[error("template '{template}' has an unterminated placeholder")]
    Unterminated { template: &'static str },

    #[error("failed to read prompt override {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("prompt override {path} is empty")]
    EmptyOverride { path: PathBuf },
}
