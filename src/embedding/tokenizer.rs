use std::io;
use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};

pub(crate) const TOKENIZER_FILE: &str = "tokenizer.json";

/// Loads `tokenizer.json` from a model directory, truncating inputs to `max_len` tokens.
///
/// Both encoders and cross-encoders have a fixed position-embedding table, so
/// longer inputs must be cut rather than rejected.
pub fn load_tokenizer(model_dir: &Path, max_len: usize) -> io::Result<Tokenizer> {
    let path = model_dir.join(TOKENIZER_FILE);
    let mut tokenizer = Tokenizer::from_file(&path).map_err(io::Error::other)?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            ..Default::default()
        }))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {}", e)))?;

    Ok(tokenizer)
}
