//! BERT-family networks loaded from a HuggingFace model directory.
//!
//! - [`BertEncoder`] mean-pools the last hidden state into a sentence embedding.
//! - [`BertClassifier`] puts a single-logit head on the `[CLS]` token (cross-encoder).

use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_core::IndexOp;
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};
use std::path::Path;
use std::sync::Arc;

pub(crate) const CONFIG_FILE: &str = "config.json";
pub(crate) const WEIGHTS_FILE: &str = "model.safetensors";

fn read_config(model_dir: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(model_dir.join(CONFIG_FILE))?;
    serde_json::from_str(&content)
        .map_err(|e| candle::Error::Msg(format!("Failed to parse config: {}", e)))
}

fn var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let weights = model_dir.join(WEIGHTS_FILE);
    // SAFETY: the weights file is not modified while the process runs.
    unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device) }
}

/// Sentence-transformers checkpoints store the encoder either at the root or
/// under a `bert.` / `roberta.` prefix depending on how they were exported.
fn load_backbone(vb: &VarBuilder, config: &Config) -> Result<BertModel> {
    if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("bert"), config)
    } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
        BertModel::load(vb.pp("roberta"), config)
    } else {
        BertModel::load(vb.clone(), config)
    }
}

struct CrossEncoderHead {
    bert: BertModel,
    classifier: Linear,
}

/// Cross-encoder: scores a tokenized (query, passage) pair with one logit.
#[derive(Clone)]
pub struct BertClassifier(Arc<CrossEncoderHead>);

impl BertClassifier {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config = read_config(model_dir)?;
        let vb = var_builder(model_dir, device)?;

        let bert = load_backbone(&vb, &config)?;
        let classifier = candle_nn::linear(config.hidden_size, 1, vb.pp("classifier"))?;

        Ok(Self(Arc::new(CrossEncoderHead { bert, classifier })))
    }

    pub fn forward(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: Option<&Tensor>,
    ) -> Result<Tensor> {
        let output = self.0.bert.forward(input_ids, token_type_ids, attention_mask)?;
        let cls_token = output.i((.., 0, ..))?;
        self.0.classifier.forward(&cls_token)
    }
}

/// Bi-encoder producing mean-pooled sentence embeddings.
#[derive(Clone)]
pub struct BertEncoder {
    bert: Arc<BertModel>,
    hidden_size: usize,
}

impl BertEncoder {
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config = read_config(model_dir)?;
        let vb = var_builder(model_dir, device)?;
        let bert = load_backbone(&vb, &config)?;

        Ok(Self {
            bert: Arc::new(bert),
            hidden_size: config.hidden_size,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Returns the `[hidden_size]` mean of token states, weighted by `attention_mask`.
    ///
    /// All inputs are `[1, seq_len]`.
    pub fn embed(
        &self,
        input_ids: &Tensor,
        token_type_ids: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Vec<f32>> {
        let hidden = self
            .bert
            .forward(input_ids, token_type_ids, Some(attention_mask))?;

        let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?;

        summed.broadcast_div(&counts)?.squeeze(0)?.to_vec1::<f32>()
    }
}
