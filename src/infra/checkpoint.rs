// ============================================================
// Layer 6 — Model Store
// ============================================================
// Loads a pretrained model directory for inference.
//
// Directory layout (one per model):
//   models/classifier/
//     model_config.json   ← architecture (burn #[derive(Config)])
//     model.mpk.gz        ← weights, written by CompactRecorder
//     tokenizer.json      ← HuggingFace tokenizer definition
//
// The config must be read first: the model is rebuilt from it
// and only then are the weights loaded into it. Loading fails
// if the architecture does not match the saved weights.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::de::DeserializeOwned;
use std::{fs, path::PathBuf};
use tokenizers::{PostProcessor, Tokenizer, TruncationParams};

use crate::domain::error::PrepError;

pub const CONFIG_FILE:    &str = "model_config.json";
pub const WEIGHTS_FILE:   &str = "model";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Read-only access to one pretrained model directory.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Deserialise the architecture config from JSON.
    pub fn load_config<C: DeserializeOwned>(&self) -> Result<C> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read model config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid model config '{}'", path.display()))
    }

    /// Load the tokenizer saved next to the weights.
    pub fn load_tokenizer(&self) -> Result<Tokenizer> {
        let path = self.dir.join(TOKENIZER_FILE);
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    /// Load the tokenizer with truncation to `max_length` ids.
    /// Text is cut before special tokens are added, so a trailing
    /// separator or end-of-sequence marker always survives.
    pub fn load_tokenizer_truncated(&self, max_length: usize) -> Result<Tokenizer> {
        let mut tokenizer = self.load_tokenizer()?;

        let specials = tokenizer
            .get_post_processor()
            .map_or(0, |p| p.added_tokens(false));
        if max_length <= specials {
            return Err(PrepError::InvalidConfig(format!(
                "max length {max_length} leaves no room beside {specials} special tokens"
            ))
            .into());
        }

        tokenizer
            .with_truncation(Some(TruncationParams { max_length, ..Default::default() }))
            .map_err(|e| anyhow::anyhow!("Cannot set truncation: {e}"))?;
        Ok(tokenizer)
    }

    /// Restore weights into a freshly initialised model.
    pub fn load_weights<B: Backend, M: Module<B>>(&self, model: M, device: &B::Device) -> Result<M> {
        // The recorder appends its own extension.
        let path = self.dir.join(WEIGHTS_FILE);

        let record: M::Record = Recorder::<B>::load(&CompactRecorder::new(), path.clone(), device)
            .with_context(|| format!("Cannot load weights '{}'", path.display()))?;

        tracing::info!("Loaded weights from '{}'", self.dir.display());
        Ok(model.load_record(record))
    }
}
