// ============================================================
// Layer 5 — Classifier Inferencer
// ============================================================
use anyhow::Result;
use tokenizers::Tokenizer;

use crate::data::batcher::TokenBatcher;
use crate::domain::traits::TextClassifier;
use crate::infra::checkpoint::ModelStore;
use crate::ml::model::{SequenceClassifier, SequenceClassifierConfig};
use crate::ml::InferBackend;

/// Default token budget per text
pub const DEFAULT_MAX_LEN: usize = 128;

/// A pretrained burn sequence classifier behind the TextClassifier trait.
pub struct BurnClassifier {
    model:     SequenceClassifier<InferBackend>,
    tokenizer: Tokenizer,
    batcher:   TokenBatcher<InferBackend>,
}

impl BurnClassifier {
    pub fn from_store(store: &ModelStore, max_len: usize) -> Result<Self> {
        let device = Default::default();
        let cfg: SequenceClassifierConfig = store.load_config()?;
        // Position embeddings bound the usable length.
        let tokenizer = store.load_tokenizer_truncated(max_len.min(cfg.max_seq_len))?;

        let model = store.load_weights(cfg.init::<InferBackend>(&device), &device)?;
        tracing::info!(
            "Classifier ready: {} layers, {} classes",
            cfg.num_layers,
            cfg.num_classes
        );

        Ok(Self {
            model,
            tokenizer,
            batcher: TokenBatcher::new(device, cfg.pad_id),
        })
    }
}

impl TextClassifier for BurnClassifier {
    fn classify(&mut self, text: &str) -> Result<i64> {
        let encoding = self.tokenizer.encode(text, true)
            .map_err(|e| anyhow::anyhow!("Tokenise: {e}"))?;

        let batch = self.batcher.batch(&[encoding.get_ids().to_vec()]);
        let class = self.model.predict(&batch)
            .first()
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Classifier returned no prediction"))?;

        tracing::trace!("class {} for '{}'", class, text);
        Ok(class)
    }
}
