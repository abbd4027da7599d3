// ============================================================
// Layer 5 — Translation Inferencer
// ============================================================
// Tokenise a batch → encode once → greedy decode → detokenise.
// Output order always matches input order.

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::data::batcher::TokenBatcher;
use crate::domain::traits::Translator;
use crate::infra::checkpoint::ModelStore;
use crate::ml::model::{TranslationModel, TranslationModelConfig};
use crate::ml::InferBackend;

/// Default cap on generated tokens per text
pub const DEFAULT_MAX_LEN: usize = 512;

/// A pretrained burn encoder-decoder behind the Translator trait.
pub struct BurnTranslator {
    model:     TranslationModel<InferBackend>,
    tokenizer: Tokenizer,
    batcher:   TokenBatcher<InferBackend>,
    max_len:   usize,
}

impl BurnTranslator {
    pub fn from_store(store: &ModelStore, max_len: usize) -> Result<Self> {
        let device = Default::default();
        let cfg: TranslationModelConfig = store.load_config()?;
        let tokenizer = store.load_tokenizer_truncated(cfg.max_seq_len)?;

        let model = store.load_weights(cfg.init::<InferBackend>(&device), &device)?;
        tracing::info!(
            "Translator ready: {} encoder / {} decoder layers",
            cfg.num_encoder_layers,
            cfg.num_decoder_layers
        );

        Ok(Self {
            model,
            tokenizer,
            batcher:   TokenBatcher::new(device, cfg.pad_id),
            max_len,
        })
    }
}

impl Translator for BurnTranslator {
    fn translate(&mut self, batch: &[String]) -> Result<Vec<String>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut sequences = Vec::with_capacity(batch.len());
        for text in batch {
            let encoding = self.tokenizer.encode(text.as_str(), true)
                .map_err(|e| anyhow::anyhow!("Tokenise: {e}"))?;
            sequences.push(encoding.get_ids().to_vec());
        }

        let tokens = self.batcher.batch(&sequences);
        let generated = self.model.greedy_decode(&tokens, self.max_len);

        generated
            .iter()
            .map(|ids| {
                self.tokenizer.decode(ids, true)
                    .map_err(|e| anyhow::anyhow!("Decode: {e}"))
            })
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::checkpoint::fixtures;

    const WORDS: &[&str] = &["<pad>", "</s>", "[UNK]", "merhaba", "dunya", "hello", "world"];

    fn translator_in(dir: &std::path::Path, max_len: usize) -> BurnTranslator {
        let device = Default::default();
        let config = TranslationModelConfig::new(WORDS.len(), 16, 8, 2, 1, 1, 16, 0, 1, 0);
        let model  = config.init::<InferBackend>(&device);
        fixtures::write_model_dir::<InferBackend, _, _>(dir, &config, model, WORDS);
        BurnTranslator::from_store(&ModelStore::new(dir), max_len).unwrap()
    }

    #[test]
    fn test_one_output_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = translator_in(dir.path(), 5);
        let batch: Vec<String> = vec!["hello world".into(), "".into(), "world".into()];
        let out = t.translate(&batch).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_generation_respects_max_len() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = translator_in(dir.path(), 3);
        let out = t.translate(&["hello".to_string()]).unwrap();
        assert!(out[0].split_whitespace().count() <= 3);
    }

    #[test]
    fn test_empty_batch_skips_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = translator_in(dir.path(), 3);
        assert!(t.translate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_translation_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = translator_in(dir.path(), 4);
        let batch = vec!["hello world".to_string()];
        assert_eq!(t.translate(&batch).unwrap(), t.translate(&batch).unwrap());
    }

    #[test]
    fn test_source_longer_than_positions_is_cut() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = translator_in(dir.path(), 4);
        let long = "hello world ".repeat(40);
        assert_eq!(t.translate(&[long]).unwrap().len(), 1);
    }
}
