// ============================================================
// Layer 4 — Batching
// ============================================================
// Two kinds of batching live here:
//
//   1. Text batches for the Translator capability
//      Consecutive, fixed-size, processed strictly in order:
//        17 texts, batch_size 16  →  [0..16], [16..17]
//      Each batch's output is appended before the next batch
//      is sent, so output[i] always answers input[i].
//
//   2. Token batches for the burn models
//      Input:  N token-id sequences of different lengths
//      Output: TokenBatch with tensors of shape [N, S]
//              where S is the longest sequence; shorter rows
//              are padded with the tokenizer's pad id.
//
//      [s1_t1, s1_t2, ..., s1_tS, s2_t1, ..., sN_tS] → [N, S]
//
// Reference: Burn Book §4 (Batcher)
//            Rust Book §8 (Vectors)

use anyhow::Result;
use burn::prelude::*;
use std::ops::Range;

use crate::domain::error::PrepError;
use crate::domain::traits::Translator;

/// Default number of texts sent to the translator per call
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Consecutive index ranges of at most `batch_size` items covering `0..len`.
pub fn batch_ranges(len: usize, batch_size: usize) -> Result<Vec<Range<usize>>> {
    if batch_size == 0 {
        return Err(PrepError::InvalidConfig("batch size must be at least 1".into()).into());
    }
    Ok((0..len)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(len))
        .collect())
}

/// Translate `texts` through `translator` one batch at a time.
///
/// Fails if the translator returns a different number of
/// outputs than it was given for any batch.
pub fn translate_in_batches<T: Translator + ?Sized>(
    translator: &mut T,
    texts:      &[String],
    batch_size: usize,
) -> Result<Vec<String>> {
    let ranges = batch_ranges(texts.len(), batch_size)?;
    let mut translated = Vec::with_capacity(texts.len());

    for (i, range) in ranges.into_iter().enumerate() {
        let batch  = &texts[range];
        let output = translator.translate(batch)?;

        if output.len() != batch.len() {
            return Err(PrepError::LengthMismatch {
                expected: batch.len(),
                actual:   output.len(),
            }
            .into());
        }

        tracing::debug!("Translated batch {} ({} texts)", i + 1, batch.len());
        translated.extend(output);
    }

    Ok(translated)
}

// ─── TokenBatch ───────────────────────────────────────────────────────────────
/// Padded token ids ready for a model forward pass.
#[derive(Debug, Clone)]
pub struct TokenBatch<B: Backend> {
    /// Token ID sequences, shape [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// Attention mask, shape [batch_size, seq_len]
    /// 1 = real token, 0 = padding
    pub attention_mask: Tensor<B, 2, Int>,

    /// True where a position is padding, shape [batch_size, seq_len]
    pub mask_pad: Tensor<B, 2, Bool>,
}

// ─── TokenBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the correct backend.
#[derive(Clone, Debug)]
pub struct TokenBatcher<B: Backend> {
    pub device: B::Device,
    pub pad_id: u32,
}

impl<B: Backend> TokenBatcher<B> {
    pub fn new(device: B::Device, pad_id: u32) -> Self {
        Self { device, pad_id }
    }

    /// Stack sequences into a single padded batch.
    /// An empty sequence still occupies one (padding) position.
    pub fn batch(&self, items: &[Vec<u32>]) -> TokenBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.iter().map(Vec::len).max().unwrap_or(0).max(1);

        let mut input_flat: Vec<i32> = Vec::with_capacity(batch_size * seq_len);
        let mut mask_flat:  Vec<i32> = Vec::with_capacity(batch_size * seq_len);

        for ids in items {
            for pos in 0..seq_len {
                match ids.get(pos) {
                    Some(&id) => {
                        input_flat.push(id as i32);
                        mask_flat.push(1);
                    }
                    None => {
                        input_flat.push(self.pad_id as i32);
                        mask_flat.push(0);
                    }
                }
            }
        }

        let input_ids = Tensor::<B, 1, Int>::from_ints(
            input_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(
            mask_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        let mask_pad = attention_mask.clone().equal_elem(0);

        TokenBatch { input_ids, attention_mask, mask_pad }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    /// Echoes its input upper-cased and records every batch size.
    struct RecordingTranslator {
        calls: Vec<usize>,
    }

    impl Translator for RecordingTranslator {
        fn translate(&mut self, batch: &[String]) -> Result<Vec<String>> {
            self.calls.push(batch.len());
            Ok(batch.iter().map(|s| s.to_uppercase()).collect())
        }
    }

    struct DroppingTranslator;

    impl Translator for DroppingTranslator {
        fn translate(&mut self, batch: &[String]) -> Result<Vec<String>> {
            Ok(batch.iter().skip(1).cloned().collect())
        }
    }

    #[test]
    fn test_batch_ranges() {
        assert_eq!(batch_ranges(17, 16).unwrap(), vec![0..16, 16..17]);
        assert_eq!(batch_ranges(32, 16).unwrap(), vec![0..16, 16..32]);
        assert!(batch_ranges(0, 16).unwrap().is_empty());
        assert!(batch_ranges(5, 0).is_err());
    }

    #[test]
    fn test_seventeen_rows_make_two_calls() {
        let texts: Vec<String> = (0..17).map(|i| format!("row {i}")).collect();
        let mut t = RecordingTranslator { calls: Vec::new() };

        let out = translate_in_batches(&mut t, &texts, 16).unwrap();

        assert_eq!(t.calls, vec![16, 1]);
        assert_eq!(out.len(), 17);
        for (i, s) in out.iter().enumerate() {
            assert_eq!(s, &format!("ROW {i}"));
        }
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let texts = vec!["a".to_string(), "b".to_string()];
        assert!(translate_in_batches(&mut DroppingTranslator, &texts, 16).is_err());
    }

    #[test]
    fn test_token_batch_pads_to_longest() {
        let device  = Default::default();
        let batcher = TokenBatcher::<TestBackend>::new(device, 0);
        let batch   = batcher.batch(&[vec![5, 6, 7], vec![8]]);

        assert_eq!(batch.input_ids.dims(), [2, 3]);
        let ids: Vec<i64> = batch.input_ids.into_data().iter::<i64>().collect();
        assert_eq!(ids, vec![5, 6, 7, 8, 0, 0]);
        let mask: Vec<i64> = batch.attention_mask.into_data().iter::<i64>().collect();
        assert_eq!(mask, vec![1, 1, 1, 1, 0, 0]);
    }
}
