// ============================================================
// Layer 5b — Translation Evaluation
// ============================================================
// Scores a candidate translation corpus against a reference
// corpus with three independent metrics:
//
//   bleu.rs     — corpus BLEU, 13a tokenisation      (0–100)
//   chrf.rs     — corpus chrF, character n-grams     (0–100)
//   meteor.rs   — mean sentence METEOR, word tokens  (0–1)
//
// All three are deterministic for fixed inputs.

pub mod tokenize;

pub mod bleu;

pub mod chrf;

pub mod meteor;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::PrepError;
use tokenize::Tokenizer13a;

/// The three scores for one candidate corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorpusScores {
    pub bleu:   f64,
    pub chrf:   f64,
    pub meteor: f64,
}

/// Truncate every list to the length of the shortest one,
/// keeping each list's leading entries.
pub fn truncate_to_common<T>(lists: &mut [Vec<T>]) -> usize {
    let min_len = lists.iter().map(Vec::len).min().unwrap_or(0);
    for list in lists.iter_mut() {
        list.truncate(min_len);
    }
    min_len
}

/// Score `hypotheses` against positionally aligned `references`.
pub fn score_corpus(
    hypotheses: &[String],
    references: &[String],
    tokenizer:  &Tokenizer13a,
) -> Result<CorpusScores> {
    if hypotheses.len() != references.len() {
        return Err(PrepError::LengthMismatch {
            expected: references.len(),
            actual:   hypotheses.len(),
        }
        .into());
    }

    let bleu = bleu::corpus_bleu(hypotheses, references, tokenizer);
    let chrf = chrf::corpus_chrf(hypotheses, references);

    let split = |s: &String| s.split_whitespace().map(str::to_string).collect::<Vec<_>>();
    let hyp_words: Vec<Vec<String>> = hypotheses.iter().map(split).collect();
    let ref_words: Vec<Vec<String>> = references.iter().map(split).collect();
    let meteor = meteor::average_meteor(&hyp_words, &ref_words)
        .ok_or_else(|| PrepError::EmptyInput("no aligned sentences to score".into()))?;

    Ok(CorpusScores { bleu, chrf, meteor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_common_length() {
        let mut lists = vec![
            (0..10).collect::<Vec<i32>>(),
            (0..8).collect::<Vec<i32>>(),
            (0..9).collect::<Vec<i32>>(),
        ];
        assert_eq!(truncate_to_common(&mut lists), 8);
        for list in &lists {
            assert_eq!(list, &(0..8).collect::<Vec<i32>>());
        }
    }

    #[test]
    fn test_perfect_translation_scores() {
        let tok = Tokenizer13a::new().unwrap();
        let s   = vec!["the cat sat".to_string()];
        let scores = score_corpus(&s, &s, &tok).unwrap();

        assert!((scores.bleu - 100.0).abs() < 1e-9);
        assert!(scores.chrf > 99.0);
        assert!(scores.meteor > 0.95);
    }

    #[test]
    fn test_scores_are_deterministic() {
        let tok  = Tokenizer13a::new().unwrap();
        let hyps = vec!["a small house".to_string(), "by the river".to_string()];
        let refs = vec!["a little house".to_string(), "near the river".to_string()];
        let a = score_corpus(&hyps, &refs, &tok).unwrap();
        let b = score_corpus(&hyps, &refs, &tok).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let tok = Tokenizer13a::new().unwrap();
        assert!(score_corpus(&[], &[], &tok).is_err());
    }
}
