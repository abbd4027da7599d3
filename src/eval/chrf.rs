//! Corpus chrF: character n-gram F-score (orders 1–6, beta = 2).
//!
//! Whitespace is removed before n-grams are extracted. Statistics are
//! summed over the corpus; precision and recall are averaged over the
//! orders both sides actually have, then combined as an F-beta score.

use std::collections::HashMap;

pub const CHAR_ORDER: usize = 6;
pub const BETA: f64 = 2.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct OrderStats {
    hyp:       usize,
    reference: usize,
    matched:   usize,
}

/// Accumulated chrF statistics for a corpus.
#[derive(Debug, Clone, Default)]
pub struct ChrfStats {
    orders: [OrderStats; CHAR_ORDER],
}

impl ChrfStats {
    pub fn add(&mut self, hyp: &str, reference: &str) {
        let hyp: Vec<char> = hyp.chars().filter(|c| !c.is_whitespace()).collect();
        let reference: Vec<char> = reference.chars().filter(|c| !c.is_whitespace()).collect();

        for n in 1..=CHAR_ORDER {
            let h = char_ngrams(&hyp, n);
            let r = char_ngrams(&reference, n);
            let stats = &mut self.orders[n - 1];

            stats.hyp       += h.values().sum::<usize>();
            stats.reference += r.values().sum::<usize>();
            stats.matched   += h
                .iter()
                .map(|(gram, count)| (*count).min(r.get(gram).copied().unwrap_or(0)))
                .sum::<usize>();
        }
    }

    /// Final score on a 0–100 scale.
    pub fn score(&self) -> f64 {
        let factor = BETA * BETA;
        let mut avg_prec  = 0.0;
        let mut avg_rec   = 0.0;
        let mut effective = 0usize;

        for stats in &self.orders {
            if stats.hyp > 0 && stats.reference > 0 {
                avg_prec += stats.matched as f64 / stats.hyp as f64;
                avg_rec  += stats.matched as f64 / stats.reference as f64;
                effective += 1;
            }
        }

        if effective == 0 {
            return 0.0;
        }
        avg_prec /= effective as f64;
        avg_rec  /= effective as f64;

        if avg_prec + avg_rec == 0.0 {
            return 0.0;
        }
        100.0 * (1.0 + factor) * avg_prec * avg_rec / (factor * avg_prec + avg_rec)
    }
}

fn char_ngrams(chars: &[char], n: usize) -> HashMap<&[char], usize> {
    let mut counts = HashMap::new();
    if chars.len() >= n {
        for gram in chars.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

/// Corpus chrF of `hypotheses` against positionally aligned `references`.
pub fn corpus_chrf(hypotheses: &[String], references: &[String]) -> f64 {
    let mut stats = ChrfStats::default();
    for (hyp, reference) in hypotheses.iter().zip(references) {
        stats.add(hyp, reference);
    }
    stats.score()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrf(h: &str, r: &str) -> f64 {
        corpus_chrf(&[h.to_string()], &[r.to_string()])
    }

    #[test]
    fn test_identical_is_maximal() {
        assert!((chrf("the cat sat", "the cat sat") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert!((chrf("thecat sat", "the cat  sat") - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_overlap_is_between() {
        let s = chrf("the cat sat", "the dog sat");
        assert!(s > 0.0 && s < 100.0, "score was {s}");
    }

    #[test]
    fn test_no_overlap_is_zero() {
        assert_eq!(chrf("xyz", "abc"), 0.0);
    }

    #[test]
    fn test_empty_corpus_is_zero() {
        assert_eq!(corpus_chrf(&[], &[]), 0.0);
    }
}
