// ============================================================
// Corpus BLEU
// ============================================================
// Precision-oriented n-gram overlap between a hypothesis corpus
// and a single-reference corpus, compatible with sacreBLEU:
//
//   precision_n = clipped matching n-grams / hypothesis n-grams
//                 (summed over the whole corpus, n = 1..4)
//   BP          = exp(1 - ref_len / hyp_len)  if hyp_len < ref_len
//   BLEU        = BP × geometric mean of precision_n   (0–100)
//
// An order with hypothesis n-grams but no matches is smoothed
// ("exp" smoothing): its precision becomes 100 / (2^k × total).
// Orders with no hypothesis n-grams at all (every sentence too
// short) are left out of the geometric mean.

use std::collections::HashMap;

use crate::eval::tokenize::Tokenizer13a;

pub const MAX_ORDER: usize = 4;

/// Sufficient statistics for corpus BLEU.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BleuStats {
    pub correct: [usize; MAX_ORDER],
    pub total:   [usize; MAX_ORDER],
    pub hyp_len: usize,
    pub ref_len: usize,
}

impl BleuStats {
    /// Accumulate one sentence pair.
    pub fn add(&mut self, hyp: &[String], reference: &[String]) {
        self.hyp_len += hyp.len();
        self.ref_len += reference.len();

        for n in 1..=MAX_ORDER {
            let hyp_counts = ngram_counts(hyp, n);
            let ref_counts = ngram_counts(reference, n);

            for (gram, count) in &hyp_counts {
                let available = ref_counts.get(gram).copied().unwrap_or(0);
                self.correct[n - 1] += (*count).min(available);
            }
            self.total[n - 1] += hyp.len().saturating_sub(n - 1);
        }
    }

    /// Final score on a 0–100 scale.
    pub fn score(&self) -> f64 {
        let mut precisions = [0.0f64; MAX_ORDER];
        let mut smooth     = 1.0f64;
        let mut order      = 0;

        for n in 0..MAX_ORDER {
            if self.total[n] == 0 {
                break;
            }
            order = n + 1;
            precisions[n] = if self.correct[n] == 0 {
                smooth *= 2.0;
                100.0 / (smooth * self.total[n] as f64)
            } else {
                100.0 * self.correct[n] as f64 / self.total[n] as f64
            };
        }

        if order == 0 {
            return 0.0;
        }

        let bp = if self.hyp_len < self.ref_len {
            if self.hyp_len == 0 {
                0.0
            } else {
                (1.0 - self.ref_len as f64 / self.hyp_len as f64).exp()
            }
        } else {
            1.0
        };

        let log_mean = precisions[..order].iter().map(|p| p.ln()).sum::<f64>() / order as f64;
        bp * log_mean.exp()
    }
}

fn ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if tokens.len() >= n {
        for gram in tokens.windows(n) {
            *counts.entry(gram).or_insert(0) += 1;
        }
    }
    counts
}

/// Corpus BLEU of `hypotheses` against positionally aligned `references`.
pub fn corpus_bleu(hypotheses: &[String], references: &[String], tokenizer: &Tokenizer13a) -> f64 {
    let mut stats = BleuStats::default();
    for (hyp, reference) in hypotheses.iter().zip(references) {
        stats.add(&tokenizer.tokenize(hyp), &tokenizer.tokenize(reference));
    }
    stats.score()
}
