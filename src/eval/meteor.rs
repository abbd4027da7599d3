// ============================================================
// Sentence METEOR
// ============================================================
// Alignment-based score for one hypothesis against one reference,
// both given as word lists:
//
//   1. Align words in two stages: exact (lower-cased) match,
//      then Snowball English stem match over the words left
//      unaligned. In each stage hypothesis words are taken last
//      to first; each takes the last still-free reference word
//      equal to it.
//   2. P = matches / hyp words, R = matches / ref words
//      Fmean = P·R / (α·P + (1-α)·R)
//   3. chunks = runs of matches adjacent in both sentences
//      penalty = γ · (chunks / matches)^β
//   4. METEOR = (1 - penalty) · Fmean                   (0–1)
//
// α = 0.9, β = 3, γ = 0.5
//
// Reference: Banerjee & Lavie (2005), METEOR
//            rust-stemmers (Snowball English)

use rust_stemmers::{Algorithm, Stemmer};

/// Weight of precision against recall in the harmonic mean
pub const ALPHA: f64 = 0.9;
/// Shape of the fragmentation penalty
pub const BETA: f64 = 3.0;
/// Maximum fragmentation penalty
pub const GAMMA: f64 = 0.5;

/// METEOR for one tokenised sentence pair.
pub fn sentence_meteor(hyp: &[String], reference: &[String]) -> f64 {
    let hyp: Vec<String> = hyp.iter().map(|w| w.to_lowercase()).collect();
    let reference: Vec<String> = reference.iter().map(|w| w.to_lowercase()).collect();

    let matches = align(&hyp, &reference, &Stemmer::create(Algorithm::English));
    if matches.is_empty() || hyp.is_empty() || reference.is_empty() {
        return 0.0;
    }

    let m         = matches.len() as f64;
    let precision = m / hyp.len() as f64;
    let recall    = m / reference.len() as f64;
    let fmean     = precision * recall / (ALPHA * precision + (1.0 - ALPHA) * recall);

    let frag    = count_chunks(&matches) as f64 / m;
    let penalty = GAMMA * frag.powf(BETA);

    (1.0 - penalty) * fmean
}

/// (hyp index, ref index) pairs, sorted by hyp index.
fn align(hyp: &[String], reference: &[String], stemmer: &Stemmer) -> Vec<(usize, usize)> {
    let mut hyp_used = vec![false; hyp.len()];
    let mut ref_used = vec![false; reference.len()];
    let mut matches  = Vec::new();

    match_stage(hyp, reference, &mut hyp_used, &mut ref_used, &mut matches);

    let stem = |words: &[String]| -> Vec<String> {
        words.iter().map(|w| stemmer.stem(w).into_owned()).collect()
    };
    match_stage(&stem(hyp), &stem(reference), &mut hyp_used, &mut ref_used, &mut matches);

    matches.sort_unstable();
    matches
}

fn match_stage(
    hyp:       &[String],
    reference: &[String],
    hyp_used:  &mut [bool],
    ref_used:  &mut [bool],
    matches:   &mut Vec<(usize, usize)>,
) {
    for i in (0..hyp.len()).rev() {
        if hyp_used[i] {
            continue;
        }
        if let Some(j) = (0..reference.len())
            .rev()
            .find(|&j| !ref_used[j] && reference[j] == hyp[i])
        {
            hyp_used[i] = true;
            ref_used[j] = true;
            matches.push((i, j));
        }
    }
}

fn count_chunks(matches: &[(usize, usize)]) -> usize {
    if matches.is_empty() {
        return 0;
    }
    1 + matches
        .windows(2)
        .filter(|w| !(w[1].0 == w[0].0 + 1 && w[1].1 == w[0].1 + 1))
        .count()
}

/// Arithmetic mean of sentence METEOR over aligned pairs.
/// Returns None for an empty corpus.
pub fn average_meteor(hypotheses: &[Vec<String>], references: &[Vec<String>]) -> Option<f64> {
    let scores: Vec<f64> = hypotheses
        .iter()
        .zip(references)
        .map(|(h, r)| sentence_meteor(h, r))
        .collect();

    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}
