// ============================================================
// Layer 4 — Stratified Splitter
// ============================================================
// Splits row indices into disjoint partitions while keeping each
// label's share of the rows the same in every partition.
//
// One stage:
//   holdout size  = ceil(fraction × n), the rest is kept
//   per label     = the label's share of the holdout, floored,
//                   then leftover slots go to the labels with
//                   the largest fractional remainders
//   which rows    = each label's rows are shuffled with a
//                   ChaCha8 RNG seeded from the config
//
// Two stages give train / validation / test:
//   all     → train (70%) + holdout (30%)
//   holdout → validation (50%) + test (50%, takes the ceil)
//
// Every partition lists its rows in original order, and the same
// seed on the same labels always gives the same partitions.
//
// Reference: rand / rand_chacha crate documentation

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::domain::error::{PrepError, Result};

/// Fractions and seed for the two-stage split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Share of all rows moved out of training (0.3 → 70/30)
    pub holdout_fraction: f64,

    /// Share of the holdout that becomes the test set (0.5 → 15/15)
    pub test_fraction: f64,

    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            holdout_fraction: 0.3,
            test_fraction:    0.5,
            seed:             42,
        }
    }
}

/// Row indices of the three partitions, each ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train:      Vec<usize>,
    pub validation: Vec<usize>,
    pub test:       Vec<usize>,
}

/// Split `labels` into (kept, holdout) index lists.
pub fn stratified_split<K: Eq + Hash + Clone>(
    labels:   &[K],
    fraction: f64,
    seed:     u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(PrepError::InvalidConfig(format!(
            "split fraction {fraction} is outside [0, 1]"
        )));
    }

    let total = labels.len();
    if total == 0 {
        return Ok((Vec::new(), Vec::new()));
    }

    // Group row indices by label, in order of first appearance.
    let mut classes: Vec<(K, Vec<usize>)> = Vec::new();
    for (i, label) in labels.iter().enumerate() {
        match classes.iter_mut().find(|(k, _)| k == label) {
            Some((_, rows)) => rows.push(i),
            None            => classes.push((label.clone(), vec![i])),
        }
    }

    if classes.iter().any(|(_, rows)| rows.len() < 2) {
        tracing::warn!("A label has a single row; it cannot appear on both sides of the split");
    }

    let holdout_size = ceil_count(fraction, total);
    let counts: Vec<usize> = classes.iter().map(|(_, rows)| rows.len()).collect();
    let allocation = allocate(&counts, holdout_size);

    let mut rng     = ChaCha8Rng::seed_from_u64(seed);
    let mut kept    = Vec::with_capacity(total - holdout_size);
    let mut holdout = Vec::with_capacity(holdout_size);

    for ((_, mut rows), take) in classes.into_iter().zip(allocation) {
        rows.shuffle(&mut rng);
        holdout.extend_from_slice(&rows[..take]);
        kept.extend_from_slice(&rows[take..]);
    }

    kept.sort_unstable();
    holdout.sort_unstable();

    tracing::debug!(
        "Stratified split: {} kept, {} holdout",
        kept.len(),
        holdout.len()
    );

    Ok((kept, holdout))
}

/// Two-stage stratified split into train / validation / test.
pub fn split_three_way<K: Eq + Hash + Clone>(
    labels: &[K],
    config: &SplitConfig,
) -> Result<SplitIndices> {
    let (train, holdout) = stratified_split(labels, config.holdout_fraction, config.seed)?;

    let holdout_labels: Vec<K> = holdout.iter().map(|&i| labels[i].clone()).collect();
    let (val_pos, test_pos) = stratified_split(&holdout_labels, config.test_fraction, config.seed)?;

    // Positions within the holdout map back to original rows, still ascending.
    let validation = val_pos.into_iter().map(|p| holdout[p]).collect();
    let test       = test_pos.into_iter().map(|p| holdout[p]).collect();

    Ok(SplitIndices { train, validation, test })
}

// ceil(fraction × n), without float noise pushing an exact product up by one.
fn ceil_count(fraction: f64, n: usize) -> usize {
    let raw = fraction * n as f64;
    let nearest = raw.round();
    let size = if (raw - nearest).abs() < 1e-9 { nearest } else { raw.ceil() };
    (size as usize).min(n)
}

/// Share `target` slots across classes in proportion to `counts`.
///
/// Floors first, then hands the leftover slots to the largest remainders.
/// Ties go to the larger class, then to the class seen first.
fn allocate(counts: &[usize], target: usize) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| c as f64 * target as f64 / total as f64)
        .collect();
    let mut alloc: Vec<usize> = exact
        .iter()
        .zip(counts)
        .map(|(&e, &c)| (e.floor() as usize).min(c))
        .collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(counts[b].cmp(&counts[a]))
            .then(a.cmp(&b))
    });

    let mut remaining = target.saturating_sub(alloc.iter().sum());
    while remaining > 0 {
        let mut progressed = false;
        for &i in &order {
            if remaining == 0 {
                break;
            }
            if alloc[i] < counts[i] {
                alloc[i] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    alloc
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labels(counts: &[(i64, usize)]) -> Vec<i64> {
        // Interleave classes so order-preservation is visible
        let mut out = Vec::new();
        let max = counts.iter().map(|c| c.1).max().unwrap_or(0);
        for i in 0..max {
            for &(label, n) in counts {
                if i < n {
                    out.push(label);
                }
            }
        }
        out
    }

    #[test]
    fn test_correct_split_sizes() {
        let y = labels(&[(1, 50), (0, 30), (-1, 20)]);
        let s = split_three_way(&y, &SplitConfig::default()).unwrap();
        assert_eq!(s.train.len(), 70);
        assert_eq!(s.validation.len(), 15);
        assert_eq!(s.test.len(), 15);
    }

    #[test]
    fn test_partitions_disjoint_and_complete() {
        let y = labels(&[(1, 37), (0, 81), (-1, 9)]);
        let s = split_three_way(&y, &SplitConfig::default()).unwrap();

        let mut all: Vec<usize> = Vec::new();
        all.extend(&s.train);
        all.extend(&s.validation);
        all.extend(&s.test);
        let unique: HashSet<usize> = all.iter().copied().collect();

        assert_eq!(all.len(), y.len());
        assert_eq!(unique.len(), y.len());
    }

    #[test]
    fn test_sizes_within_one_row_of_target() {
        for n in [7usize, 10, 33, 101, 257] {
            let y: Vec<i64> = (0..n).map(|i| (i % 3) as i64 - 1).collect();
            let s = split_three_way(&y, &SplitConfig::default()).unwrap();
            let nf = n as f64;
            assert!((s.train.len() as f64 - 0.70 * nf).abs() <= 1.0, "n={n}");
            assert!((s.validation.len() as f64 - 0.15 * nf).abs() <= 1.0, "n={n}");
            assert!((s.test.len() as f64 - 0.15 * nf).abs() <= 1.0, "n={n}");
        }
    }

    #[test]
    fn test_same_seed_same_partitions() {
        let y = labels(&[(1, 40), (0, 40), (-1, 40)]);
        let a = split_three_way(&y, &SplitConfig::default()).unwrap();
        let b = split_three_way(&y, &SplitConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_changes_membership() {
        let y = labels(&[(1, 200), (0, 200)]);
        let a = split_three_way(&y, &SplitConfig::default()).unwrap();
        let b = split_three_way(&y, &SplitConfig { seed: 7, ..SplitConfig::default() }).unwrap();
        assert_ne!(a.test, b.test);
    }

    #[test]
    fn test_partitions_keep_original_order() {
        let y = labels(&[(1, 30), (0, 30)]);
        let s = split_three_way(&y, &SplitConfig::default()).unwrap();
        for part in [&s.train, &s.validation, &s.test] {
            assert!(part.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_class_proportions_preserved() {
        let y = labels(&[(1, 60), (0, 30), (-1, 10)]);
        let s = split_three_way(&y, &SplitConfig::default()).unwrap();

        for part in [&s.train, &s.validation, &s.test] {
            let size = part.len() as f64;
            for (label, full_share) in [(1i64, 0.6), (0, 0.3), (-1, 0.1)] {
                let count = part.iter().filter(|&&i| y[i] == label).count() as f64;
                // Rounding can move at most one row per class per stage
                assert!((count - full_share * size).abs() <= 2.0, "label {label}");
            }
        }
    }

    #[test]
    fn test_allocate_uses_largest_remainder() {
        // 3 slots over counts 5/3/2 (exact 1.5 / 0.9 / 0.6)
        assert_eq!(allocate(&[5, 3, 2], 3), vec![1, 1, 1]);
        assert_eq!(allocate(&[10, 10], 5), vec![3, 2]);
        assert_eq!(allocate(&[4], 4), vec![4]);
    }

    #[test]
    fn test_ceil_count_exact_products() {
        assert_eq!(ceil_count(0.3, 10), 3);
        assert_eq!(ceil_count(0.3, 11), 4);
        assert_eq!(ceil_count(0.5, 3), 2);
        assert_eq!(ceil_count(1.0, 5), 5);
    }

    #[test]
    fn test_empty_dataset() {
        let y: Vec<i64> = Vec::new();
        let s = split_three_way(&y, &SplitConfig::default()).unwrap();
        assert!(s.train.is_empty() && s.validation.is_empty() && s.test.is_empty());
    }

    #[test]
    fn test_rejects_bad_fraction() {
        assert!(stratified_split(&[1, 2], 1.5, 0).is_err());
    }
}
