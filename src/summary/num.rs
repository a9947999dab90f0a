use std::collections::BTreeMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use super::is_false;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberSummary {
    pub freq: u64,
    pub unique: u64,
    #[serde(skip_serializing_if = "is_false")]
    pub all_ints: bool,
    pub min: f64,
    pub max: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub distribution: Vec<BucketRange>,
}

/// Run of consecutive distinct values and how many samples fell in it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketRange {
    pub from: f64,
    pub to: f64,
    pub freq: u64,
}

pub fn summarize_numbers(samples: &[f64], bucket_count: usize) -> NumberSummary {
    let Some(&first) = samples.first() else {
        return NumberSummary::default();
    };
    let mut min = first;
    let mut max = first;
    let mut all_ints = true;
    let mut counts: BTreeMap<OrderedFloat<f64>, u64> = BTreeMap::new();
    for &x in samples {
        min = min.min(x);
        max = max.max(x);
        all_ints &= x == x.trunc();
        *counts.entry(OrderedFloat(x)).or_default() += 1;
    }
    let distinct: Vec<(f64, u64)> = counts.into_iter().map(|(v, n)| (v.0, n)).collect();

    NumberSummary {
        freq: samples.len() as u64,
        unique: distinct.len() as u64,
        all_ints,
        min,
        max,
        distribution: bucketize(&distinct, bucket_count),
    }
}

/// Split ascending `(value, count)` pairs into equal-sized runs by rank.
///
/// The bucket count is clamped to the number of distinct values; the last
/// run absorbs the remainder when the split is uneven.
pub fn bucketize(distinct: &[(f64, u64)], bucket_count: usize) -> Vec<BucketRange> {
    if bucket_count <= 1 || distinct.is_empty() {
        return Vec::new();
    }
    let buckets = bucket_count.min(distinct.len());
    let step = distinct.len() / buckets;

    (0..buckets)
        .map(|b| {
            let start = b * step;
            let end = if b + 1 == buckets { distinct.len() } else { start + step };
            let run = &distinct[start..end];
            BucketRange {
                from: run[0].0,
                to: run[run.len() - 1].0,
                freq: run.iter().map(|(_, n)| n).sum(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(from: f64, to: f64, freq: u64) -> BucketRange {
        BucketRange { from, to, freq }
    }

    #[test]
    fn fractional_numbers() {
        let got = summarize_numbers(&[1.0, 1.1], 2);
        assert_eq!(got, NumberSummary {
            freq: 2,
            unique: 2,
            all_ints: false,
            min: 1.0,
            max: 1.1,
            distribution: vec![range(1.0, 1.0, 1), range(1.1, 1.1, 1)],
        });
    }

    #[test]
    fn repeated_ints() {
        let got = summarize_numbers(&[1.0, 2.0, 2.0], 2);
        assert!(got.all_ints);
        assert_eq!(got.freq, 3);
        assert_eq!(got.unique, 2);
        assert_eq!(got.distribution, vec![range(1.0, 1.0, 1), range(2.0, 2.0, 2)]);
    }

    #[test]
    fn single_sample_gets_single_bucket() {
        let got = summarize_numbers(&[2.43], 2);
        assert!(!got.all_ints);
        assert_eq!((got.min, got.max, got.unique), (2.43, 2.43, 1));
        assert_eq!(got.distribution, vec![range(2.43, 2.43, 1)]);
    }

    #[test]
    fn even_split_by_rank() {
        let xs: Vec<f64> = (1..=9).map(f64::from).collect();
        let got = summarize_numbers(&xs, 3);
        assert_eq!(got.distribution, vec![
            range(1.0, 3.0, 3),
            range(4.0, 6.0, 3),
            range(7.0, 9.0, 3),
        ]);
    }

    #[test]
    fn skewed_data_clamps_to_distinct_values() {
        let xs = [1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0, 9.0];
        let got = summarize_numbers(&xs, 10);
        assert_eq!((got.freq, got.unique, got.min, got.max), (9, 4, 1.0, 9.0));
        assert_eq!(got.distribution, vec![
            range(1.0, 1.0, 3),
            range(2.0, 2.0, 3),
            range(3.0, 3.0, 2),
            range(9.0, 9.0, 1),
        ]);

        let got = summarize_numbers(&xs, 2);
        assert_eq!(got.distribution, vec![range(1.0, 2.0, 6), range(3.0, 9.0, 3)]);
    }

    #[test]
    fn last_bucket_absorbs_remainder() {
        let xs = [5.0, 1.0, 4.0, 2.0, 3.0];
        let got = summarize_numbers(&xs, 2);
        assert_eq!(got.distribution, vec![range(1.0, 2.0, 2), range(3.0, 5.0, 3)]);
    }

    #[test]
    fn single_bucket_target_disables_distribution() {
        assert!(summarize_numbers(&[1.0, 2.0], 1).distribution.is_empty());
        assert!(summarize_numbers(&[1.0, 2.0], 0).distribution.is_empty());
    }

    #[test]
    fn negative_and_zero() {
        let got = summarize_numbers(&[-3.0, 0.0, -0.5], 10);
        assert_eq!((got.min, got.max), (-3.0, 0.0));
        assert!(!got.all_ints);
        assert_eq!(got.distribution.first().map(|b| b.from), Some(-3.0));
    }

    #[test]
    fn empty_input_is_default() {
        assert_eq!(summarize_numbers(&[], 4), NumberSummary::default());
    }
}
