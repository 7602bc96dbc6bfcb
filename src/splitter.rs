use crate::data::Datum;
use crate::errors::TreeError;
use crate::utils::{items_to_strings, label_counts, weighted_entropy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The best split found for a set of records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitInfo {
    /// Attribute the records are split on.
    pub split_feature: usize,
    /// Records with `x[split_feature] < split_value` go left, all others go right.
    pub split_value: f64,
    /// Weighted entropy of the two sides.
    pub split_entropy: f64,
}

impl Default for SplitInfo {
    fn default() -> Self {
        SplitInfo {
            split_feature: 0,
            split_value: 0.0,
            split_entropy: f64::MAX,
        }
    }
}

impl SplitInfo {
    /// Replace this split if the candidate is strictly better.
    /// Equal candidates never replace an earlier one.
    #[inline]
    fn update(&mut self, split_feature: usize, split_value: f64, split_entropy: f64) {
        if split_entropy < self.split_entropy {
            self.split_feature = split_feature;
            self.split_value = split_value;
            self.split_entropy = split_entropy;
        }
    }
}

/// Search strategy for the best split.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitSearch {
    /// Try every record's value of every attribute as a threshold.
    #[default]
    Exhaustive,
    /// Sort each attribute once and sweep the distinct values.
    Sorted,
}

impl FromStr for SplitSearch {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Exhaustive" => Ok(SplitSearch::Exhaustive),
            "Sorted" => Ok(SplitSearch::Sorted),
            _ => Err(TreeError::ParseString(
                s.to_string(),
                "SplitSearch".to_string(),
                items_to_strings(vec!["Exhaustive", "Sorted"]),
            )),
        }
    }
}

impl SplitSearch {
    pub fn best_split(&self, data: &[&Datum], n_attributes: usize) -> Option<SplitInfo> {
        match self {
            SplitSearch::Exhaustive => ExhaustiveSplitter.best_split(data, n_attributes),
            SplitSearch::Sorted => SortedSplitter.best_split(data, n_attributes),
        }
    }
}

/// Splitter trait, finds the attribute and threshold that minimize
/// the weighted entropy of the two resulting partitions.
///
/// Candidates are ranked in attribute order first and record order
/// second, the first candidate reaching the minimum wins. Every
/// implementation must return the same split for the same records.
pub trait Splitter {
    /// Find the best split, `None` if there is nothing to split on.
    ///
    /// * `data` - The records to split.
    /// * `n_attributes` - Number of attributes of every record.
    fn best_split(&self, data: &[&Datum], n_attributes: usize) -> Option<SplitInfo>;
}

/// Reference splitter, scores every record's value as a threshold
/// by re-partitioning the full set of records.
/// Runs in `O(n_attributes * n^2)`.
pub struct ExhaustiveSplitter;

impl Splitter for ExhaustiveSplitter {
    fn best_split(&self, data: &[&Datum], n_attributes: usize) -> Option<SplitInfo> {
        if data.is_empty() || n_attributes == 0 {
            return None;
        }
        let mut best = SplitInfo::default();
        for feature in 0..n_attributes {
            for candidate in data {
                let threshold = candidate.x[feature];
                let left = label_counts(data.iter().copied().filter(|d| d.x[feature] < threshold));
                let right = label_counts(data.iter().copied().filter(|d| d.x[feature] >= threshold));
                best.update(feature, threshold, weighted_entropy(left, right));
            }
        }
        Some(best)
    }
}

/// Sweep splitter, sorts each attribute once and scores every distinct
/// value from running label counts.
/// Runs in `O(n_attributes * n log n)`.
///
/// When distinct values score the same, the one that appears first in
/// the records wins, so the result matches [`ExhaustiveSplitter`].
pub struct SortedSplitter;

impl Splitter for SortedSplitter {
    fn best_split(&self, data: &[&Datum], n_attributes: usize) -> Option<SplitInfo> {
        if data.is_empty() || n_attributes == 0 {
            return None;
        }
        let totals = label_counts(data.iter().copied());
        let mut order: Vec<usize> = (0..data.len()).collect();
        let mut best = SplitInfo::default();

        for feature in 0..n_attributes {
            let value = |i: usize| data[i].x[feature];
            order.sort_unstable_by(|a, b| value(*a).total_cmp(&value(*b)));

            // (entropy, first record index, threshold) of the best value for this attribute.
            let mut feature_best: Option<(f64, usize, f64)> = None;
            let mut left = [0_usize; 2];
            let mut start = 0;
            while start < order.len() {
                let v = value(order[start]);
                let mut end = start;
                let mut first = order[start];
                let mut group = [0_usize; 2];
                // Group on `==` rather than bit equality so -0.0 and 0.0 fall together,
                // the same way the `<` partition treats them.
                while end < order.len() && value(order[end]) == v {
                    first = first.min(order[end]);
                    group[usize::from(data[order[end]].y != 0)] += 1;
                    end += 1;
                }
                let right = [totals[0] - left[0], totals[1] - left[1]];
                let e = weighted_entropy(left, right);
                let replace = match feature_best {
                    None => true,
                    Some((best_e, best_first, _)) => e < best_e || (e == best_e && first < best_first),
                };
                if replace {
                    feature_best = Some((e, first, value(first)));
                }
                left[0] += group[0];
                left[1] += group[1];
                start = end;
            }

            if let Some((e, _, threshold)) = feature_best {
                best.update(feature, threshold, e);
            }
        }
        Some(best)
    }
}
