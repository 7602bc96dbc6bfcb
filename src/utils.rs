use crate::data::Datum;
use std::borrow::Borrow;

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

/// Count the records of each label.
///
/// Labels must already be validated to be 0 or 1.
pub fn label_counts<I>(data: I) -> [usize; 2]
where
    I: IntoIterator,
    I::Item: Borrow<Datum>,
{
    let mut counts = [0_usize; 2];
    for d in data {
        let y = d.borrow().y;
        debug_assert!(y <= 1, "label {} is not 0 or 1", y);
        if y == 0 {
            counts[0] += 1;
        } else {
            counts[1] += 1;
        }
    }
    counts
}

/// Shannon entropy (base 2) of a label distribution.
///
/// An empty distribution has an entropy of 0, labels that
/// never occur contribute nothing.
#[inline]
pub fn entropy_from_counts(counts: [usize; 2]) -> f64 {
    let total = counts[0] + counts[1];
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    counts
        .iter()
        .filter(|c| **c > 0)
        .map(|c| {
            let p = *c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Shannon entropy (base 2) of the labels in a set of records.
pub fn entropy<I>(data: I) -> f64
where
    I: IntoIterator,
    I::Item: Borrow<Datum>,
{
    entropy_from_counts(label_counts(data))
}

/// Entropy of the two sides of a split, each weighted by its share of the records.
///
/// Every split search funnels through here, so identical counts always
/// produce bit-identical scores regardless of how they were gathered.
#[inline]
pub fn weighted_entropy(left: [usize; 2], right: [usize; 2]) -> f64 {
    let n_left = left[0] + left[1];
    let n_right = right[0] + right[1];
    let total = (n_left + n_right) as f64;
    if total == 0.0 {
        return 0.0;
    }
    entropy_from_counts(right) * n_right as f64 / total + entropy_from_counts(left) * n_left as f64 / total
}

/// The most frequent label, ties go to 0.
#[inline]
pub fn majority_from_counts(counts: [usize; 2]) -> usize {
    if counts[0] >= counts[1] {
        0
    } else {
        1
    }
}

/// The most frequent label in a set of records, ties go to 0.
pub fn majority_label<I>(data: I) -> usize
where
    I: IntoIterator,
    I::Item: Borrow<Datum>,
{
    majority_from_counts(label_counts(data))
}

/// The label shared by every record, if there is one.
pub fn pure_label(data: &[&Datum]) -> Option<usize> {
    let first = data.first()?.y;
    if data.iter().all(|d| d.y == first) {
        Some(first)
    } else {
        None
    }
}

/// Split records on an attribute, values strictly below the threshold go left.
/// Relative order is preserved on both sides.
pub fn partition<'a>(data: &[&'a Datum], split_feature: usize, split_value: f64) -> (Vec<&'a Datum>, Vec<&'a Datum>) {
    data.iter().copied().partition(|d| d.x[split_feature] < split_value)
}

#[cfg(test)]
pub(crate) fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}
