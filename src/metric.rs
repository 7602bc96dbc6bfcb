use crate::data::{validate_dataset, Datum};
use crate::errors::TreeError;
use crate::tree::DecisionTree;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub type MetricFn = fn(&[usize], &[usize]) -> f64;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    MismatchRate,
    Accuracy,
}

impl FromStr for Metric {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MismatchRate" => Ok(Metric::MismatchRate),
            "Accuracy" => Ok(Metric::Accuracy),

            _ => Err(TreeError::ParseString(
                s.to_string(),
                "Metric".to_string(),
                items_to_strings(vec!["MismatchRate", "Accuracy"]),
            )),
        }
    }
}

pub fn metric_callables(metric_type: &Metric) -> MetricFn {
    match metric_type {
        Metric::MismatchRate => MismatchRateMetric::calculate_metric,
        Metric::Accuracy => AccuracyMetric::calculate_metric,
    }
}

impl Metric {
    /// Score a fitted tree on labeled records.
    pub fn evaluate(&self, tree: &DecisionTree, data: &[Datum]) -> Result<f64, TreeError> {
        let (y, yhat) = labels_and_predictions(tree, data)?;
        Ok(metric_callables(self)(&y, &yhat))
    }
}

pub trait EvaluationMetric {
    fn calculate_metric(y: &[usize], yhat: &[usize]) -> f64;
}

pub struct MismatchRateMetric {}
impl EvaluationMetric for MismatchRateMetric {
    fn calculate_metric(y: &[usize], yhat: &[usize]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        let mismatches = y.iter().zip(yhat).filter(|(y_, yhat_)| y_ != yhat_).count();
        mismatches as f64 / y.len() as f64
    }
}

pub struct AccuracyMetric {}
impl EvaluationMetric for AccuracyMetric {
    fn calculate_metric(y: &[usize], yhat: &[usize]) -> f64 {
        if y.is_empty() {
            return 0.0;
        }
        1.0 - MismatchRateMetric::calculate_metric(y, yhat)
    }
}

/// Classify every record, leaving both the tree and the records untouched.
fn labels_and_predictions(tree: &DecisionTree, data: &[Datum]) -> Result<(Vec<usize>, Vec<usize>), TreeError> {
    validate_dataset(data)?;
    let y: Vec<usize> = data.iter().map(|d| d.y).collect();
    let yhat = data.iter().map(|d| tree.classify(&d.x)).collect::<Result<Vec<usize>, TreeError>>()?;
    Ok((y, yhat))
}

/// Share of records whose predicted label differs from the true label.
pub fn mismatch_rate(tree: &DecisionTree, data: &[Datum]) -> Result<f64, TreeError> {
    Metric::MismatchRate.evaluate(tree, data)
}

/// Prediction outcomes, with 1 as the positive label.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfusionCounts {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
}

impl ConfusionCounts {
    pub fn from_labels(y: &[usize], yhat: &[usize]) -> Self {
        let mut counts = ConfusionCounts::default();
        for (y_, yhat_) in y.iter().zip(yhat) {
            match (*y_ != 0, *yhat_ != 0) {
                (true, true) => counts.true_positive += 1,
                (false, true) => counts.false_positive += 1,
                (false, false) => counts.true_negative += 1,
                (true, false) => counts.false_negative += 1,
            }
        }
        counts
    }

    pub fn from_tree(tree: &DecisionTree, data: &[Datum]) -> Result<Self, TreeError> {
        let (y, yhat) = labels_and_predictions(tree, data)?;
        Ok(ConfusionCounts::from_labels(&y, &yhat))
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_positive + self.true_negative + self.false_negative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::precision_round;

    fn stump_data() -> Vec<Datum> {
        vec![
            Datum::new(vec![1.0], 0),
            Datum::new(vec![2.0], 0),
            Datum::new(vec![5.0], 1),
            Datum::new(vec![6.0], 1),
        ]
    }

    #[test]
    fn test_mismatch_rate_metric() {
        let y = vec![0, 1, 1, 0, 1, 1];
        let yhat = vec![0, 1, 0, 0, 0, 1];
        assert_eq!(0.333, precision_round(MismatchRateMetric::calculate_metric(&y, &yhat), 3));
        assert_eq!(0.667, precision_round(AccuracyMetric::calculate_metric(&y, &yhat), 3));
    }

    #[test]
    fn test_mismatch_rate() {
        let tree = DecisionTree::new(&stump_data(), 1).unwrap();
        let eval = vec![
            Datum::new(vec![1.5], 0),
            Datum::new(vec![5.5], 0),
            Datum::new(vec![3.0], 1),
            Datum::new(vec![9.0], 1),
        ];
        assert_eq!(Ok(0.5), mismatch_rate(&tree, &eval));
        assert_eq!(Ok(0.5), Metric::Accuracy.evaluate(&tree, &eval));
        assert_eq!(Ok(0.0), mismatch_rate(&tree, &stump_data()));
        assert_eq!(Err(TreeError::EmptyDataset), mismatch_rate(&tree, &[]));
    }

    #[test]
    fn test_confusion_counts() {
        let tree = DecisionTree::new(&stump_data(), 1).unwrap();
        let eval = vec![
            Datum::new(vec![1.5], 0),
            Datum::new(vec![5.5], 0),
            Datum::new(vec![3.0], 1),
            Datum::new(vec![9.0], 1),
            Datum::new(vec![8.0], 1),
        ];
        let counts = tree.confusion_counts(&eval).unwrap();
        assert_eq!(
            ConfusionCounts {
                true_positive: 2,
                false_positive: 1,
                true_negative: 1,
                false_negative: 1
            },
            counts
        );
        assert_eq!(5, counts.total());
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(Metric::Accuracy, "Accuracy".parse::<Metric>().unwrap());
        assert!("AUC".parse::<Metric>().is_err());
    }
}
