use crate::errors::TreeError;
use serde::{Deserialize, Serialize};

/// A single labeled record.
///
/// Holds an ordered vector of continuous attributes along with the
/// binary class label (0 or 1) the record belongs to. Records are
/// immutable once built, the tree only ever borrows them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Datum {
    /// Attribute values, indexed positionally.
    pub x: Vec<f64>,
    /// Class label.
    pub y: usize,
}

impl Datum {
    /// Create a new record.
    ///
    /// * `x` - Attribute values.
    /// * `y` - Class label, only 0 and 1 are accepted when training.
    pub fn new(x: Vec<f64>, y: usize) -> Self {
        Datum { x, y }
    }

    /// Number of attributes in this record.
    pub fn n_attributes(&self) -> usize {
        self.x.len()
    }
}

/// Check that a dataset can be used for training or evaluation.
///
/// The dataset must be non-empty, every record must have the same
/// number of attributes as the first one, labels must be 0 or 1 and
/// every attribute must be finite. Returns the number of attributes.
pub fn validate_dataset(data: &[Datum]) -> Result<usize, TreeError> {
    let first = data.first().ok_or(TreeError::EmptyDataset)?;
    let expected = first.n_attributes();
    for (index, d) in data.iter().enumerate() {
        if d.n_attributes() != expected {
            return Err(TreeError::AttributeLengthMismatch {
                index,
                expected,
                found: d.n_attributes(),
            });
        }
        if d.y > 1 {
            return Err(TreeError::InvalidLabel { index, label: d.y });
        }
        if let Some(attribute) = d.x.iter().position(|v| !v.is_finite()) {
            return Err(TreeError::NonFiniteValue { index, attribute });
        }
    }
    Ok(expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dataset() {
        let data = vec![Datum::new(vec![1.0, 2.0], 0), Datum::new(vec![3.0, 4.0], 1)];
        assert_eq!(validate_dataset(&data), Ok(2));
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(validate_dataset(&[]), Err(TreeError::EmptyDataset));
    }

    #[test]
    fn test_validate_length_mismatch() {
        let data = vec![
            Datum::new(vec![1.0, 2.0], 0),
            Datum::new(vec![3.0, 4.0], 1),
            Datum::new(vec![3.0], 1),
        ];
        assert_eq!(
            validate_dataset(&data),
            Err(TreeError::AttributeLengthMismatch {
                index: 2,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_validate_bad_label() {
        let data = vec![Datum::new(vec![1.0], 0), Datum::new(vec![3.0], 2)];
        assert_eq!(
            validate_dataset(&data),
            Err(TreeError::InvalidLabel { index: 1, label: 2 })
        );
    }

    #[test]
    fn test_validate_non_finite() {
        let data = vec![Datum::new(vec![1.0, f64::NAN], 0)];
        assert_eq!(
            validate_dataset(&data),
            Err(TreeError::NonFiniteValue { index: 0, attribute: 1 })
        );
        let data = vec![Datum::new(vec![1.0], 0), Datum::new(vec![f64::INFINITY], 1)];
        assert_eq!(
            validate_dataset(&data),
            Err(TreeError::NonFiniteValue { index: 1, attribute: 0 })
        );
    }
}
