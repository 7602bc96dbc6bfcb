//! Errors
//!
//! Custom error types used throughout the `entropy_tree` crate.
use thiserror::Error;

/// Errors that can occur while building, querying or persisting a decision tree.
#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    /// A tree can only be built from, or evaluated on, a non-empty dataset.
    #[error("The dataset is empty, at least one record is required.")]
    EmptyDataset,
    /// Records must all carry the same number of attributes.
    #[error("Record {index} has {found} attributes, but {expected} were expected.")]
    AttributeLengthMismatch { index: usize, expected: usize, found: usize },
    /// Only the labels 0 and 1 are supported.
    #[error("Record {index} has label {label}, expected 0 or 1.")]
    InvalidLabel { index: usize, label: usize },
    /// Missing values are not supported, NaN and infinite attributes are rejected.
    #[error("Record {index} has a NaN or infinite value for attribute {attribute}.")]
    NonFiniteValue { index: usize, attribute: usize },
    /// The query vector does not cover an attribute the tree splits on.
    #[error("Attribute {attribute} is out of range for a query with {length} attributes.")]
    OutOfRange { attribute: usize, length: usize },
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// Unable to write tree to file.
    #[error("Unable to write tree to file: {0}")]
    UnableToWrite(String),
    /// Unable to read tree from file.
    #[error("Unable to read tree from a file {0}")]
    UnableToRead(String),
}
