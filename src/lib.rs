//! Binary classification decision trees.
//!
//! Trees are grown greedily: each partition of the training records is
//! split on the attribute and threshold that minimize the weighted
//! entropy of the two sides, until partitions are pure, too small to
//! split, or cannot be separated any further.
//!
//! ```
//! use entropy_tree::{Datum, DecisionTree};
//!
//! let data = vec![
//!     Datum::new(vec![1.0], 0),
//!     Datum::new(vec![2.0], 0),
//!     Datum::new(vec![5.0], 1),
//!     Datum::new(vec![6.0], 1),
//! ];
//! let tree = DecisionTree::new(&data, 1).unwrap();
//! assert_eq!(tree.classify(&[3.0]).unwrap(), 0);
//! assert_eq!(tree.classify(&[5.5]).unwrap(), 1);
//! ```

// Modules
pub mod config;
pub mod constants;
pub mod data;
pub mod errors;
pub mod metric;
pub mod node;
pub mod splitter;
pub mod tree;
pub mod utils;

// Individual classes, and functions
pub use config::{TreeConfig, TreeIO};
pub use data::Datum;
pub use errors::TreeError;
pub use node::Node;
pub use splitter::SplitSearch;
pub use tree::DecisionTree;
