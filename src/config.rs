//! Tree Configuration
//!
//! Defines the parameters used to grow a decision tree, and the
//! JSON persistence shared by the configuration and fitted trees.
use crate::constants::DEFAULT_MIN_SPLIT_SIZE;
use crate::data::{validate_dataset, Datum};
use crate::errors::TreeError;
use crate::splitter::SplitSearch;
use crate::tree::DecisionTree;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters used to grow a tree.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TreeConfig {
    /// Partitions with fewer records than this become a majority-label leaf.
    #[serde(default = "default_min_split_size")]
    pub min_split_size: usize,
    /// How the best split is searched for.
    #[serde(default)]
    pub split_search: SplitSearch,
    /// Search the splits of each tree level on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
}

fn default_min_split_size() -> usize {
    DEFAULT_MIN_SPLIT_SIZE
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            min_split_size: DEFAULT_MIN_SPLIT_SIZE,
            split_search: SplitSearch::Exhaustive,
            parallel: false,
        }
    }
}

impl TreeConfig {
    /// Set the minimum split size.
    /// * `min_split_size` - Partitions smaller than this are not split any further,
    ///   they become a leaf labeled with their majority label.
    pub fn set_min_split_size(mut self, min_split_size: usize) -> Self {
        self.min_split_size = min_split_size;
        self
    }

    /// Set the split search strategy.
    /// * `split_search` - Both strategies pick the same splits, `Sorted` is faster on larger partitions.
    pub fn set_split_search(mut self, split_search: SplitSearch) -> Self {
        self.split_search = split_search;
        self
    }

    /// Set whether each tree level is grown in parallel.
    /// * `parallel` - The fitted tree is the same either way.
    pub fn set_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fit a decision tree.
    ///
    /// * `data` - Labeled training records, all with the same number of attributes.
    pub fn fit(&self, data: &[Datum]) -> Result<DecisionTree, TreeError> {
        let n_attributes = validate_dataset(data)?;
        DecisionTree::grow(self, data, n_attributes)
    }
}

/// JSON persistence.
pub trait TreeIO: Serialize + DeserializeOwned + Sized {
    /// Save as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), TreeError> {
        fs::write(path, self.json_dump()?).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object
    fn json_dump(&self) -> Result<String, TreeError> {
        serde_json::to_string(self).map_err(|e| TreeError::UnableToWrite(e.to_string()))
    }

    /// Load from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, TreeError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| TreeError::UnableToRead(e.to_string()))
    }

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load<P: AsRef<Path>>(path: P) -> Result<Self, TreeError> {
        let json_str = fs::read_to_string(path).map_err(|e| TreeError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl TreeIO for TreeConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters() {
        let config = TreeConfig::default()
            .set_min_split_size(4)
            .set_split_search(SplitSearch::Sorted)
            .set_parallel(true);
        assert_eq!(4, config.min_split_size);
        assert_eq!(SplitSearch::Sorted, config.split_search);
        assert!(config.parallel);
    }

    #[test]
    fn test_config_json() {
        let config = TreeConfig::default().set_split_search(SplitSearch::Sorted);
        let json = config.json_dump().unwrap();
        assert_eq!(config, TreeConfig::from_json(&json).unwrap());
    }

    #[test]
    fn test_config_json_defaults() {
        let config = TreeConfig::from_json(r#"{"parallel": true}"#).unwrap();
        assert_eq!(DEFAULT_MIN_SPLIT_SIZE, config.min_split_size);
        assert_eq!(SplitSearch::Exhaustive, config.split_search);
        assert!(config.parallel);
    }

    #[test]
    fn test_config_save_load() {
        let path = std::env::temp_dir().join("entropy_tree_config.json");
        let config = TreeConfig::default().set_min_split_size(3);
        config.save(&path).unwrap();
        assert_eq!(config, TreeConfig::load(&path).unwrap());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_fit_rejects_bad_data() {
        let config = TreeConfig::default();
        assert_eq!(Err(TreeError::EmptyDataset), config.fit(&[]));
        let data = vec![Datum::new(vec![1.0], 0), Datum::new(vec![2.0], 3)];
        assert_eq!(Err(TreeError::InvalidLabel { index: 1, label: 3 }), config.fit(&data));
    }
}
