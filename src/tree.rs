use crate::config::{TreeConfig, TreeIO};
use crate::constants::PARALLEL_MIN_PARTITION;
use crate::data::Datum;
use crate::errors::TreeError;
use crate::metric::{mismatch_rate, ConfusionCounts};
use crate::node::{Node, NodeRecord};
use crate::splitter::SplitInfo;
use crate::utils::{majority_label, partition, pure_label};
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A binary classification tree.
///
/// Grown once from labeled records, then only queried. Two trees are
/// equal when their node structures are identical: same leaf labels,
/// same split attributes and exactly the same thresholds.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(try_from = "TreeRecord", into = "TreeRecord")]
pub struct DecisionTree {
    root: Node,
    min_split_size: usize,
}

/// Persisted layout of a tree, nodes are stored flat in pre-order.
#[derive(Deserialize, Serialize)]
pub struct TreeRecord {
    pub min_split_size: usize,
    pub nodes: Vec<NodeRecord>,
}

impl From<DecisionTree> for TreeRecord {
    fn from(tree: DecisionTree) -> Self {
        TreeRecord {
            min_split_size: tree.min_split_size,
            nodes: tree.root.to_records(),
        }
    }
}

impl TryFrom<TreeRecord> for DecisionTree {
    type Error = TreeError;

    fn try_from(record: TreeRecord) -> Result<Self, Self::Error> {
        Ok(DecisionTree {
            root: Node::from_records(&record.nodes)?,
            min_split_size: record.min_split_size,
        })
    }
}

impl TreeIO for DecisionTree {}

impl PartialEq for DecisionTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl DecisionTree {
    /// Fit a tree with the default configuration.
    ///
    /// * `data` - Labeled training records.
    /// * `min_split_size` - Partitions with fewer records become a majority-label leaf.
    pub fn new(data: &[Datum], min_split_size: usize) -> Result<Self, TreeError> {
        TreeConfig::default().set_min_split_size(min_split_size).fit(data)
    }

    /// Grow a tree from records that already passed validation.
    pub(crate) fn grow(config: &TreeConfig, data: &[Datum], n_attributes: usize) -> Result<Self, TreeError> {
        let grower = Grower { config, n_attributes };
        let root = Node::from_records(&grower.grow(data))?;
        info!(
            "Fitted tree on {} records, {} nodes, {} leaves, depth {}.",
            data.len(),
            root.n_nodes(),
            root.n_leaves(),
            root.depth()
        );
        Ok(DecisionTree {
            root,
            min_split_size: config.min_split_size,
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn min_split_size(&self) -> usize {
        self.min_split_size
    }

    /// Predict the label of a single record.
    ///
    /// * `row` - Attribute values of the record.
    pub fn classify(&self, row: &[f64]) -> Result<usize, TreeError> {
        self.root.classify(row)
    }

    fn predict_single_threaded(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, TreeError> {
        rows.iter().map(|row| self.classify(row)).collect()
    }

    fn predict_parallel(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, TreeError> {
        rows.par_iter().map(|row| self.classify(row)).collect()
    }

    /// Predict the label of many records.
    ///
    /// * `rows` - Attribute values, one vector per record.
    /// * `parallel` - Classify records on the rayon thread pool.
    pub fn predict(&self, rows: &[Vec<f64>], parallel: bool) -> Result<Vec<usize>, TreeError> {
        if parallel {
            self.predict_parallel(rows)
        } else {
            self.predict_single_threaded(rows)
        }
    }

    /// Share of records the tree labels incorrectly, in `[0, 1]`.
    pub fn check_performance(&self, data: &[Datum]) -> Result<f64, TreeError> {
        mismatch_rate(self, data)
    }

    /// Prediction outcomes on labeled records, with 1 as the positive label.
    pub fn confusion_counts(&self, data: &[Datum]) -> Result<ConfusionCounts, TreeError> {
        ConfusionCounts::from_tree(self, data)
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    pub fn n_nodes(&self) -> usize {
        self.root.n_nodes()
    }

    /// The shortest query length that can be classified along every path.
    pub fn required_attributes(&self) -> usize {
        self.root.max_feature().map_or(0, |f| f + 1)
    }
}

impl Display for DecisionTree {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut r = String::new();
        for node in self.root.to_records() {
            r += format!("{}{}\n", "      ".repeat(node.depth).as_str(), node).as_str();
        }
        write!(f, "{}", r)
    }
}

/// Partitioning of the training records, one level of the tree at a time.
struct Grower<'a> {
    config: &'a TreeConfig,
    n_attributes: usize,
}

/// A node waiting to be split, along with the records that reach it.
struct SplittableNode<'d> {
    num: usize,
    depth: usize,
    data: Vec<&'d Datum>,
}

enum Growth<'d> {
    Leaf(usize),
    Split(SplitInfo, Vec<&'d Datum>, Vec<&'d Datum>),
}

impl Grower<'_> {
    /// Grow the whole tree and return its nodes as flat records,
    /// children are always numbered after their parent.
    fn grow<'d>(&self, data: &'d [Datum]) -> Vec<NodeRecord> {
        let mut records = vec![NodeRecord::leaf(0, 0, 0)];
        let mut growable = vec![SplittableNode {
            num: 0,
            depth: 0,
            data: data.iter().collect(),
        }];
        while !growable.is_empty() {
            let n_records: usize = growable.iter().map(|node| node.data.len()).sum();
            let growth: Vec<Growth<'d>> = if self.config.parallel && n_records >= PARALLEL_MIN_PARTITION {
                growable.par_iter().map(|node| self.split_node(node)).collect()
            } else {
                growable.iter().map(|node| self.split_node(node)).collect()
            };

            let mut next = Vec::new();
            for (node, growth) in growable.iter().zip(growth) {
                match growth {
                    Growth::Leaf(label) => records[node.num].label = label,
                    Growth::Split(split, left, right) => {
                        let left_num = records.len();
                        let right_num = left_num + 1;
                        records.push(NodeRecord::leaf(left_num, node.depth + 1, 0));
                        records.push(NodeRecord::leaf(right_num, node.depth + 1, 0));
                        records[node.num].make_parent_node(split.split_feature, split.split_value, left_num, right_num);
                        next.push(SplittableNode {
                            num: left_num,
                            depth: node.depth + 1,
                            data: left,
                        });
                        next.push(SplittableNode {
                            num: right_num,
                            depth: node.depth + 1,
                            data: right,
                        });
                    }
                }
            }
            growable = next;
        }
        records
    }

    fn split_node<'d>(&self, node: &SplittableNode<'d>) -> Growth<'d> {
        let (data, depth) = (&node.data, node.depth);
        if data.len() < self.config.min_split_size {
            return Growth::Leaf(majority_label(data.iter().copied()));
        }
        if let Some(label) = pure_label(data) {
            return Growth::Leaf(label);
        }

        let split = match self.config.split_search.best_split(data, self.n_attributes) {
            Some(split) => split,
            None => {
                warn!(
                    "No attribute to split {} records on at depth {}, using majority label.",
                    data.len(),
                    depth
                );
                return Growth::Leaf(majority_label(data.iter().copied()));
            }
        };
        let (left, right) = partition(data, split.split_feature, split.split_value);
        // A split leaving one side empty would grow the same records forever.
        if left.is_empty() || right.is_empty() {
            warn!(
                "Unable to separate {} records at depth {}, using majority label.",
                data.len(),
                depth
            );
            return Growth::Leaf(majority_label(data.iter().copied()));
        }
        debug!(
            "Split {} records at depth {} on [{} < {}], entropy {}, {} left, {} right.",
            data.len(),
            depth,
            split.split_feature,
            split.split_value,
            split.split_entropy,
            left.len(),
            right.len()
        );
        Growth::Split(split, left, right)
    }
}
