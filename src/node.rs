use crate::errors::TreeError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::mem;

/// A vertex of the decision tree.
///
/// Every internal node owns both of its children, a leaf owns none.
/// Walks over the hierarchy use an explicit stack, so a tree as deep
/// as its training set is still safe to query, compare, copy and drop.
#[derive(Debug)]
pub enum Node {
    /// Terminal node carrying the predicted label.
    Leaf { label: usize },
    /// Decision node, records with `x[split_feature] < split_value` travel left.
    Internal {
        split_feature: usize,
        split_value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn leaf(label: usize) -> Self {
        Node::Leaf { label }
    }

    pub fn internal(split_feature: usize, split_value: f64, left: Node, right: Node) -> Self {
        Node::Internal {
            split_feature,
            split_value,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Walk down from this node to a leaf and return its label.
    pub fn classify(&self, row: &[f64]) -> Result<usize, TreeError> {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { label } => return Ok(*label),
                Node::Internal {
                    split_feature,
                    split_value,
                    left,
                    right,
                } => {
                    let v = row.get(*split_feature).ok_or(TreeError::OutOfRange {
                        attribute: *split_feature,
                        length: row.len(),
                    })?;
                    node = if v < split_value { left.as_ref() } else { right.as_ref() };
                }
            }
        }
    }

    /// Visit this node and everything below it in pre-order, along with
    /// the depth of each node relative to this one.
    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![(self, 0)],
        }
    }

    /// Number of edges on the longest path to a leaf.
    pub fn depth(&self) -> usize {
        self.pre_order().map(|(_, depth)| depth).max().unwrap_or(0)
    }

    pub fn n_leaves(&self) -> usize {
        self.pre_order().filter(|(node, _)| node.is_leaf()).count()
    }

    pub fn n_nodes(&self) -> usize {
        self.pre_order().count()
    }

    /// Largest attribute index referenced below this node.
    pub fn max_feature(&self) -> Option<usize> {
        self.pre_order()
            .filter_map(|(node, _)| match node {
                Node::Leaf { .. } => None,
                Node::Internal { split_feature, .. } => Some(*split_feature),
            })
            .max()
    }

    /// Same label for leaves, same attribute and threshold for internal nodes.
    fn same_decision(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Leaf { label: a }, Node::Leaf { label: b }) => a == b,
            (
                Node::Internal {
                    split_feature: fa,
                    split_value: va,
                    ..
                },
                Node::Internal {
                    split_feature: fb,
                    split_value: vb,
                    ..
                },
            ) => fa == fb && va == vb,
            _ => false,
        }
    }

    /// Flatten the nodes in pre-order, the root is node 0.
    pub fn to_records(&self) -> Vec<NodeRecord> {
        let mut records: Vec<NodeRecord> = Vec::new();
        // Right children wait on the stack along with the number of their parent.
        let mut stack: Vec<(&Node, usize, Option<usize>)> = vec![(self, 0, None)];
        while let Some((node, depth, parent)) = stack.pop() {
            let num = records.len();
            if let Some(parent) = parent {
                records[parent].right_child = num;
            }
            match node {
                Node::Leaf { label } => records.push(NodeRecord::leaf(num, depth, *label)),
                Node::Internal {
                    split_feature,
                    split_value,
                    left,
                    right,
                } => {
                    let mut record = NodeRecord::leaf(num, depth, 0);
                    record.make_parent_node(*split_feature, *split_value, num + 1, num);
                    records.push(record);
                    stack.push((right.as_ref(), depth + 1, Some(num)));
                    stack.push((left.as_ref(), depth + 1, None));
                }
            }
        }
        records
    }

    /// Rebuild a node hierarchy from flat records, the root is node 0.
    ///
    /// Children must come after their parent and belong to a single
    /// parent, so a malformed layout is rejected rather than looping.
    /// Records are assembled from the last one backwards.
    pub fn from_records(records: &[NodeRecord]) -> Result<Node, TreeError> {
        if records.is_empty() {
            return Err(TreeError::UnableToRead("tree has no nodes".to_string()));
        }
        let mut built: Vec<Option<Node>> = Vec::with_capacity(records.len());
        built.resize_with(records.len(), || None);
        for (num, record) in records.iter().enumerate().rev() {
            let node = if record.is_leaf {
                if record.label > 1 {
                    return Err(TreeError::UnableToRead(format!("node {} has label {}", num, record.label)));
                }
                Node::leaf(record.label)
            } else {
                if record.left_child <= num || record.right_child <= num {
                    return Err(TreeError::UnableToRead(format!(
                        "node {} points back to an earlier node",
                        num
                    )));
                }
                let left = take_built(&mut built, record.left_child)?;
                let right = take_built(&mut built, record.right_child)?;
                Node::internal(record.split_feature, record.split_value, left, right)
            };
            built[num] = Some(node);
        }
        take_built(&mut built, 0)
    }

    /// Move internal children onto `stack`, leaving leaves in their place.
    fn detach_children(&mut self, stack: &mut Vec<Box<Node>>) {
        if let Node::Internal { left, right, .. } = self {
            for child in [left, right] {
                if !child.is_leaf() {
                    stack.push(mem::replace(child, Box::new(Node::leaf(0))));
                }
            }
        }
    }
}

fn take_built(built: &mut [Option<Node>], num: usize) -> Result<Node, TreeError> {
    built
        .get_mut(num)
        .and_then(Option::take)
        .ok_or_else(|| TreeError::UnableToRead(format!("node {} does not exist or has two parents", num)))
}

impl Drop for Node {
    fn drop(&mut self) {
        let mut stack = Vec::new();
        self.detach_children(&mut stack);
        while let Some(mut node) = stack.pop() {
            node.detach_children(&mut stack);
        }
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        match Node::from_records(&self.to_records()) {
            Ok(node) => node,
            Err(e) => unreachable!("pre-order records always rebuild: {}", e),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        // Every internal node has exactly two children, so the pre-order
        // sequence of decisions determines the shape.
        let mut a = self.pre_order();
        let mut b = other.pre_order();
        loop {
            match (a.next(), b.next()) {
                (None, None) => return true,
                (Some((x, _)), Some((y, _))) if x.same_decision(y) => continue,
                _ => return false,
            }
        }
    }
}

/// Pre-order iterator over a node hierarchy, see [`Node::pre_order`].
pub struct PreOrder<'a> {
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (&'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        if let Node::Internal { left, right, .. } = node {
            self.stack.push((right.as_ref(), depth + 1));
            self.stack.push((left.as_ref(), depth + 1));
        }
        Some((node, depth))
    }
}

/// Flat form of a node, used when a tree is persisted.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct NodeRecord {
    pub num: usize,
    pub depth: usize,
    pub is_leaf: bool,
    pub label: usize,
    pub split_feature: usize,
    pub split_value: f64,
    pub left_child: usize,
    pub right_child: usize,
}

impl NodeRecord {
    pub(crate) fn leaf(num: usize, depth: usize, label: usize) -> Self {
        NodeRecord {
            num,
            depth,
            is_leaf: true,
            label,
            split_feature: 0,
            split_value: 0.0,
            left_child: 0,
            right_child: 0,
        }
    }

    pub(crate) fn make_parent_node(&mut self, split_feature: usize, split_value: f64, left_child: usize, right_child: usize) {
        self.is_leaf = false;
        self.split_feature = split_feature;
        self.split_value = split_value;
        self.left_child = left_child;
        self.right_child = right_child;
    }
}

impl Display for NodeRecord {
    // This trait requires `fmt` with this exact signature.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_leaf {
            write!(f, "{}:leaf={}", self.num, self.label)
        } else {
            write!(
                f,
                "{}:[{} < {}] yes={},no={}",
                self.num, self.split_feature, self.split_value, self.left_child, self.right_child
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> Node {
        Node::internal(0, 5.0, Node::leaf(0), Node::leaf(1))
    }

    #[test]
    fn test_classify() {
        let node = stump();
        assert_eq!(Ok(0), node.classify(&[3.0]));
        assert_eq!(Ok(1), node.classify(&[5.0]));
        assert_eq!(Ok(1), node.classify(&[5.5]));
    }

    #[test]
    fn test_classify_out_of_range() {
        let node = Node::internal(0, 5.0, Node::leaf(0), Node::internal(2, 1.0, Node::leaf(0), Node::leaf(1)));
        assert_eq!(
            Err(TreeError::OutOfRange { attribute: 2, length: 1 }),
            node.classify(&[6.0])
        );
        // The left path never reads attribute 2.
        assert_eq!(Ok(0), node.classify(&[1.0]));
    }

    #[test]
    fn test_structure() {
        let node = Node::internal(1, 2.0, stump(), Node::leaf(1));
        assert_eq!(2, node.depth());
        assert_eq!(3, node.n_leaves());
        assert_eq!(5, node.n_nodes());
        assert_eq!(Some(1), node.max_feature());
        assert_eq!(None, Node::leaf(0).max_feature());
        assert!(!node.is_leaf());
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(stump(), stump().clone());
        assert_ne!(stump(), Node::internal(0, 5.5, Node::leaf(0), Node::leaf(1)));
        assert_ne!(stump(), Node::internal(1, 5.0, Node::leaf(0), Node::leaf(1)));
        assert_ne!(stump(), Node::internal(0, 5.0, Node::leaf(1), Node::leaf(1)));
        assert_ne!(Node::leaf(0), Node::leaf(1));
        assert_ne!(Node::leaf(0), stump());
    }

    #[test]
    fn test_records() {
        let node = Node::internal(1, 2.0, stump(), Node::leaf(1));
        let records = node.to_records();
        assert_eq!(5, records.len());
        assert_eq!((1, 4), (records[0].left_child, records[0].right_child));
        assert_eq!((2, 3), (records[1].left_child, records[1].right_child));
        assert_eq!(2, records[3].depth);
        assert_eq!("0:[1 < 2] yes=1,no=4", records[0].to_string());
        assert_eq!("4:leaf=1", records[4].to_string());
        assert_eq!(Ok(node), Node::from_records(&records));
    }

    #[test]
    fn test_records_cycle() {
        let mut records = stump().to_records();
        records[0].right_child = 0;
        assert!(Node::from_records(&records).is_err());
        assert!(Node::from_records(&[]).is_err());
        let mut records = stump().to_records();
        records[2].label = 3;
        assert!(Node::from_records(&records).is_err());
        let mut records = stump().to_records();
        records[0].right_child = 1;
        assert!(Node::from_records(&records).is_err());
        let mut records = stump().to_records();
        records[0].right_child = 7;
        assert!(Node::from_records(&records).is_err());
    }

    #[test]
    fn test_records_breadth_first() {
        // Any layout with children after their parent is accepted.
        let mut records = vec![
            NodeRecord::leaf(0, 0, 0),
            NodeRecord::leaf(1, 1, 1),
            NodeRecord::leaf(2, 1, 0),
            NodeRecord::leaf(3, 2, 0),
            NodeRecord::leaf(4, 2, 1),
        ];
        records[0].make_parent_node(1, 2.0, 2, 1);
        records[2].make_parent_node(0, 5.0, 3, 4);
        let expected = Node::internal(1, 2.0, stump(), Node::leaf(1));
        assert_eq!(Ok(expected), Node::from_records(&records));
    }

    fn right_spine(n: usize) -> Node {
        let mut node = Node::leaf(1);
        for i in (0..n).rev() {
            node = Node::internal(0, i as f64, Node::leaf(0), node);
        }
        node
    }

    #[test]
    fn test_deep_spine() {
        let n = 300_000;
        let node = right_spine(n);
        assert_eq!(n, node.depth());
        assert_eq!(2 * n + 1, node.n_nodes());
        assert_eq!(n + 1, node.n_leaves());
        assert_eq!(Some(0), node.max_feature());
        assert_eq!(Ok(1), node.classify(&[n as f64]));
        assert_eq!(Ok(0), node.classify(&[-1.0]));

        let records = node.to_records();
        assert_eq!(2 * n + 1, records.len());
        assert_eq!((1, 2), (records[0].left_child, records[0].right_child));
        let rebuilt = Node::from_records(&records).unwrap();
        assert_eq!(node, rebuilt);
        assert_eq!(node, node.clone());
        assert_ne!(node, right_spine(n - 1));
    }
}
