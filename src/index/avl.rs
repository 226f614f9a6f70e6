//! # Balanced Index
//!
//! An AVL tree of road entries ordered by their current flow (`weight`).
//! Several roads may carry the same flow; equal weights always descend to the
//! right on insert. After each insert the unwinding path is checked against the
//! configured congestion threshold and every congested node is handed to the
//! [`CongestionReporter`] together with the advisor's alternatives.

use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::mem;

use tracing::debug;

use crate::config::IndexConfig;
use super::advisor;
use super::reporter::{CongestionReport, CongestionReporter, TracingReporter};

type Link<K, W> = Option<Box<Node<K, W>>>;

struct Node<K, W> {
    key: K,
    weight: W,
    left: Link<K, W>,
    right: Link<K, W>,
    height: i32,
}

/// A `(key, weight)` pair as stored in the index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry<K, W> {
    pub key: K,
    pub weight: W,
}

impl<K, W> Entry<K, W> {
    pub fn new(key: K, weight: W) -> Self {
        Entry { key, weight }
    }
}

/// The four classical AVL restructurings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imbalance {
    LeftLeft,
    LeftRight,
    RightRight,
    RightLeft,
}

impl<K, W> Node<K, W> {
    fn new(key: K, weight: W) -> Self {
        Node {
            key,
            weight,
            left: None,
            right: None,
            height: 1,
        }
    }

    fn height(node: &Link<K, W>) -> i32 {
        node.as_ref().map_or(0, |n| n.height)
    }

    fn balance_factor(&self) -> i32 {
        Self::height(&self.left) - Self::height(&self.right)
    }

    fn update_height(&mut self) {
        self.height = 1 + std::cmp::max(Self::height(&self.left), Self::height(&self.right));
    }

    fn into_entry(self) -> Entry<K, W> {
        Entry {
            key: self.key,
            weight: self.weight,
        }
    }
}

/// Captured on the insert path before any rotation touches the node.
struct Congested<K, W> {
    key: K,
    weight: W,
    balance: i32,
}

pub struct FlowIndex<K, W> {
    root: Link<K, W>,
    size: usize,
    config: IndexConfig,
    reporter: Box<dyn CongestionReporter<K, W>>,
}

impl<K, W> Default for FlowIndex<K, W>
where
    K: Clone + Debug,
    W: Ord + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, W> FlowIndex<K, W>
where
    K: Clone + Debug,
    W: Ord + Clone + Debug,
{
    /// Creates an empty index with the default configuration, logging
    /// congestion through `tracing`.
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    pub fn with_config(config: IndexConfig) -> Self {
        Self::with_reporter(config, TracingReporter)
    }

    pub fn with_reporter<R>(config: IndexConfig, reporter: R) -> Self
    where
        R: CongestionReporter<K, W> + 'static,
    {
        FlowIndex {
            root: None,
            size: 0,
            config,
            reporter: Box::new(reporter),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Height of the whole tree; `0` when empty.
    pub fn height(&self) -> usize {
        Node::height(&self.root) as usize
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.size = 0;
    }

    /// Adds a road. Never fails; duplicates of an existing weight go right.
    pub fn add(&mut self, key: K, weight: W) {
        let probe = weight.clone();
        let mut congested = Vec::new();

        let new_root = {
            let old_root = self.root.take();
            self.insert_helper(old_root, Box::new(Node::new(key, weight)), &probe, &mut congested)
        };
        self.root = Some(new_root);
        self.size += 1;

        for node in congested {
            let alternatives = advisor::recommend(self, &node.weight, self.config.recommend_limit);
            self.reporter.report(&CongestionReport {
                key: node.key,
                weight: node.weight,
                balance: node.balance,
                alternatives,
            });
        }
    }

    fn insert_helper(
        &self,
        node: Link<K, W>,
        leaf: Box<Node<K, W>>,
        weight: &W,
        congested: &mut Vec<Congested<K, W>>,
    ) -> Box<Node<K, W>> {
        let mut node = match node {
            None => return leaf,
            Some(node) => node,
        };

        if *weight < node.weight {
            node.left = Some(self.insert_helper(node.left.take(), leaf, weight, congested));
        } else {
            node.right = Some(self.insert_helper(node.right.take(), leaf, weight, congested));
        }

        node.update_height();
        let balance = node.balance_factor();
        if balance.unsigned_abs() > self.config.congestion_threshold {
            congested.push(Congested {
                key: node.key.clone(),
                weight: node.weight.clone(),
                balance,
            });
        }

        match Self::insert_imbalance(&node, balance, weight) {
            Some(case) => Self::restructure(node, case),
            None => node,
        }
    }

    // The inserted weight picks the case: it tells which grandchild grew.
    fn insert_imbalance(node: &Node<K, W>, balance: i32, weight: &W) -> Option<Imbalance> {
        if balance > 1 {
            let left = node.left.as_ref()?;
            if *weight < left.weight {
                Some(Imbalance::LeftLeft)
            } else {
                Some(Imbalance::LeftRight)
            }
        } else if balance < -1 {
            let right = node.right.as_ref()?;
            if *weight >= right.weight {
                Some(Imbalance::RightRight)
            } else {
                Some(Imbalance::RightLeft)
            }
        } else {
            None
        }
    }

    /// Removes one road carrying `weight`, the one reached by plain BST
    /// descent. Returns `None` and leaves the tree untouched when absent.
    pub fn remove(&mut self, weight: &W) -> Option<Entry<K, W>> {
        let (new_root, removed) = {
            let old_root = self.root.take();
            Self::remove_recursive(old_root, weight)
        };
        self.root = new_root;
        if removed.is_some() {
            self.size -= 1;
        }
        removed
    }

    fn remove_recursive(node: Link<K, W>, weight: &W) -> (Link<K, W>, Option<Entry<K, W>>) {
        let mut node = match node {
            None => return (None, None),
            Some(node) => node,
        };

        let removed = match weight.cmp(&node.weight) {
            Ordering::Less => {
                let (new_left, removed) = Self::remove_recursive(node.left.take(), weight);
                node.left = new_left;
                removed
            }
            Ordering::Greater => {
                let (new_right, removed) = Self::remove_recursive(node.right.take(), weight);
                node.right = new_right;
                removed
            }
            Ordering::Equal => match (node.left.take(), node.right.take()) {
                (None, right) => return (right, Some(node.into_entry())),
                (left, None) => return (left, Some(node.into_entry())),
                (Some(left), Some(right)) => {
                    // Take over the successor's content, then drop its node.
                    let (new_right, successor) = Self::remove_min(right);
                    let successor = successor.into_entry();
                    let removed = Entry {
                        key: mem::replace(&mut node.key, successor.key),
                        weight: mem::replace(&mut node.weight, successor.weight),
                    };
                    node.left = Some(left);
                    node.right = new_right;
                    Some(removed)
                }
            },
        };

        (Some(Self::rebalance_after_delete(node)), removed)
    }

    /// Detaches the left-most node of `node`, rebalancing on the way up.
    fn remove_min(mut node: Box<Node<K, W>>) -> (Link<K, W>, Box<Node<K, W>>) {
        match node.left.take() {
            None => (node.right.take(), node),
            Some(left) => {
                let (new_left, min) = Self::remove_min(left);
                node.left = new_left;
                (Some(Self::rebalance_after_delete(node)), min)
            }
        }
    }

    fn rebalance_after_delete(mut node: Box<Node<K, W>>) -> Box<Node<K, W>> {
        node.update_height();
        let balance = node.balance_factor();
        match Self::delete_imbalance(&node, balance) {
            Some(case) => Self::restructure(node, case),
            None => node,
        }
    }

    // After a delete the child's own balance picks the case.
    fn delete_imbalance(node: &Node<K, W>, balance: i32) -> Option<Imbalance> {
        if balance > 1 {
            let left = node.left.as_ref()?;
            if left.balance_factor() >= 0 {
                Some(Imbalance::LeftLeft)
            } else {
                Some(Imbalance::LeftRight)
            }
        } else if balance < -1 {
            let right = node.right.as_ref()?;
            if right.balance_factor() <= 0 {
                Some(Imbalance::RightRight)
            } else {
                Some(Imbalance::RightLeft)
            }
        } else {
            None
        }
    }

    fn restructure(mut node: Box<Node<K, W>>, case: Imbalance) -> Box<Node<K, W>> {
        debug!(key = ?node.key, ?case, "rebalancing");
        match case {
            Imbalance::LeftLeft => Self::rotate_right(node),
            Imbalance::RightRight => Self::rotate_left(node),
            Imbalance::LeftRight => {
                node.left = node.left.take().map(Self::rotate_left);
                Self::rotate_right(node)
            }
            Imbalance::RightLeft => {
                node.right = node.right.take().map(Self::rotate_right);
                Self::rotate_left(node)
            }
        }
    }

    fn rotate_left(mut node: Box<Node<K, W>>) -> Box<Node<K, W>> {
        let mut new_root = match node.right.take() {
            Some(right) => right,
            None => return node,
        };
        debug!(from = ?node.key, to = ?new_root.key, "left rotation");
        node.right = new_root.left.take();
        node.update_height();
        new_root.left = Some(node);
        new_root.update_height();
        new_root
    }

    fn rotate_right(mut node: Box<Node<K, W>>) -> Box<Node<K, W>> {
        let mut new_root = match node.left.take() {
            Some(left) => left,
            None => return node,
        };
        debug!(from = ?node.key, to = ?new_root.key, "right rotation");
        node.left = new_root.right.take();
        node.update_height();
        new_root.right = Some(node);
        new_root.update_height();
        new_root
    }

    /// Up to the configured limit of roads lighter than `threshold`, lightest first.
    pub fn query_below(&self, threshold: &W) -> Vec<Entry<K, W>> {
        advisor::recommend(self, threshold, self.config.recommend_limit)
    }

    pub fn query_below_with_limit(&self, threshold: &W, limit: usize) -> Vec<Entry<K, W>> {
        advisor::recommend(self, threshold, limit)
    }

    /// The road with the lowest flow.
    pub fn min(&self) -> Option<Entry<K, W>> {
        self.root.as_deref().map(|node| {
            let min = find_min(node);
            Entry::new(min.key.clone(), min.weight.clone())
        })
    }

    pub fn get(&self, weight: &W) -> Option<Entry<K, W>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match weight.cmp(&node.weight) {
                Ordering::Equal => return Some(Entry::new(node.key.clone(), node.weight.clone())),
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
            }
        }
        None
    }

    pub fn contains_weight(&self, weight: &W) -> bool {
        self.get(weight).is_some()
    }

    /// Checks every structural invariant and panics on the first violation.
    /// A failure here is a bug in the rebalancing code; use it from tests.
    pub fn assert_invariants(&self) {
        fn check<K: Debug, W: Ord + Debug>(node: &Link<K, W>, count: &mut usize) -> i32 {
            let node = match node {
                None => return 0,
                Some(node) => node,
            };
            *count += 1;
            if let Some(left) = &node.left {
                assert!(left.weight <= node.weight, "left child {:?} heavier than {:?}", left.key, node.key);
            }
            if let Some(right) = &node.right {
                assert!(right.weight >= node.weight, "right child {:?} lighter than {:?}", right.key, node.key);
            }
            let left = check(&node.left, count);
            let right = check(&node.right, count);
            assert!((left - right).abs() <= 1, "node {:?} out of balance: {} vs {}", node.key, left, right);
            assert_eq!(node.height, 1 + left.max(right), "stale height at {:?}", node.key);
            node.height
        }

        let mut count = 0;
        check(&self.root, &mut count);
        assert_eq!(count, self.size, "size counter out of sync");

        let weights: Vec<&W> = self.iter().map(|(_, weight)| weight).collect();
        assert!(weights.windows(2).all(|w| w[0] <= w[1]), "in-order weights not sorted");
    }
}

impl<K, W> FlowIndex<K, W> {
    /// In-order traversal, ascending by weight.
    pub fn iter(&self) -> Iter<'_, K, W> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }

    /// Read-only view of the root node.
    pub fn root(&self) -> Option<NodeView<'_, K, W>> {
        self.root.as_deref().map(|node| NodeView { node })
    }
}

impl<K: Display, W: Display> FlowIndex<K, W> {
    /// `key:weight` pairs in order, separated by two spaces.
    pub fn inorder_string(&self) -> String {
        self.iter()
            .map(|(key, weight)| format!("{}:{}", key, weight))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Left-only descent to the lightest node of a subtree.
fn find_min<K, W>(node: &Node<K, W>) -> &Node<K, W> {
    let mut current = node;
    while let Some(left) = current.left.as_deref() {
        current = left;
    }
    current
}

pub struct Iter<'a, K, W> {
    stack: Vec<&'a Node<K, W>>,
}

impl<'a, K, W> Iter<'a, K, W> {
    fn push_left(&mut self, mut node: Option<&'a Node<K, W>>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, K, W> Iterator for Iter<'a, K, W> {
    type Item = (&'a K, &'a W);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some((&node.key, &node.weight))
    }
}

impl<'a, K, W> IntoIterator for &'a FlowIndex<K, W> {
    type Item = (&'a K, &'a W);
    type IntoIter = Iter<'a, K, W>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowed handle on one node, for inspecting the tree's shape.
pub struct NodeView<'a, K, W> {
    node: &'a Node<K, W>,
}

impl<K, W> Clone for NodeView<'_, K, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, W> Copy for NodeView<'_, K, W> {}

impl<'a, K, W> NodeView<'a, K, W> {
    pub fn key(&self) -> &'a K {
        &self.node.key
    }

    pub fn weight(&self) -> &'a W {
        &self.node.weight
    }

    /// 1-based subtree height; a leaf is `1`.
    pub fn height(&self) -> usize {
        self.node.height as usize
    }

    pub fn balance(&self) -> i32 {
        self.node.balance_factor()
    }

    pub fn left(&self) -> Option<NodeView<'a, K, W>> {
        self.node.left.as_deref().map(|node| NodeView { node })
    }

    pub fn right(&self) -> Option<NodeView<'a, K, W>> {
        self.node.right.as_deref().map(|node| NodeView { node })
    }

    pub fn is_leaf(&self) -> bool {
        self.node.left.is_none() && self.node.right.is_none()
    }
}
