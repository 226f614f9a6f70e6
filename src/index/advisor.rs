//! # Congestion Advisor
//!
//! Suggests lighter roads when part of the index becomes congested. The
//! advisor walks the whole tree; it runs only when a congestion notice fires
//! or when a caller asks for it directly, so the scan stays off the hot path.

use super::avl::{Entry, FlowIndex, NodeView};

/// Collects every entry lighter than `threshold`, lightest first, keeping at
/// most `limit` of them.
///
/// Roads sharing a weight keep the order in which a pre-order walk meets them.
pub fn recommend<K, W>(index: &FlowIndex<K, W>, threshold: &W, limit: usize) -> Vec<Entry<K, W>>
where
    K: Clone,
    W: Ord + Clone,
{
    if limit == 0 {
        return Vec::new();
    }

    let mut alternatives = Vec::new();
    let mut pending: Vec<NodeView<'_, K, W>> = index.root().into_iter().collect();
    while let Some(node) = pending.pop() {
        if node.weight() < threshold {
            alternatives.push(Entry::new(node.key().clone(), node.weight().clone()));
        }
        pending.extend(node.right());
        pending.extend(node.left());
    }

    alternatives.sort_by(|a, b| a.weight.cmp(&b.weight));
    alternatives.truncate(limit);
    alternatives
}
