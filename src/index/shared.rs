//! # Shared Index
//!
//! The index itself assumes one owner running each operation to completion.
//! `SharedIndex` gives a multi-threaded host that model: readers share the
//! lock, every mutation takes it exclusively for its whole duration.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use super::avl::{Entry, FlowIndex};

pub struct SharedIndex<K, W> {
    inner: Arc<RwLock<FlowIndex<K, W>>>,
}

impl<K, W> Clone for SharedIndex<K, W> {
    fn clone(&self) -> Self {
        SharedIndex {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, W> SharedIndex<K, W>
where
    K: Clone + Debug,
    W: Ord + Clone + Debug,
{
    pub fn new(index: FlowIndex<K, W>) -> Self {
        SharedIndex {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    pub fn add(&self, key: K, weight: W) {
        self.inner.write().add(key, weight);
    }

    pub fn remove(&self, weight: &W) -> Option<Entry<K, W>> {
        self.inner.write().remove(weight)
    }

    pub fn query_below(&self, threshold: &W) -> Vec<Entry<K, W>> {
        self.inner.read().query_below(threshold)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Runs `f` under the shared lock.
    pub fn read<R>(&self, f: impl FnOnce(&FlowIndex<K, W>) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` under the exclusive lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut FlowIndex<K, W>) -> R) -> R {
        f(&mut self.inner.write())
    }
}
