//! Side channel for congestion notices raised while inserting.

use std::fmt::Debug;

use tracing::{info, warn};

use super::avl::Entry;

/// A node found congested on an insert path, with the advisor's suggestions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CongestionReport<K, W> {
    pub key: K,
    pub weight: W,
    /// Balance factor measured before any rotation.
    pub balance: i32,
    pub alternatives: Vec<Entry<K, W>>,
}

pub trait CongestionReporter<K, W>: Send + Sync {
    fn report(&self, report: &CongestionReport<K, W>);
}

/// Emits congestion notices as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl<K: Debug, W: Debug> CongestionReporter<K, W> for TracingReporter {
    fn report(&self, report: &CongestionReport<K, W>) {
        warn!(
            road = ?report.key,
            flow = ?report.weight,
            balance = report.balance,
            alternatives = report.alternatives.len(),
            "road congested"
        );
        for alternative in &report.alternatives {
            info!(road = ?alternative.key, flow = ?alternative.weight, "alternative route");
        }
    }
}

/// Drops every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl<K, W> CongestionReporter<K, W> for SilentReporter {
    fn report(&self, _report: &CongestionReport<K, W>) {}
}

/// Adapts a closure into a reporter.
pub struct FnReporter<F>(pub F);

impl<K, W, F> CongestionReporter<K, W> for FnReporter<F>
where
    F: Fn(&CongestionReport<K, W>) + Send + Sync,
{
    fn report(&self, report: &CongestionReport<K, W>) {
        (self.0)(report)
    }
}
