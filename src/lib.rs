//! An in-memory road-flow index.
//!
//! Roads are kept in an AVL tree ordered by their current flow. Inserting a
//! road that leaves a node more unbalanced than the configured threshold
//! raises a congestion notice listing lighter alternative roads.

pub mod config;
pub mod index;

pub use config::{ConfigError, ConfigResult, IndexConfig};
pub use index::advisor::recommend;
pub use index::avl::{Entry, FlowIndex, Imbalance, Iter, NodeView};
pub use index::reporter::{CongestionReport, CongestionReporter, FnReporter, SilentReporter, TracingReporter};
pub use index::shared::SharedIndex;
