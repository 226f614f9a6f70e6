use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};

pub const DEFAULT_CONGESTION_THRESHOLD: u32 = 1;
pub const DEFAULT_RECOMMEND_LIMIT: usize = 5;

/// Construction-time settings for a [`FlowIndex`](crate::index::avl::FlowIndex).
///
/// ```toml
/// congestion_threshold = 1
/// recommend_limit = 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndexConfig {
    /// A node whose `|balance|` is strictly greater than this is congested.
    pub congestion_threshold: u32,
    /// Maximum number of alternatives returned by a query or a report.
    pub recommend_limit: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig::new()
    }
}

impl IndexConfig {
    pub fn new() -> Self {
        IndexConfig {
            congestion_threshold: DEFAULT_CONGESTION_THRESHOLD,
            recommend_limit: DEFAULT_RECOMMEND_LIMIT,
        }
    }

    pub fn with_congestion_threshold(mut self, threshold: u32) -> Self {
        self.congestion_threshold = threshold;
        self
    }

    pub fn with_recommend_limit(mut self, limit: usize) -> Self {
        self.recommend_limit = limit;
        self
    }

    pub fn from_toml_str(input: &str) -> ConfigResult<Self> {
        let config: IndexConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.recommend_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "recommend_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
