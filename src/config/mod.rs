pub mod config;
pub mod error;

pub use config::IndexConfig;
pub use error::{ConfigError, ConfigResult};
