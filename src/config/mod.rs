//! Configuration management.

mod settings;

pub use settings::{Config, StorageConfig};
