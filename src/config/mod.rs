//! Configuration module for the preview pipeline
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; the defaults are the reference pipeline settings
//! (queue of 100, 2 workers, 30s per task, 5 minute retry interval, 3 retries).
//!
//! # Example
//!
//! ```no_run
//! use preview_pipeline::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("pipeline.toml")).unwrap();
//! println!("Queue capacity: {}", config.pipeline.queue_capacity);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, HttpConfig, PipelineConfig, StorageConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
