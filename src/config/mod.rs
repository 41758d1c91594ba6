//! Configuration module for Threadget
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and the policy that turns requested worker and
//! concurrency counts into effective ones.
//!
//! # Example
//!
//! ```no_run
//! use threadget::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("threadget.toml")).unwrap();
//! println!("Polling every {}ms", config.engine.retry_delay);
//! ```

mod limits;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, EngineConfig, OutputConfig, ParserConfig, ThreadConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub use limits::{detected_cpu_count, resolve_pool, PoolSize, MAX_WORKERS};
