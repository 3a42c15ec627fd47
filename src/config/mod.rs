//! Configuration module for Pocket-Clipper
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Without a file, [`Config::default`] is used.
//!
//! # Example
//!
//! ```no_run
//! use pocket_clipper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("clipper.toml")).unwrap();
//! println!("Writing clippings under: {}", config.output.base_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
