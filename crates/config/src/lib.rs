//! Configuration module for the screen recording compressor
//!
//! Handles loading configuration from TOML files, environment variable overrides,
//! and startup validation.

pub mod config;

pub use config::*;
