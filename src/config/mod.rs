//! Configuration management for murmur.
//!
//! Loads application configuration from a TOML file in the user's config directory.

pub mod file;

pub use file::{get_config_path, MurmurConfig};
