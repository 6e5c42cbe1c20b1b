// src/config/mod.rs

//! Configuration loading and validation for pollwatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like poll interval and glob syntax (`validate.rs`).
//! - Merge CLI flags over the file into effective settings (`resolve.rs`).

pub mod loader;
pub mod model;
pub mod resolve;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, ListenerSection, RawConfigFile, WatchEntry};
pub use resolve::Settings;
pub use validate::validate_config;
