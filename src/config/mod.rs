// src/config/mod.rs

//! Configuration loading and validation for igniter.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load and discover a config file on disk (`loader.rs`).
//! - Validate the task tree's structural rules (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{CONFIG_FILE_NAME, find_config_path, load_and_validate, load_from_path};
pub use model::{CommandList, ConfigFile, RawConfigFile, RawTaskNode, SettingsSection};
pub use validate::validate_config;
