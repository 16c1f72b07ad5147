//! Configuration and filesystem helpers shared by the garg binary and TUI.

pub mod config;
pub mod paths;

pub use config::{CONFIG_PATH_ENV, ConfigError, GargConfig, default_config_path};
pub use paths::{app_cache_dir, app_config_dir, expand_tilde};
