//! Application configuration module.
//!
//! Manages the TOML config file holding endpoint URLs, the catalog
//! language and the response cache policy.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, parse_base_url};
pub use paths::resolve_config_path;
