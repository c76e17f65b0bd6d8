//! Application configuration module.
//!
//! Manages the TOML config file holding the TMDB API token, base URL
//! override, authentication scheme, and default response language.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, AuthScheme, TmdbConfig};
pub use paths::resolve_config_path;
