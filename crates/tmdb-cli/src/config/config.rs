//! `AppConfig` struct and TOML read/write.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TMDB API settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

/// TMDB API configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbConfig {
    /// API read access token or API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// How the token is sent.
    #[serde(default)]
    pub auth_scheme: AuthScheme,
    /// Default response language (e.g. "ja-JP").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Authentication scheme for the configured token.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`.
    #[default]
    Bearer,
    /// `Authorization: <api key>`.
    ApiKey,
}

impl AuthScheme {
    /// Returns the name used by `--auth-scheme` and `config.toml`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bearer => "bearer",
            Self::ApiKey => "api-key",
        }
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

impl TmdbConfig {
    /// Resolves the API token, preferring `env_token` over the config file.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source provides a token.
    pub fn resolve_api_token(&self, env_token: Option<String>) -> Result<String> {
        if let Some(token) = env_token.filter(|t| !t.is_empty()) {
            return Ok(token);
        }
        if let Some(token) = self.api_token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }
        bail!("TMDB API token is not configured (set TMDB_API_TOKEN or tmdb.api_token in config.toml)");
    }

    /// Returns the configured token with all but the last 4 characters hidden.
    pub fn masked_api_token(&self) -> Option<String> {
        self.api_token.as_deref().map(mask_token)
    }
}

/// Masks all but the last 4 characters of `token`.
fn mask_token(token: &str) -> String {
    let total = token.chars().count();
    let visible: String = token.chars().skip(total.saturating_sub(4)).collect();
    if total <= 4 {
        return String::from("****");
    }
    format!("****{visible}")
}
