//! Storefront client configuration parsed from environment variables.

use crate::error::ErrorCode;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_STORAGE_PATH: &str = ".storefront/storage.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Parse(String),
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_CONFIG_PARSE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// REST API base URL, without a trailing slash.
    pub api_url: String,
    /// Base URL product thumbnails are served from, without a trailing slash.
    pub image_url: String,
    /// Location of the durable session storage file.
    pub storage_path: String,
    pub timeouts: HttpTimeouts,
}

impl StorefrontConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `STOREFRONT_API_URL`: default `http://127.0.0.1:3000/api`
    /// - `STOREFRONT_IMAGE_URL`: default `<api url>/images`
    /// - `STOREFRONT_STORAGE_PATH`: default `.storefront/storage.json`
    /// - `STOREFRONT_REQUEST_TIMEOUT_SECS`: default 30
    /// - `STOREFRONT_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if a URL is not `http://` or `https://`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_base_url(
            "STOREFRONT_API_URL",
            &std::env::var("STOREFRONT_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned()),
        )?;
        let image_url = match std::env::var("STOREFRONT_IMAGE_URL") {
            Ok(raw) => parse_base_url("STOREFRONT_IMAGE_URL", &raw)?,
            Err(_) => default_image_url(&api_url),
        };
        let storage_path = std::env::var("STOREFRONT_STORAGE_PATH").unwrap_or_else(|_| DEFAULT_STORAGE_PATH.to_owned());
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("STOREFRONT_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("STOREFRONT_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_url, image_url, storage_path, timeouts })
    }

    /// Replace the API URL, re-deriving the image URL when it was the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `raw` is not an `http(s)` URL.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        let derived = self.image_url == default_image_url(&self.api_url);
        self.api_url = parse_base_url("api url", raw)?;
        if derived {
            self.image_url = default_image_url(&self.api_url);
        }
        Ok(self)
    }

    /// Absolute URL of a product thumbnail.
    #[must_use]
    pub fn thumbnail_url(&self, product_id: &str, thumbnail: &str) -> String {
        format!("{}/{product_id}/{thumbnail}", self.image_url)
    }
}

fn default_image_url(api_url: &str) -> String {
    format!("{api_url}/images")
}

fn parse_base_url(name: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::Parse(format!("{name} must start with http:// or https://, got '{raw}'")));
    }
    Ok(trimmed.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
