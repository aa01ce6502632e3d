//! Runtime configuration read from the environment

use std::env;
use thiserror::Error;

/// Error types for configuration loading
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No backend URL was configured for the selected environment
    #[error("No backend URL configured: set {0} or pass --api-url")]
    MissingApiUrl(&'static str),
}

/// Deployment environment selected by `ENVIRONMENT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Local,
}

impl Environment {
    /// Anything other than `production` or `development` is treated as local
    pub fn parse(value: Option<&str>) -> Environment {
        match value.map(str::trim) {
            Some("production") => Environment::Production,
            Some("development") => Environment::Development,
            _ => Environment::Local,
        }
    }

    /// Environment variable holding the backend URL for this environment
    pub fn url_var(self) -> &'static str {
        match self {
            Environment::Production => "MINTDASH_BACKEND_PROD_URL",
            Environment::Development => "MINTDASH_BACKEND_DEV_URL",
            Environment::Local => "MINTDASH_BACKEND_LOCAL_URL",
        }
    }
}

/// Default page size for paged endpoints
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Page size used for the mint editions endpoint
pub const MINT_EDITIONS_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: Environment,
    /// Backend base URL, without a trailing slash
    pub api_url: String,
    pub page_size: u32,
    pub mint_editions_page_size: u32,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// `api_url_override` (from `--api-url`) wins over the environment.
    pub fn from_env(api_url_override: Option<&str>) -> Result<Self, ConfigError> {
        Self::resolve(|name| env::var(name).ok(), api_url_override)
    }

    /// Resolves configuration through `lookup`, which maps a variable name to its value
    pub fn resolve<F>(lookup: F, api_url_override: Option<&str>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::parse(lookup("ENVIRONMENT").as_deref());

        let api_url = api_url_override
            .map(str::to_string)
            .or_else(|| lookup(environment.url_var()))
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingApiUrl(environment.url_var()))?;

        let page_size = lookup("MINTDASH_PAGE_SIZE")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        Ok(Config {
            environment,
            api_url,
            page_size,
            mint_editions_page_size: MINT_EDITIONS_PAGE_SIZE,
        })
    }
}
