//! Startup configuration.
//!
//! Everything here is read once, validated, and then handed to the pieces
//! that need it. Nothing is global: the API key reaches the proxy through
//! [`MovieProxy::new`](crate::MovieProxy::new) and nowhere else.
//!
//! | Flag | Environment | Default |
//! |---|---|---|
//! | `--listen` | `REELGATE_LISTEN` | `0.0.0.0:8080` |
//! | `--api-base` | `TMDB_API_BASE` | `https://api.themoviedb.org/3/` |
//! | `--api-key` | `TMDB_API_KEY` | required |

use std::fmt;
use std::net::SocketAddr;

use clap::Parser;
use url::Url;

/// Base URL of the public movie metadata API.
pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3/";

/// Why a configuration was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("api key is empty")]
    MissingApiKey,

    #[error("invalid upstream base url `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("upstream base url must be http or https, got `{0}`")]
    UnsupportedScheme(String),
}

/// Command-line flags, each with an environment fallback.
#[derive(Debug, Parser)]
#[command(name = "reelgate", version, about)]
pub struct Cli {
    /// Address to accept client connections on.
    #[arg(long, env = "REELGATE_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Base URL of the upstream movie API.
    #[arg(long, env = "TMDB_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Key injected into every upstream request.
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub api_key: String,
}

impl Cli {
    /// Validates the raw flags.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        Ok(Config {
            listen: self.listen,
            upstream: UpstreamConfig::new(&self.api_base, self.api_key)?,
        })
    }
}

/// Validated process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub upstream: UpstreamConfig,
}

/// Where upstream requests go and the key they carry.
#[derive(Clone)]
pub struct UpstreamConfig {
    base_url: Url,
    api_key: String,
}

impl UpstreamConfig {
    /// Parses and normalises `base`.
    ///
    /// The stored base always ends in `/` and carries no query or fragment,
    /// so endpoint paths can be appended to it directly.
    pub fn new(base: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into().trim().to_owned();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let mut base_url = Url::parse(base).map_err(|source| ConfigError::InvalidBaseUrl {
            url: base.to_owned(),
            source,
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.scheme().to_owned()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        base_url.set_query(None);
        base_url.set_fragment(None);

        Ok(Self { base_url, api_key })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

// The key must never end up in a log line.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish()
    }
}
