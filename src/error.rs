//! Unified error type.

use crate::config::ConfigError;

/// The error type returned by reelgate's fallible startup operations.
///
/// Per-request failures are never `Error`s: they are classified into a
/// [`ProxyError`](crate::ProxyError) and turned into an HTTP response at the
/// request boundary. This type surfaces what stops the process from serving
/// at all: bad configuration, a port that cannot be bound, an upstream client
/// that cannot be built.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("upstream client: {0}")]
    Client(#[from] reqwest::Error),
}
