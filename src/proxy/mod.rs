//! The movie endpoints.
//!
//! | Inbound | Upstream |
//! |---|---|
//! | `GET /v1/movies?…` | `GET <base>discover/movie?api_key=<key>&…` |
//! | `GET /v1/movies/{movie_id}` | `GET <base>movie/{movie_id}?api_key=<key>` |
//!
//! Upstream status and body come back unchanged, except `401` which becomes
//! `Invalid API key`. See [`ProxyError`] for the failure mapping.

mod error;
mod upstream;

use std::sync::Arc;

use http::Method;
use reqwest::Client;

use crate::config::UpstreamConfig;
use crate::error::Error;
use crate::request::Request;
use crate::router::Router;

pub use error::{BoxError, ProxyError};
pub use upstream::{Passthrough, discover_url, forward, movie_url};

/// Prefix every proxied route lives under.
pub const PATH_PREFIX: &str = "/v1/movies";

const MOVIE_ROUTE: &str = "/v1/movies/{movie_id}";

/// Shared state behind both endpoints: where to send requests, with which
/// key, through which connection pool.
pub struct MovieProxy {
    upstream: UpstreamConfig,
    client: Client,
}

impl MovieProxy {
    pub fn new(upstream: UpstreamConfig, client: Client) -> Self {
        Self { upstream, client }
    }

    /// Builds a proxy with a default client: no custom headers, no timeout.
    pub fn from_config(upstream: UpstreamConfig) -> Result<Self, Error> {
        Ok(Self::new(upstream, Client::builder().build()?))
    }

    /// `GET /v1/movies`: forwards the first value of every query parameter
    /// to the discovery endpoint.
    pub async fn discover(&self, req: Request) -> Result<Passthrough, ProxyError> {
        let url = discover_url(&self.upstream, &req.query_pairs());
        forward(&self.client, Method::GET, &url).await
    }

    /// `GET /v1/movies/{movie_id}`: forwards to the single-movie endpoint.
    ///
    /// Without a `movie_id` parameter the last path segment is used.
    pub async fn movie(&self, req: Request) -> Result<Passthrough, ProxyError> {
        let id = req.param("movie_id").unwrap_or_else(|| req.last_segment());
        let url = movie_url(&self.upstream, id)?;
        forward(&self.client, Method::GET, &url).await
    }
}

/// The router for both endpoints, sharing one proxy.
pub fn routes(proxy: Arc<MovieProxy>) -> Router {
    let discover = Arc::clone(&proxy);
    Router::new()
        .get(PATH_PREFIX, move |req: Request| {
            let proxy = Arc::clone(&discover);
            async move { proxy.discover(req).await }
        })
        .get(MOVIE_ROUTE, move |req: Request| {
            let proxy = Arc::clone(&proxy);
            async move { proxy.movie(req).await }
        })
}
