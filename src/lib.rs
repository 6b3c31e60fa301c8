//! # reelgate
//!
//! A thin HTTP proxy in front of a movie metadata API. Clients call two
//! endpoints; reelgate adds the server-side API key, forwards the call and
//! hands the upstream answer back untouched. The key never leaves the
//! process.
//!
//! | Inbound | Upstream |
//! |---|---|
//! | `GET /v1/movies?…` | `discover/movie` with the query passed through |
//! | `GET /v1/movies/{movie_id}` | `movie/{movie_id}` |
//!
//! Failures the caller can see:
//!
//! | Status | Body | When |
//! |---|---|---|
//! | 400 | empty | the upstream URL did not parse |
//! | 404 | `Task not found` | the upstream could not be reached |
//! | 401 | `Invalid API key` | the upstream rejected the key |
//! | 500 | `oops` | the upstream body could not be read |
//!
//! Any other upstream status, error or not, is passed through with its body.
//!
//! No retries, no caching, no rate limiting, no client authentication.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use reelgate::{MovieProxy, Server, UpstreamConfig, routes};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), reelgate::Error> {
//!     let upstream = UpstreamConfig::new("https://api.themoviedb.org/3/", "my-key")?;
//!     let proxy = Arc::new(MovieProxy::from_config(upstream)?);
//!
//!     Server::bind("0.0.0.0:8080".parse().unwrap())
//!         .await?
//!         .serve(routes(proxy))
//!         .await
//! }
//! ```

pub mod config;
mod error;
mod handler;
mod method;
pub mod proxy;
mod request;
mod response;
mod router;
mod server;

pub use config::{Config, UpstreamConfig};
pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use proxy::{MovieProxy, ProxyError, routes};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
