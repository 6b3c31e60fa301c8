//! Upstream URL construction and the shared forwarding call.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Method, StatusCode};
use reqwest::Client;
use tracing::{debug, warn};
use url::{Url, form_urlencoded};

use crate::config::UpstreamConfig;
use crate::proxy::error::ProxyError;
use crate::response::{IntoResponse, Response};

const DISCOVER_ENDPOINT: &str = "discover/movie";
const MOVIE_ENDPOINT: &str = "movie/";

/// An upstream answer that is handed to the caller as-is.
#[derive(Debug)]
pub struct Passthrough {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for Passthrough {
    fn into_response(self) -> Response {
        let mut builder = Response::builder().status(self.status);
        if let Some(content_type) = self.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(self.body)
    }
}

/// `<base>discover/movie?api_key=<key>&<name>=<value>…`
///
/// `params` are appended as the raw text the client sent, so `28,12` or
/// `28|12` reach the upstream unchanged.
pub fn discover_url(upstream: &UpstreamConfig, params: &[(&str, &str)]) -> String {
    let mut url = format!("{}{DISCOVER_ENDPOINT}?{}", upstream.base_url(), key_query(upstream));
    for (name, value) in params {
        url.push('&');
        url.push_str(name);
        url.push('=');
        url.push_str(value);
    }
    url
}

/// `<base>movie/<id>?api_key=<key>`. `id` is inserted untouched.
///
/// Fails with [`ProxyError::BadRequest`] when the URL parser would not keep
/// `id` as the final path segment (`.`, `..`, `%2e%2e`, …): such a request
/// would otherwise reach a different upstream resource.
pub fn movie_url(upstream: &UpstreamConfig, id: &str) -> Result<String, ProxyError> {
    let url = format!("{}{MOVIE_ENDPOINT}{id}?{}", upstream.base_url(), key_query(upstream));
    let expected = format!("{}{MOVIE_ENDPOINT}{id}", upstream.base_url().path());
    match Url::parse(&url) {
        Ok(parsed) if parsed.path() == expected => Ok(url),
        _ => {
            debug!(id, "movie id does not survive as a path segment");
            Err(ProxyError::BadRequest)
        }
    }
}

fn key_query(upstream: &UpstreamConfig) -> String {
    let key: String = form_urlencoded::byte_serialize(upstream.api_key().as_bytes()).collect();
    format!("api_key={key}")
}

/// Issues one request and classifies the outcome.
///
/// `401` becomes [`ProxyError::NotAuthorized`]; every other status is a
/// [`Passthrough`]. The upstream response is dropped, and its connection
/// released, on every path out of this function.
pub async fn forward(client: &Client, method: Method, url: &str) -> Result<Passthrough, ProxyError> {
    let request = client.request(method, url).build().map_err(|e| {
        debug!(error = %e.without_url(), "could not build upstream request");
        ProxyError::BadRequest
    })?;

    debug!(upstream = redact(url), "forwarding");

    let response = client.execute(request).await.map_err(|e| {
        warn!(error = %e.without_url(), upstream = redact(url), "upstream unreachable");
        ProxyError::NotFound
    })?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        warn!(upstream = redact(url), "upstream rejected the api key");
        return Err(ProxyError::NotAuthorized);
    }

    let content_type = response.headers().get(CONTENT_TYPE).cloned();
    let body = response
        .bytes()
        .await
        .map_err(|e| ProxyError::Internal(Box::new(e.without_url())))?;

    Ok(Passthrough { status, content_type, body })
}

/// Everything before the query string, so the key stays out of logs.
fn redact(url: &str) -> &str {
    url.split_once('?').map_or(url, |(head, _)| head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream() -> UpstreamConfig {
        UpstreamConfig::new("https://api.example.org/3/", "k123").unwrap()
    }

    #[test]
    fn discover_without_params_carries_only_the_key() {
        assert_eq!(
            discover_url(&upstream(), &[]),
            "https://api.example.org/3/discover/movie?api_key=k123"
        );
    }

    #[test]
    fn discover_appends_each_param_after_the_key() {
        let url = discover_url(&upstream(), &[("page", "2"), ("sort_by", "popularity.desc")]);
        assert_eq!(
            url,
            "https://api.example.org/3/discover/movie?api_key=k123&page=2&sort_by=popularity.desc"
        );
    }

    #[test]
    fn discover_keeps_filter_syntax_verbatim() {
        let url = discover_url(
            &upstream(),
            &[("with_genres", "28,12"), ("with_companies", "420|7505"), ("t", "00:00")],
        );
        assert!(url.ends_with("?api_key=k123&with_genres=28,12&with_companies=420|7505&t=00:00"));
    }

    #[test]
    fn discover_keeps_encoded_separators_encoded() {
        let url = discover_url(&upstream(), &[("q", "a%26api_key%3Devil")]);
        assert!(url.ends_with("?api_key=k123&q=a%26api_key%3Devil"));
    }

    #[test]
    fn movie_id_becomes_the_last_path_segment() {
        assert_eq!(
            movie_url(&upstream(), "550").unwrap(),
            "https://api.example.org/3/movie/550?api_key=k123"
        );
        assert!(movie_url(&upstream(), "tt0137523").is_ok());
    }

    #[test]
    fn dot_segment_ids_are_bad_requests() {
        for id in ["..", ".", "%2e%2e", "%2E.", "%2e"] {
            let err = movie_url(&upstream(), id).unwrap_err();
            assert!(matches!(err, ProxyError::BadRequest), "{id}");
        }
    }

    #[test]
    fn redact_drops_the_query() {
        assert_eq!(
            redact("https://api.example.org/3/movie/550?api_key=k123"),
            "https://api.example.org/3/movie/550"
        );
        assert_eq!(redact("http://h/x"), "http://h/x");
    }

    #[tokio::test]
    async fn unparsable_url_is_a_bad_request() {
        let err = forward(&Client::new(), Method::GET, "http://[::1/movie/1")
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::BadRequest));
    }

    #[test]
    fn passthrough_copies_status_type_and_body() {
        let res = Passthrough {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            content_type: Some(HeaderValue::from_static("application/json")),
            body: Bytes::from_static(br#"{"error":"x"}"#),
        }
        .into_response();
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(res.body().as_ref(), br#"{"error":"x"}"#);
    }
}
