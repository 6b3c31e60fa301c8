//! Incoming HTTP request type.

use std::collections::HashMap;

use http::Uri;
use url::form_urlencoded;

use crate::method::Method;

/// An incoming HTTP request, as seen by a handler.
///
/// Bodies are not carried: every route this crate serves is a `GET`.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri, params: HashMap::new() }
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn query(&self) -> Option<&str> { self.uri.query() }

    /// Returns a named path parameter, exactly as it appeared in the raw path.
    ///
    /// For a route `/movies/{id}`, `req.param("id")` on `/movies/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Query parameters as raw `(name, value)` text, first occurrence per
    /// name, in order of first appearance.
    ///
    /// Nothing is decoded: `?with_genres=28,12&page=2&page=3` yields
    /// `[("with_genres", "28,12"), ("page", "2")]`. Names are compared
    /// decoded, so `page` and `pa%67e` count as the same parameter. A bare
    /// `flag` yields `("flag", "")`.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        let Some(query) = self.query() else {
            return pairs;
        };
        for segment in query.split('&').filter(|s| !s.is_empty()) {
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            let decoded: String = form_urlencoded::parse(name.as_bytes())
                .map(|(n, _)| n.into_owned())
                .next()
                .unwrap_or_default();
            if seen.contains(&decoded) {
                continue;
            }
            seen.push(decoded);
            pairs.push((name, value));
        }
        pairs
    }

    /// The final `/`-delimited segment of the raw path.
    ///
    /// `/v1/movies/42` gives `"42"`, `/v1/movies` gives `"movies"` and a
    /// trailing slash gives `""`.
    pub fn last_segment(&self) -> &str {
        last_segment(self.path())
    }
}

pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
pub(crate) fn get(target: &str) -> Request {
    Request::new(Method::Get, target.parse().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_value_wins_and_order_is_kept() {
        let req = get("/v1/movies?page=2&sort_by=popularity.desc&page=3");
        assert_eq!(req.query_pairs(), vec![("page", "2"), ("sort_by", "popularity.desc")]);
    }

    #[test]
    fn no_query_means_no_pairs() {
        assert!(get("/v1/movies").query_pairs().is_empty());
        assert!(get("/v1/movies?").query_pairs().is_empty());
    }

    #[test]
    fn values_stay_raw() {
        let req = get("/v1/movies?with_genres=28,12&with_keywords=space%20opera&q=a+b&t=00:00");
        assert_eq!(
            req.query_pairs(),
            vec![
                ("with_genres", "28,12"),
                ("with_keywords", "space%20opera"),
                ("q", "a+b"),
                ("t", "00:00"),
            ]
        );
    }

    #[test]
    fn encoded_separators_are_not_split() {
        let req = get("/v1/movies?q=a%26api_key%3Devil");
        assert_eq!(req.query_pairs(), vec![("q", "a%26api_key%3Devil")]);
    }

    #[test]
    fn names_are_deduplicated_after_decoding() {
        let req = get("/v1/movies?page=1&pa%67e=2&adult&&x=");
        assert_eq!(req.query_pairs(), vec![("page", "1"), ("adult", ""), ("x", "")]);
    }

    #[test]
    fn last_segment_of_paths() {
        assert_eq!(last_segment("/v1/movies/42"), "42");
        assert_eq!(last_segment("/v1/movies"), "movies");
        assert_eq!(last_segment("/v1/movies/"), "");
        assert_eq!(last_segment("42"), "42");
        assert_eq!(get("/v1/movies/550?x=1").last_segment(), "550");
    }
}
