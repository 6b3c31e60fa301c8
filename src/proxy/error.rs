//! Classified per-request failures.

use http::StatusCode;
use tracing::error;

use crate::response::{IntoResponse, Response};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every way forwarding a request can fail.
///
/// Each variant maps to exactly one status and one fixed message in
/// [`IntoResponse`]; callers never see upstream error detail.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The upstream request could not be built (the URL did not parse).
    #[error("upstream request could not be built")]
    BadRequest,

    /// The upstream could not be reached at all. Answered as 404, which is
    /// what existing clients of this proxy expect.
    #[error("upstream unreachable")]
    NotFound,

    /// The upstream answered `401`: the configured key was rejected.
    #[error("upstream rejected the api key")]
    NotAuthorized,

    /// Reading the upstream body failed after the status line arrived.
    #[error("internal: {0}")]
    Internal(#[source] BoxError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest    => StatusCode::BAD_REQUEST,
            Self::NotFound      => StatusCode::NOT_FOUND,
            Self::NotAuthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_)   => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The body sent to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            Self::BadRequest    => "",
            Self::NotFound      => "Task not found",
            Self::NotAuthorized => "Invalid API key",
            Self::Internal(_)   => "oops",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        if let Self::Internal(cause) = &self {
            error!(error = %cause, "request failed");
        }
        Response::text(self.status(), self.message())
    }
}
