use std::path::PathBuf;

use thiserror::Error;

/// Boxed underlying cause carried by [`Error::Response`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for the `gvm-gmp` crate.
///
/// Four protocol-level kinds (connection, response, authentication, XML
/// parsing) plus an explicit not-found signal for point lookups that cannot
/// return `None`. Every entity operation on [`GmpClient`](crate::GmpClient)
/// folds transport and parsing failures into [`Error::Response`] with the
/// original failure as its source; authentication and not-found errors pass
/// through untouched.
#[derive(Debug, Error)]
pub enum Error {
    // ── Connection ──────────────────────────────────────────────────
    /// The Unix socket could not be opened.
    #[error("Cannot connect to gvmd at {}: {source}", .path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Request / response ──────────────────────────────────────────
    /// The daemon closed the stream mid-read, rejected a command, or
    /// returned a response that does not have the expected structure.
    #[error("GMP response error: {message}")]
    Response {
        message: String,
        /// The offending request, with the authentication preamble elided.
        request: Option<String>,
        /// GMP status code of the command response, when one was returned.
        status: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    // ── Authentication ──────────────────────────────────────────────
    /// Login was refused, or a request was rejected for lacking a valid
    /// authentication preamble.
    #[error("Authentication failed (status {status}): {message}")]
    Authentication { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// The payload is not parseable XML, or an expected status element is
    /// absent. Carries the raw body for debugging.
    #[error("XML parsing failed: {message}")]
    XmlParsing { message: String, body: String },

    /// A point lookup matched no entity.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
}

impl Error {
    /// Shorthand for a structural [`Error::Response`] with no status or cause.
    pub(crate) fn response(message: impl Into<String>) -> Self {
        Self::Response {
            message: message.into(),
            request: None,
            status: None,
            source: None,
        }
    }

    /// Returns `true` for login refusals and rejected preambles.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if a lookup matched nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The request that triggered this error, if recorded.
    pub fn request(&self) -> Option<&str> {
        match self {
            Self::Response { request, .. } => request.as_deref(),
            _ => None,
        }
    }

    /// GMP status code attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => *status,
            Self::Authentication { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Fold this error into the coarse outward-facing kind used by the
    /// entity operations.
    ///
    /// Authentication and not-found errors are returned unchanged. A
    /// [`Error::Response`] keeps its message and status and gains the
    /// request if it had none. Everything else becomes a
    /// [`Error::Response`] whose source is the original error.
    pub(crate) fn into_response(self, request: &str) -> Self {
        match self {
            Self::Authentication { .. } | Self::NotFound { .. } => self,
            Self::Response {
                message,
                request: None,
                status,
                source,
            } => Self::Response {
                message,
                request: Some(request.to_owned()),
                status,
                source,
            },
            Self::Response { .. } => self,
            other => Self::Response {
                message: "error in GMP request/response".into(),
                request: Some(request.to_owned()),
                status: None,
                source: Some(Box::new(other)),
            },
        }
    }
}
