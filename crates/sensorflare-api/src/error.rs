use thiserror::Error;

/// Top-level error type for the `sensorflare-api` crate.
///
/// Covers configuration, authentication state, transport, and response
/// parsing failures. A request the service *rejected* is not an error:
/// those surface as `Ok(false)` or `Ok(None)` from the endpoint methods.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Base URL was empty, unparsable, or not http(s).
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An endpoint helper was called with an empty path.
    #[error("API endpoint must not be empty")]
    EmptyEndpoint,

    // ── Authentication ──────────────────────────────────────────────
    /// A data call was made before `authenticate` succeeded.
    #[error("Not authenticated -- call authenticate(username, password) first")]
    Unauthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Building the HTTP client or loading a CA certificate failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Valid JSON, but a field the client depends on is missing.
    #[error("Unexpected response shape: expected {expected}")]
    UnexpectedShape { expected: &'static str, body: String },
}

impl Error {
    /// Returns `true` if the call failed because the client never
    /// authenticated.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// The client itself never retries; this is for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the service answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// The raw response body, when the failure happened while parsing one.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. }
            | Self::Deserialization { body, .. }
            | Self::UnexpectedShape { body, .. } => Some(body),
            _ => None,
        }
    }
}
