//! Error types for GitHub API operations.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur while aggregating GitHub data.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Upstream returned 404.
    #[error("User or resource not found: {resource}")]
    NotFound { resource: String },

    /// Upstream returned 403 (rate limit exhausted or access denied).
    #[error("API rate limit exceeded or access denied: {message}")]
    RateLimitedOrForbidden { message: String },

    /// Upstream returned any other non-2xx status.
    #[error("GitHub API error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// The operation needs an access token and none was supplied.
    #[error("GitHub token is required to {0}")]
    MissingCredential(&'static str),

    /// Upstream answered 2xx with a body of the wrong shape.
    #[error("Malformed upstream data from {endpoint}: {source}")]
    MalformedUpstreamData {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request never produced a response (connect failure, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Caller-supplied input cannot be used to build a request.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unexpected/internal error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl GitHubError {
    /// Create a not found error.
    #[inline]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a malformed data error for `endpoint`.
    #[inline]
    pub fn malformed(endpoint: impl Into<String>, source: serde_json::Error) -> Self {
        Self::MalformedUpstreamData {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// Create an internal error.
    #[inline]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classify a non-2xx upstream status.
    pub fn from_status(status: u16, endpoint: &str, body: String) -> Self {
        match status {
            404 => Self::not_found(endpoint),
            403 => Self::RateLimitedOrForbidden { message: body },
            _ => Self::Upstream { status, body },
        }
    }

    /// The HTTP status that best describes this error to a downstream caller.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::RateLimitedOrForbidden { .. } => 403,
            Self::Upstream { status, .. } => *status,
            Self::MissingCredential(_) | Self::InvalidInput(_) => 400,
            Self::MalformedUpstreamData { .. } | Self::Http(_) => 502,
            Self::Internal { .. } => 500,
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::RateLimitedOrForbidden { .. } => "RATE_LIMITED_OR_FORBIDDEN",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::MissingCredential(_) => "MISSING_CREDENTIAL",
            Self::MalformedUpstreamData { .. } => "MALFORMED_UPSTREAM_DATA",
            Self::Http(_) => "HTTP_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Get a short error message suitable for display.
pub fn short_error_message(err: &GitHubError) -> String {
    match err {
        GitHubError::NotFound { resource } => format!("Not found: {}", resource),
        GitHubError::RateLimitedOrForbidden { .. } => "Rate limited or forbidden".to_string(),
        GitHubError::Upstream { status, body } => {
            if body.len() > 50 {
                // Use chars() to avoid panicking on multi-byte UTF-8
                let truncated: String = body.chars().take(47).collect();
                format!("HTTP {}: {}...", status, truncated)
            } else {
                format!("HTTP {}: {}", status, body)
            }
        }
        GitHubError::MissingCredential(_) => "Token required".to_string(),
        GitHubError::MalformedUpstreamData { endpoint, .. } => {
            format!("Malformed response from {}", endpoint)
        }
        GitHubError::Http(_) => "Network error".to_string(),
        GitHubError::InvalidInput(msg) => format!("Invalid input: {}", msg),
        GitHubError::Internal { .. } => "Internal error".to_string(),
    }
}

/// Result type for GitHub operations.
pub type Result<T> = std::result::Result<T, GitHubError>;
