//! GitHub REST API access.
//!
//! # Module Structure
//!
//! - [`error`] - Error types and upstream status classification
//! - [`types`] - Wire payloads as GitHub serves them
//! - [`client`] - Authenticated GET client over an [`HttpTransport`](crate::http::HttpTransport)
//! - [`pagination`] - `Link` header parsing
//! - [`convert`] - Conversion from wire payloads to response types

mod client;
mod convert;
mod error;
mod pagination;
mod types;

// Re-export error types
pub use error::{GitHubError, Result, short_error_message};

// Re-export client types and functions
pub use client::{
    DEFAULT_TIMEOUT, GITHUB_API_BASE, GitHubClient, MAX_PER_PAGE, decode, ensure_success,
};

pub use pagination::{LinkPagination, parse_link_header};

pub use types::{
    GitHubAuthUser, GitHubGist, GitHubLanguages, GitHubOrg, GitHubOwner, GitHubRepo,
    GitHubSearchResult, GitHubUser,
};

pub use convert::convert_all;
