//! gitpulse - GitHub activity aggregation.
//!
//! This library turns a GitHub username into derived views: per-repository
//! summaries with commit counts, language proficiency, contribution metrics,
//! and a composite profile with organizations, gists and recent events.
//!
//! All GitHub I/O goes through the [`http::HttpTransport`] trait, so the
//! service can run against the real API (`reqwest` feature, on by default)
//! or any other transport.
//!
//! # Example
//!
//! ```ignore
//! use gitpulse::{GitHubService, ServiceOptions};
//!
//! let service = GitHubService::new(ServiceOptions::default())?;
//! if let Some(dashboard) = service.dashboard("octocat", None).await?.found() {
//!     println!("{} commits", dashboard.metrics.total_commits);
//! }
//! ```

pub mod detail;
pub mod fanout;
pub mod github;
pub mod http;
pub mod metrics;
pub mod model;
pub mod profile;
pub mod service;

pub use github::{GitHubClient, GitHubError, Result, short_error_message};
pub use model::{
    AggregateMetrics, Dashboard, FullProfile, Gist, LanguageProficiency, LanguageShare,
    MetricsSummary, Organization, PrivateRepositories, RepoAggregate, Repository,
    RepositorySummary, UserProfile,
};
pub use profile::OrgVisibility;
pub use service::{GitHubService, ServiceOptions};
