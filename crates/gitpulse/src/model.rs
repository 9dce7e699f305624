//! Response shapes returned by the service operations.
//!
//! Every value here is built fresh from GitHub responses while handling one
//! request and is never mutated afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One repository with its fetched details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    /// Primary language as reported by GitHub.
    pub language: Option<String>,
    /// Every language GitHub detected in the repository.
    pub languages: BTreeSet<String>,
    /// Commits on the default branch; zero when it cannot be resolved.
    pub commits: u64,
    pub updated_at: String,
}

/// A repository as listed in the profile and private repository views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub language: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub created_at: String,
    pub updated_at: String,
    pub avatar_url: String,
    pub html_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub login: String,
    pub description: Option<String>,
    pub url: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    pub html_url: String,
    pub description: Option<String>,
    pub created_at: String,
}

/// Totals derived from a user's repositories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total_repositories: u64,
    pub total_commits: u64,
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_languages: u64,
    /// Sum over repositories of `max(0, 100 - days since last update)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_score: Option<u64>,
    pub language_bytes: BTreeMap<String, u64>,
    pub language_percentages: BTreeMap<String, f64>,
}

/// One language's share of a user's code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub language: String,
    pub bytes: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub username: String,
    pub repositories: Vec<RepositorySummary>,
    pub metrics: AggregateMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProficiency {
    pub username: String,
    pub total_bytes: u64,
    /// Sorted by bytes, largest first.
    pub languages: Vec<LanguageShare>,
    pub metrics: AggregateMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullProfile {
    pub profile: UserProfile,
    pub repositories: Vec<Repository>,
    pub organizations: Vec<Organization>,
    pub gists: Vec<Gist>,
    /// Most recent public events, at most [`crate::profile::MAX_EVENTS`].
    pub events: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateRepositories {
    pub username: String,
    pub private_repositories_count: u64,
    pub private_repositories: Vec<Repository>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub username: String,
    pub total_public_repos: u64,
    pub total_commits: u64,
    pub total_pull_requests: u64,
    pub total_issues_opened: u64,
    pub total_stars_received: u64,
    pub total_forks_made: u64,
}

/// Message carried by [`RepoAggregate::NoRepositories`].
pub const NO_REPOSITORIES_MESSAGE: &str = "no repositories found";

/// Outcome of an operation that needs at least one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepoAggregate<T> {
    Found(T),
    NoRepositories { username: String, message: String },
}

impl<T> RepoAggregate<T> {
    pub fn no_repositories(username: impl Into<String>) -> Self {
        Self::NoRepositories {
            username: username.into(),
            message: NO_REPOSITORIES_MESSAGE.to_string(),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NoRepositories { .. } => None,
        }
    }
}
