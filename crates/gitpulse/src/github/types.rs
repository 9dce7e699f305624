//! GitHub API data types.
//!
//! These mirror the subset of GitHub's REST payloads that gitpulse reads.
//! Unknown fields are ignored; optional fields tolerate `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Account owning a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

/// A repository as returned by `/users/{user}/repos` and `/user/repos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    pub updated_at: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub owner: Option<GitHubOwner>,
}

impl GitHubRepo {
    /// Owner login, falling back to `default` when the payload omits it.
    pub fn owner_login_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.owner.as_ref().map_or(default, |o| o.login.as_str())
    }
}

/// A user as returned by `/users/{user}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    pub created_at: String,
    pub updated_at: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// The identity a token authenticates as (`/user`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubAuthUser {
    pub login: String,
}

/// An organization as returned by the orgs endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOrg {
    pub login: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    pub avatar_url: String,
}

/// A gist as returned by `/users/{user}/gists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubGist {
    pub id: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

/// Response body of `/search/issues`; only the count is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSearchResult {
    #[serde(default)]
    pub total_count: u64,
}

/// Response body of `/repos/{owner}/{repo}/languages`: language → bytes.
pub type GitHubLanguages = BTreeMap<String, u64>;
