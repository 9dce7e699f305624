//! GitHub REST client.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use serde::de::DeserializeOwned;

use super::error::{GitHubError, Result};
use super::types::{
    GitHubAuthUser, GitHubGist, GitHubLanguages, GitHubOrg, GitHubRepo, GitHubSearchResult,
    GitHubUser,
};
use crate::http::{HttpRequest, HttpResponse, HttpTransport};

/// Public GitHub API root.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Per-call timeout applied by the default transport.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(60);

/// Media type GitHub recommends for REST v3.
const ACCEPT: &str = "application/vnd.github+json";

const USER_AGENT: &str = concat!("gitpulse/", env!("CARGO_PKG_VERSION"));

/// Largest page GitHub serves for list endpoints.
pub const MAX_PER_PAGE: u32 = 100;

/// GitHub API client.
///
/// Cloning is cheap: the transport is shared. A client optionally carries
/// the caller's access token; [`GitHubClient::with_token`] derives a
/// request-scoped client from a shared one.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
    token: Option<String>,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GitHubClient {
    /// Create a client backed by reqwest.
    ///
    /// # Arguments
    ///
    /// * `api_base` - API root (e.g., "https://api.github.com", or a GitHub
    ///   Enterprise "https://ghe.example.com/api/v3")
    /// * `timeout` - Upper bound for every individual request
    #[cfg(feature = "reqwest")]
    pub fn new(api_base: &str, timeout: StdDuration) -> Result<Self> {
        use crate::http::reqwest_transport::ReqwestTransport;

        let transport = ReqwestTransport::with_timeout(timeout)?;
        Ok(Self::new_with_transport(api_base, Arc::new(transport)))
    }

    pub fn new_with_transport(api_base: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Derive a client that authenticates with `token`.
    ///
    /// Blank tokens are treated as absent.
    #[must_use]
    pub fn with_token(&self, token: Option<&str>) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            api_base: self.api_base.clone(),
            token: token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
        }
    }

    /// Get the API root.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Whether requests carry an `Authorization` header.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, path: &str) -> HttpRequest {
        let mut headers = vec![
            ("Accept".to_string(), ACCEPT.to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];
        if let Some(ref token) = self.token {
            headers.push(("Authorization".to_string(), format!("token {}", token)));
        }

        HttpRequest {
            url: format!("{}{}", self.api_base, path),
            headers,
        }
    }

    /// Make a GET request and return the response whatever its status.
    ///
    /// Only transport failures are errors here; callers that need the
    /// status classified use [`GitHubClient::get`] or [`ensure_success`].
    pub async fn get_raw(&self, path: &str) -> Result<HttpResponse> {
        tracing::debug!(path, authenticated = self.has_token(), "GET");
        let response = self.transport.get(self.request(path)).await?;
        tracing::debug!(path, status = response.status, "response");
        Ok(response)
    }

    /// Make a GET request and decode a 2xx body as `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = ensure_success(self.get_raw(path).await?, path)?;
        decode(&response, path)
    }

    /// `/users/{username}`
    pub async fn get_user(&self, username: &str) -> Result<GitHubUser> {
        self.get(&format!("/users/{}", username)).await
    }

    /// `/user`: the identity behind the current token.
    pub async fn get_authenticated_user(&self) -> Result<GitHubAuthUser> {
        if !self.has_token() {
            return Err(GitHubError::MissingCredential("identify the token owner"));
        }
        self.get("/user").await
    }

    /// First page (up to 100) of a user's repositories.
    ///
    /// `sort_by_updated` adds `sort=updated`, which the profile view uses so
    /// the most recently touched repositories come first.
    pub async fn list_user_repos(
        &self,
        username: &str,
        sort_by_updated: bool,
    ) -> Result<Vec<GitHubRepo>> {
        let sort = if sort_by_updated { "&sort=updated" } else { "" };
        self.get(&format!(
            "/users/{}/repos?per_page={}{}",
            username, MAX_PER_PAGE, sort
        ))
        .await
    }

    /// First page of private repositories visible to the token.
    pub async fn list_authenticated_private_repos(&self) -> Result<Vec<GitHubRepo>> {
        if !self.has_token() {
            return Err(GitHubError::MissingCredential("access private repositories"));
        }
        self.get(&format!(
            "/user/repos?per_page={}&sort=updated&type=private",
            MAX_PER_PAGE
        ))
        .await
    }

    /// Public organization memberships of `username`.
    pub async fn list_user_orgs(&self, username: &str) -> Result<Vec<GitHubOrg>> {
        self.get(&format!("/users/{}/orgs", username)).await
    }

    /// All organization memberships (public and private) of the token owner.
    pub async fn list_authenticated_orgs(&self) -> Result<Vec<GitHubOrg>> {
        if !self.has_token() {
            return Err(GitHubError::MissingCredential("list private organizations"));
        }
        self.get("/user/orgs").await
    }

    /// `/users/{username}/gists`
    pub async fn list_gists(&self, username: &str) -> Result<Vec<GitHubGist>> {
        self.get(&format!("/users/{}/gists", username)).await
    }

    /// Recent public events, newest first, as raw JSON.
    pub async fn list_public_events(&self, username: &str) -> Result<Vec<serde_json::Value>> {
        self.get(&format!("/users/{}/events/public", username)).await
    }

    /// Language byte counts for one repository.
    pub async fn get_languages(&self, owner: &str, repo: &str) -> Result<GitHubLanguages> {
        self.get(&format!("/repos/{}/{}/languages", owner, repo)).await
    }

    /// `total_count` of an issue search, e.g. `author:octocat+type:pr`.
    pub async fn search_issue_count(&self, query: &str) -> Result<u64> {
        let result: GitHubSearchResult = self.get(&format!("/search/issues?q={}", query)).await?;
        Ok(result.total_count)
    }

    /// Root directory listing of a repository, as raw JSON.
    pub async fn get_repo_contents(&self, owner: &str, repo: &str) -> Result<serde_json::Value> {
        self.get(&format!("/repos/{}/{}/contents", owner, repo)).await
    }
}

/// Turn a non-2xx response into a classified error.
pub fn ensure_success(response: HttpResponse, path: &str) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(GitHubError::from_status(
        response.status,
        path,
        response.text(),
    ))
}

/// Decode a response body, reporting shape mismatches against `path`.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse, path: &str) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| GitHubError::malformed(path, e))
}
