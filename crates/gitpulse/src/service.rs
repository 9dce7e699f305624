//! Request-level operations.
//!
//! [`GitHubService`] holds a shared client and configuration. Each
//! operation takes the username and an optional per-request token, builds
//! a request-scoped client, and returns a fully assembled response value.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::detail::{DetailScope, RepoDetail};
use crate::fanout::fetch_all_details;
use crate::github::{
    DEFAULT_TIMEOUT, GITHUB_API_BASE, GitHubClient, GitHubError, GitHubRepo, Result, convert_all,
};
use crate::http::HttpTransport;
use crate::metrics::{aggregate, language_shares, total_bytes};
use crate::model::{
    Dashboard, FullProfile, LanguageProficiency, MetricsSummary, PrivateRepositories,
    RepoAggregate,
};
use crate::profile::assemble_full_profile;

/// Configuration for a [`GitHubService`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    /// GitHub API root.
    pub api_base: String,
    /// Per-request timeout of the default transport.
    pub timeout: Duration,
    /// Upper bound on concurrent per-repository fetches. `None` is unbounded.
    pub max_concurrency: Option<usize>,
    /// Whether aggregate metrics carry the recency activity score.
    pub activity_score: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: None,
            activity_score: false,
        }
    }
}

/// Entry point for every aggregation operation.
#[derive(Debug, Clone)]
pub struct GitHubService {
    client: GitHubClient,
    max_concurrency: Option<usize>,
    activity_score: bool,
}

impl GitHubService {
    /// Create a service talking to GitHub over reqwest.
    #[cfg(feature = "reqwest")]
    pub fn new(options: ServiceOptions) -> Result<Self> {
        let client = GitHubClient::new(&options.api_base, options.timeout)?;
        Ok(Self::from_client(client, &options))
    }

    /// Create a service over a custom transport.
    pub fn with_transport(options: ServiceOptions, transport: Arc<dyn HttpTransport>) -> Self {
        let client = GitHubClient::new_with_transport(&options.api_base, transport);
        Self::from_client(client, &options)
    }

    fn from_client(client: GitHubClient, options: &ServiceOptions) -> Self {
        Self {
            client,
            max_concurrency: options.max_concurrency,
            activity_score: options.activity_score,
        }
    }

    fn client_for(&self, token: Option<&str>) -> GitHubClient {
        self.client.with_token(token)
    }

    /// Per-repository summaries and aggregate metrics for `username`.
    pub async fn dashboard(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<RepoAggregate<Dashboard>> {
        let username = validate_username(username)?;
        let Some(details) = self.repo_details(username, token).await? else {
            return Ok(RepoAggregate::no_repositories(username));
        };

        let metrics = aggregate(&details, Utc::now(), self.activity_score);
        Ok(RepoAggregate::Found(Dashboard {
            username: username.to_string(),
            repositories: details.into_iter().map(Into::into).collect(),
            metrics,
        }))
    }

    /// Language byte shares across every repository of `username`.
    pub async fn language_proficiency(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<RepoAggregate<LanguageProficiency>> {
        let username = validate_username(username)?;
        let Some(details) = self.repo_details(username, token).await? else {
            return Ok(RepoAggregate::no_repositories(username));
        };

        let metrics = aggregate(&details, Utc::now(), self.activity_score);
        Ok(RepoAggregate::Found(LanguageProficiency {
            username: username.to_string(),
            total_bytes: total_bytes(&metrics.language_bytes),
            languages: language_shares(&metrics),
            metrics,
        }))
    }

    /// Profile, repositories, organizations, gists and recent events.
    pub async fn full_profile(&self, username: &str, token: Option<&str>) -> Result<FullProfile> {
        let username = validate_username(username)?;
        assemble_full_profile(&self.client_for(token), username).await
    }

    /// Private repositories owned by `username`, as visible to `token`.
    ///
    /// An unknown user is reported as [`GitHubError::NotFound`]; a known
    /// user without visible private repositories yields an empty list.
    pub async fn private_repositories(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<PrivateRepositories> {
        let username = validate_username(username)?;
        let client = self.client_for(token);

        let repos: Vec<GitHubRepo> = client
            .list_authenticated_private_repos()
            .await?
            .into_iter()
            .filter(|repo| repo.private && repo.owner_login_or("").eq_ignore_ascii_case(username))
            .collect();

        if repos.is_empty() {
            client.get_user(username).await?;
        }

        Ok(PrivateRepositories {
            username: username.to_string(),
            private_repositories_count: repos.len() as u64,
            private_repositories: convert_all(repos),
        })
    }

    /// Headline contribution numbers for `username`.
    pub async fn metrics_summary(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<MetricsSummary> {
        let username = validate_username(username)?;
        let client = self.client_for(token);

        let repos = client.list_user_repos(username, false).await?;
        let total_public_repos = repos.len() as u64;
        let details = fetch_all_details(
            &client,
            username,
            repos,
            DetailScope::CommitsOnly,
            self.max_concurrency,
        )
        .await?;

        let total_pull_requests = client
            .search_issue_count(&format!("author:{}+type:pr", username))
            .await?;
        let total_issues_opened = client
            .search_issue_count(&format!("author:{}+type:issue", username))
            .await?;

        Ok(MetricsSummary {
            username: username.to_string(),
            total_public_repos,
            total_commits: details.iter().map(|d| d.commits).sum(),
            total_pull_requests,
            total_issues_opened,
            total_stars_received: details.iter().map(|d| d.repo.stargazers_count).sum(),
            total_forks_made: details.iter().map(|d| d.repo.forks_count).sum(),
        })
    }

    /// Raw listing of the root directory of `owner/repo`.
    pub async fn repository_contents(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<serde_json::Value> {
        let owner = validate_username(owner)?;
        let repo = validate_repo_name(repo)?;
        self.client_for(token).get_repo_contents(owner, repo).await
    }

    /// List the user's repositories and fetch every one's details.
    ///
    /// Returns `None` for an empty listing without issuing detail requests.
    async fn repo_details(
        &self,
        username: &str,
        token: Option<&str>,
    ) -> Result<Option<Vec<RepoDetail>>> {
        let client = self.client_for(token);
        let repos = client.list_user_repos(username, false).await?;
        if repos.is_empty() {
            tracing::debug!(username, "no repositories listed");
            return Ok(None);
        }

        let details = fetch_all_details(
            &client,
            username,
            repos,
            DetailScope::Full,
            self.max_concurrency,
        )
        .await?;
        Ok(Some(details))
    }
}

/// Check a GitHub login before it goes into a path or a search query.
///
/// Logins are ASCII letters, digits and hyphens.
pub fn validate_username(value: &str) -> Result<&str> {
    validate_segment("username", value, |c| c.is_ascii_alphanumeric() || c == '-')
}

/// Check a repository name before it goes into a path.
///
/// Repository names also allow `.` and `_`, but never consist of dots only.
pub fn validate_repo_name(value: &str) -> Result<&str> {
    let value = validate_segment("repository", value, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
    })?;
    if value.chars().all(|c| c == '.') {
        return Err(GitHubError::InvalidInput(format!(
            "repository must not be {:?}",
            value
        )));
    }
    Ok(value)
}

fn validate_segment<'a>(
    what: &str,
    value: &'a str,
    allowed: impl Fn(char) -> bool,
) -> Result<&'a str> {
    if value.is_empty() {
        return Err(GitHubError::InvalidInput(format!("{} must not be empty", what)));
    }
    if !value.chars().all(allowed) {
        return Err(GitHubError::InvalidInput(format!(
            "{} contains characters GitHub does not allow: {:?}",
            what, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::http::{MockTransport, json_response};

    const HOST: &str = "https://api.github.test";

    fn service(transport: &MockTransport) -> GitHubService {
        let options = ServiceOptions {
            api_base: HOST.to_string(),
            ..ServiceOptions::default()
        };
        GitHubService::with_transport(options, Arc::new(transport.clone()))
    }

    fn repo_json(name: &str, owner: &str, private: bool) -> serde_json::Value {
        json!({
            "name": name,
            "html_url": format!("https://github.com/{owner}/{name}"),
            "description": null,
            "stargazers_count": 4,
            "forks_count": 1,
            "language": "Rust",
            "updated_at": "2024-01-01T00:00:00Z",
            "default_branch": "main",
            "private": private,
            "owner": {"login": owner}
        })
    }

    fn user_json(login: &str) -> serde_json::Value {
        json!({
            "login": login,
            "public_repos": 0,
            "followers": 0,
            "following": 0,
            "created_at": "2020-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "avatar_url": "",
            "html_url": format!("https://github.com/{login}")
        })
    }

    fn push_last_page(transport: &MockTransport, owner: &str, repo: &str, last: u64) {
        let link = format!(
            r#"<https://api.github.com/r/commits?per_page=1&page={last}>; rel="last""#
        );
        transport.push_response(
            format!("{HOST}/repos/{owner}/{repo}/commits?sha=main&per_page=1"),
            json_response(200, vec![("Link", link.as_str())], json!([{}])),
        );
    }

    #[tokio::test]
    async fn test_dashboard_counts_commits_from_last_page() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{HOST}/users/octocat/repos?per_page=100"),
            json!([repo_json("A", "octocat", false)]),
        );
        transport.push_json(
            format!("{HOST}/repos/octocat/A/languages"),
            json!({"Rust": 3000, "Python": 1000}),
        );
        push_last_page(&transport, "octocat", "A", 7);

        let dashboard = service(&transport)
            .dashboard("octocat", None)
            .await
            .expect("dashboard should load")
            .found()
            .expect("repositories were listed");

        assert_eq!(dashboard.repositories.len(), 1);
        assert_eq!(dashboard.repositories[0].commits, 7);
        assert_eq!(dashboard.metrics.total_commits, 7);
        assert_eq!(dashboard.metrics.total_languages, 2);
        assert_eq!(dashboard.metrics.language_percentages.get("Rust"), Some(&75.0));
        assert!(dashboard.metrics.activity_score.is_none());
    }

    #[tokio::test]
    async fn test_empty_listing_short_circuits() {
        let transport = MockTransport::new();
        transport.push_json(format!("{HOST}/users/newbie/repos?per_page=100"), json!([]));

        let outcome = service(&transport)
            .language_proficiency("newbie", None)
            .await
            .expect("empty listing is not an error");

        assert_eq!(outcome, RepoAggregate::no_repositories("newbie"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_language_proficiency_sorts_shares() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{HOST}/users/octocat/repos?per_page=100"),
            json!([repo_json("A", "octocat", false), repo_json("B", "octocat", false)]),
        );
        transport.push_json(format!("{HOST}/repos/octocat/A/languages"), json!({"Go": 100}));
        transport.push_json(
            format!("{HOST}/repos/octocat/B/languages"),
            json!({"Rust": 300, "Go": 100}),
        );
        push_last_page(&transport, "octocat", "A", 1);
        push_last_page(&transport, "octocat", "B", 2);

        let proficiency = service(&transport)
            .language_proficiency("octocat", None)
            .await
            .expect("proficiency should load")
            .found()
            .expect("repositories were listed");

        assert_eq!(proficiency.total_bytes, 500);
        let order: Vec<_> = proficiency.languages.iter().map(|l| l.language.as_str()).collect();
        assert_eq!(order, vec!["Rust", "Go"]);
        assert_eq!(proficiency.languages[0].percentage, 60.0);
    }

    #[tokio::test]
    async fn test_activity_score_is_opt_in() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{HOST}/users/octocat/repos?per_page=100"),
            json!([repo_json("A", "octocat", false)]),
        );
        transport.push_json(format!("{HOST}/repos/octocat/A/languages"), json!({}));
        push_last_page(&transport, "octocat", "A", 1);

        let options = ServiceOptions {
            api_base: HOST.to_string(),
            activity_score: true,
            ..ServiceOptions::default()
        };
        let service = GitHubService::with_transport(options, Arc::new(transport.clone()));

        let dashboard = service
            .dashboard("octocat", None)
            .await
            .expect("dashboard should load")
            .found()
            .expect("repositories were listed");
        // Updated long before the test runs, so nothing is recent.
        assert_eq!(dashboard.metrics.activity_score, Some(0));
    }

    #[tokio::test]
    async fn test_private_repositories_requires_token() {
        let transport = MockTransport::new();

        let err = service(&transport)
            .private_repositories("octocat", None)
            .await
            .expect_err("token is required");

        assert!(matches!(err, GitHubError::MissingCredential(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_private_repositories_filters_owner_and_visibility() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{HOST}/user/repos?per_page=100&sort=updated&type=private"),
            json!([
                repo_json("mine", "Octocat", true),
                repo_json("org-owned", "acme", true),
                repo_json("public", "octocat", false)
            ]),
        );

        let private = service(&transport)
            .private_repositories("octocat", Some("token"))
            .await
            .expect("listing should succeed");

        assert_eq!(private.private_repositories_count, 1);
        assert_eq!(private.private_repositories[0].name, "mine");

        let auth = transport.requests()[0]
            .headers
            .iter()
            .find(|(k, _)| k == "Authorization")
            .map(|(_, v)| v.clone());
        assert_eq!(auth.as_deref(), Some("token token"));
    }

    #[tokio::test]
    async fn test_private_repositories_empty_verifies_user() {
        let transport = MockTransport::new();
        let listing = format!("{HOST}/user/repos?per_page=100&sort=updated&type=private");
        transport.push_json(&listing, json!([]));
        transport.push_json(format!("{HOST}/users/octocat"), user_json("octocat"));
        transport.push_json(&listing, json!([]));
        transport.push_response(
            format!("{HOST}/users/ghost"),
            json_response(404, vec![], json!({"message": "Not Found"})),
        );

        let service = service(&transport);
        let empty = service
            .private_repositories("octocat", Some("token"))
            .await
            .expect("known user with no private repositories");
        assert_eq!(empty.private_repositories_count, 0);
        assert!(empty.private_repositories.is_empty());

        let err = service
            .private_repositories("ghost", Some("token"))
            .await
            .expect_err("unknown user");
        assert!(matches!(err, GitHubError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_metrics_summary() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{HOST}/users/octocat/repos?per_page=100"),
            json!([repo_json("A", "octocat", false), repo_json("B", "octocat", false)]),
        );
        push_last_page(&transport, "octocat", "A", 7);
        transport.push_response(
            format!("{HOST}/repos/octocat/B/commits?sha=main&per_page=1"),
            json_response(409, vec![], json!({"message": "Git Repository is empty."})),
        );
        transport.push_json(
            format!("{HOST}/search/issues?q=author:octocat+type:pr"),
            json!({"total_count": 12, "items": []}),
        );
        transport.push_json(
            format!("{HOST}/search/issues?q=author:octocat+type:issue"),
            json!({"total_count": 3, "items": []}),
        );

        let summary = service(&transport)
            .metrics_summary("octocat", None)
            .await
            .expect("summary should load");

        assert_eq!(summary.total_public_repos, 2);
        assert_eq!(summary.total_commits, 7);
        assert_eq!(summary.total_pull_requests, 12);
        assert_eq!(summary.total_issues_opened, 3);
        assert_eq!(summary.total_stars_received, 8);
        assert_eq!(summary.total_forks_made, 2);
        assert!(
            !transport
                .requested_urls()
                .iter()
                .any(|url| url.ends_with("/languages"))
        );
    }

    #[tokio::test]
    async fn test_repository_contents_passes_json_through() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{HOST}/repos/octocat/A/contents"),
            json!([{"name": "README.md", "type": "file"}]),
        );

        let contents = service(&transport)
            .repository_contents("octocat", "A", None)
            .await
            .expect("contents should load");
        assert_eq!(contents[0]["name"], "README.md");
    }

    #[tokio::test]
    async fn test_invalid_usernames_are_rejected_before_any_request() {
        let transport = MockTransport::new();
        let service = service(&transport);

        for bad in ["", "a/b", "a?b", "a#b", "a b", ".", "..", "%2e%2e", "a&sort=x", "a+b"] {
            let err = service
                .dashboard(bad, None)
                .await
                .expect_err("invalid username");
            assert!(matches!(err, GitHubError::InvalidInput(_)), "{bad:?}");
        }
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_validate_username_accepts_github_logins() {
        let accepted = validate_username("octo-cat-1").expect("valid login");
        assert_eq!(accepted, "octo-cat-1");

        for bad in ["octo.cat", "octo_cat", "a&sort=x"] {
            assert!(validate_username(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_validate_repo_name_rejects_dot_only_names() {
        assert_eq!(
            validate_repo_name("dotfiles.nix_2").expect("valid name"),
            "dotfiles.nix_2"
        );
        assert_eq!(validate_repo_name(".github").expect("valid name"), ".github");

        for bad in [".", "..", "...", "%2e%2e", "a/b", "a?ref=x"] {
            let err = validate_repo_name(bad).expect_err("invalid name");
            assert!(matches!(err, GitHubError::InvalidInput(_)), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn test_dot_segments_never_reach_the_api() {
        let transport = MockTransport::new();
        let service = service(&transport);

        let err = service.full_profile("..", None).await.expect_err("dot login");
        assert!(matches!(err, GitHubError::InvalidInput(_)));
        let err = service
            .repository_contents("octocat", "..", None)
            .await
            .expect_err("dot repository");
        assert!(matches!(err, GitHubError::InvalidInput(_)));
        let err = service
            .metrics_summary("a&sort=x", None)
            .await
            .expect_err("query injection");
        assert!(matches!(err, GitHubError::InvalidInput(_)));

        assert!(transport.requests().is_empty());
    }
}
