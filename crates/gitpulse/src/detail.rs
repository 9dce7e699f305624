//! Per-repository detail fetching: language breakdown and commit count.

use crate::github::{
    GitHubClient, GitHubLanguages, GitHubRepo, Result, decode, ensure_success,
    parse_link_header,
};
use crate::http::HttpResponse;
use crate::model::RepositorySummary;

/// GitHub answers 409 Conflict when listing commits of an empty repository.
const EMPTY_REPOSITORY_STATUS: u16 = 409;

/// Which details to fetch for each repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailScope {
    /// Languages and commit count.
    Full,
    /// Commit count only; languages are left empty.
    CommitsOnly,
}

impl DetailScope {
    fn wants_languages(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// A listed repository together with its fetched details.
#[derive(Debug, Clone)]
pub struct RepoDetail {
    pub repo: GitHubRepo,
    pub language_bytes: GitHubLanguages,
    pub commits: u64,
}

impl RepoDetail {
    pub fn summary(&self) -> RepositorySummary {
        RepositorySummary {
            name: self.repo.name.clone(),
            url: self.repo.html_url.clone(),
            description: self.repo.description.clone(),
            stars: self.repo.stargazers_count,
            forks: self.repo.forks_count,
            language: self.repo.language.clone(),
            languages: self.language_bytes.keys().cloned().collect(),
            commits: self.commits,
            updated_at: self.repo.updated_at.clone(),
        }
    }
}

/// Fetch the details of one repository owned by (or listed for) `username`.
///
/// Language failures degrade to an empty map. Commit counting failures
/// propagate.
pub async fn fetch_repo_detail(
    client: &GitHubClient,
    username: &str,
    repo: GitHubRepo,
    scope: DetailScope,
) -> Result<RepoDetail> {
    let owner = repo.owner_login_or(username).to_string();

    let language_bytes = if scope.wants_languages() {
        fetch_languages(client, &owner, &repo.name).await
    } else {
        GitHubLanguages::new()
    };

    let commits = count_commits(client, &owner, &repo.name, repo.default_branch.as_deref()).await?;

    Ok(RepoDetail {
        repo,
        language_bytes,
        commits,
    })
}

/// Language byte counts, or an empty map if GitHub cannot provide them.
pub async fn fetch_languages(client: &GitHubClient, owner: &str, repo: &str) -> GitHubLanguages {
    match client.get_languages(owner, repo).await {
        Ok(languages) => languages,
        Err(e) => {
            tracing::warn!(
                owner,
                repo,
                error = %crate::github::short_error_message(&e),
                "language fetch failed, treating as no languages"
            );
            GitHubLanguages::new()
        }
    }
}

/// Count commits on `default_branch` by requesting a single-commit page.
///
/// A repository without a default branch, or one GitHub reports as empty,
/// has zero commits.
pub async fn count_commits(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
    default_branch: Option<&str>,
) -> Result<u64> {
    let Some(branch) = default_branch.filter(|b| !b.is_empty()) else {
        tracing::debug!(owner, repo, "no default branch, skipping commit count");
        return Ok(0);
    };

    let path = format!(
        "/repos/{}/{}/commits?sha={}&per_page=1",
        owner,
        repo,
        encode_query_value(branch)
    );
    let response = client.get_raw(&path).await?;

    if response.status == EMPTY_REPOSITORY_STATUS {
        tracing::debug!(owner, repo, "repository is empty");
        return Ok(0);
    }

    let response = ensure_success(response, &path)?;
    commit_count_from_page(&response, &path)
}

/// Derive the total commit count from a `per_page=1` commits response.
///
/// With one commit per page, the `rel="last"` page number is the commit
/// count. Without it the page itself holds every commit there is.
pub fn commit_count_from_page(response: &HttpResponse, path: &str) -> Result<u64> {
    if let Some(link) = response.header("link")
        && let Some(last) = parse_link_header(link).last_page
    {
        return Ok(last);
    }

    let page: Vec<serde_json::Value> = decode(response, path)?;
    Ok(page.len() as u64)
}

fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

impl From<RepoDetail> for RepositorySummary {
    fn from(detail: RepoDetail) -> Self {
        detail.summary()
    }
}
