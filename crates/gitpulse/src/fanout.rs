//! Concurrent per-repository detail fetching.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::detail::{DetailScope, RepoDetail, fetch_repo_detail};
use crate::github::{GitHubClient, GitHubError, GitHubRepo, Result};

/// Fetch details for every repository concurrently.
///
/// Each repository gets its own task. `max_concurrency` caps how many run
/// at once; `None` starts them all immediately. The call returns once every
/// task has finished. Results come back in the order of `repos` no matter
/// which task completes first; if any task failed, the first failure in
/// that order is returned instead.
pub async fn fetch_all_details(
    client: &GitHubClient,
    username: &str,
    repos: Vec<GitHubRepo>,
    scope: DetailScope,
    max_concurrency: Option<usize>,
) -> Result<Vec<RepoDetail>> {
    if repos.is_empty() {
        return Ok(Vec::new());
    }

    let semaphore =
        max_concurrency.map(|limit| Arc::new(Semaphore::new(limit.clamp(1, repos.len()))));

    tracing::debug!(
        username,
        count = repos.len(),
        max_concurrency = ?max_concurrency,
        ?scope,
        "fetching repository details"
    );

    let mut handles = Vec::with_capacity(repos.len());

    for repo in repos {
        let client = client.clone();
        let username = username.to_string();
        let semaphore = semaphore.clone();
        let name = repo.name.clone();

        let handle = tokio::spawn(async move {
            let _permit = match semaphore {
                Some(ref semaphore) => match semaphore.acquire().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return Err(GitHubError::internal("Semaphore closed unexpectedly")),
                },
                None => None,
            };

            fetch_repo_detail(&client, &username, repo, scope).await
        });

        handles.push((name, handle));
    }

    let mut details = Vec::with_capacity(handles.len());
    let mut first_error = None;

    for (name, handle) in handles {
        let outcome = match handle.await {
            Ok(result) => result,
            Err(e) => Err(GitHubError::internal(format!(
                "detail task for {} failed: {}",
                name, e
            ))),
        };

        match outcome {
            Ok(detail) => details.push(detail),
            Err(e) => {
                tracing::debug!(repo = %name, error = %e, "repository detail fetch failed");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(details),
    }
}
