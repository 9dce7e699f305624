//! Conversion from GitHub payloads to gitpulse response types.

use crate::model::{Gist, Organization, Repository, UserProfile};

use super::types::{GitHubGist, GitHubOrg, GitHubRepo, GitHubUser};

impl From<GitHubUser> for UserProfile {
    fn from(user: GitHubUser) -> Self {
        Self {
            login: user.login,
            name: user.name,
            bio: user.bio,
            public_repos: user.public_repos,
            followers: user.followers,
            following: user.following,
            created_at: user.created_at,
            updated_at: user.updated_at,
            avatar_url: user.avatar_url,
            html_url: user.html_url,
        }
    }
}

impl From<GitHubRepo> for Repository {
    fn from(repo: GitHubRepo) -> Self {
        Self {
            name: repo.name,
            html_url: repo.html_url,
            description: repo.description,
            stargazers_count: repo.stargazers_count,
            forks_count: repo.forks_count,
            language: repo.language,
            updated_at: repo.updated_at,
        }
    }
}

impl From<GitHubOrg> for Organization {
    fn from(org: GitHubOrg) -> Self {
        Self {
            login: org.login,
            description: org.description,
            url: org.url,
            avatar_url: org.avatar_url,
        }
    }
}

impl From<GitHubGist> for Gist {
    fn from(gist: GitHubGist) -> Self {
        Self {
            id: gist.id,
            html_url: gist.html_url,
            description: gist.description,
            created_at: gist.created_at,
        }
    }
}

/// Convert a list of GitHub payloads.
pub fn convert_all<S, T: From<S>>(items: Vec<S>) -> Vec<T> {
    items.into_iter().map(T::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_to_repository_drops_detail_fields() {
        let repo = GitHubRepo {
            name: "gitpulse".to_string(),
            html_url: "https://github.com/octocat/gitpulse".to_string(),
            description: Some("stats".to_string()),
            stargazers_count: 5,
            forks_count: 2,
            language: Some("Rust".to_string()),
            updated_at: "2024-05-01T00:00:00Z".to_string(),
            default_branch: Some("main".to_string()),
            private: true,
            owner: None,
        };

        let converted = Repository::from(repo);
        assert_eq!(converted.name, "gitpulse");
        assert_eq!(converted.stargazers_count, 5);
        assert_eq!(converted.forks_count, 2);
        assert_eq!(converted.language.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_convert_all_preserves_order() {
        let orgs = vec![
            GitHubOrg {
                login: "b".to_string(),
                description: None,
                url: "https://api.github.com/orgs/b".to_string(),
                avatar_url: String::new(),
            },
            GitHubOrg {
                login: "a".to_string(),
                description: Some("first".to_string()),
                url: "https://api.github.com/orgs/a".to_string(),
                avatar_url: String::new(),
            },
        ];

        let converted: Vec<Organization> = convert_all(orgs);
        let logins: Vec<_> = converted.iter().map(|o| o.login.as_str()).collect();
        assert_eq!(logins, vec!["b", "a"]);
    }
}
