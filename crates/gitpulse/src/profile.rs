//! Full profile assembly.

use crate::github::{GitHubClient, GitHubOrg, Result, convert_all, short_error_message};
use crate::model::FullProfile;

/// Most recent public events kept in a [`FullProfile`].
pub const MAX_EVENTS: usize = 10;

/// Which organization listing a profile request may use.
///
/// Private memberships are only visible through `/user/orgs`, and only
/// when the token belongs to the requested user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgVisibility {
    NoToken,
    TokenBelongsToOther,
    TokenOwnsRequestedUser,
}

impl OrgVisibility {
    /// Probe `/user` to decide visibility for `username`.
    ///
    /// Login comparison ignores case. A failed probe is treated as a token
    /// belonging to someone else, so only public memberships are shown.
    pub async fn resolve(client: &GitHubClient, username: &str) -> Self {
        if !client.has_token() {
            return Self::NoToken;
        }

        match client.get_authenticated_user().await {
            Ok(owner) if owner.login.eq_ignore_ascii_case(username) => Self::TokenOwnsRequestedUser,
            Ok(_) => Self::TokenBelongsToOther,
            Err(e) => {
                tracing::warn!(
                    username,
                    error = %short_error_message(&e),
                    "token owner probe failed, showing public organizations only"
                );
                Self::TokenBelongsToOther
            }
        }
    }

    /// Whether the private membership listing should be used.
    pub fn includes_private(self) -> bool {
        matches!(self, Self::TokenOwnsRequestedUser)
    }

    async fn list_orgs(self, client: &GitHubClient, username: &str) -> Result<Vec<GitHubOrg>> {
        if self.includes_private() {
            client.list_authenticated_orgs().await
        } else {
            client.list_user_orgs(username).await
        }
    }
}

/// Assemble a [`FullProfile`] from five sequential queries.
///
/// Any failing query aborts the whole composition.
pub async fn assemble_full_profile(client: &GitHubClient, username: &str) -> Result<FullProfile> {
    let user = client.get_user(username).await?;
    let repositories = client.list_user_repos(username, true).await?;

    let visibility = OrgVisibility::resolve(client, username).await;
    tracing::debug!(username, ?visibility, "resolved organization visibility");
    let organizations = visibility.list_orgs(client, username).await?;

    let gists = client.list_gists(username).await?;
    let mut events = client.list_public_events(username).await?;
    events.truncate(MAX_EVENTS);

    Ok(FullProfile {
        profile: user.into(),
        repositories: convert_all(repositories),
        organizations: convert_all(organizations),
        gists: convert_all(gists),
        events,
    })
}
