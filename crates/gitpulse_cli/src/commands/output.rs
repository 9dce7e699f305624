//! Terminal rendering of service results.

use clap::ValueEnum;
use gitpulse::{
    AggregateMetrics, FullProfile, LanguageShare, MetricsSummary, Repository, RepositorySummary,
};
use serde::Serialize;
use tabled::Tabled;

/// Output format for data commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as formatted tables (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

pub(crate) fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    table.to_string()
}

/// One repository with its fetched details.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct RepoSummaryRow {
    #[tabled(rename = "Repository")]
    pub name: String,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Stars")]
    pub stars: u64,
    #[tabled(rename = "Forks")]
    pub forks: u64,
    #[tabled(rename = "Commits")]
    pub commits: u64,
    #[tabled(rename = "Languages")]
    pub languages: String,
    #[tabled(rename = "Updated")]
    pub updated_at: String,
}

impl From<&RepositorySummary> for RepoSummaryRow {
    fn from(repo: &RepositorySummary) -> Self {
        Self {
            name: repo.name.clone(),
            language: display_or_dash(repo.language.as_deref()),
            stars: repo.stars,
            forks: repo.forks,
            commits: repo.commits,
            languages: repo
                .languages
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            updated_at: repo.updated_at.clone(),
        }
    }
}

/// A listed repository without details.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct RepoRow {
    #[tabled(rename = "Repository")]
    pub name: String,
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Stars")]
    pub stars: u64,
    #[tabled(rename = "Forks")]
    pub forks: u64,
    #[tabled(rename = "Updated")]
    pub updated_at: String,
}

impl From<&Repository> for RepoRow {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            language: display_or_dash(repo.language.as_deref()),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            updated_at: repo.updated_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct LanguageRow {
    #[tabled(rename = "Language")]
    pub language: String,
    #[tabled(rename = "Bytes")]
    pub bytes: u64,
    #[tabled(rename = "Share")]
    pub share: String,
}

impl From<&LanguageShare> for LanguageRow {
    fn from(share: &LanguageShare) -> Self {
        Self {
            language: share.language.clone(),
            bytes: share.bytes,
            share: format!("{:.2}%", share.percentage),
        }
    }
}

/// A labelled value, used for key/value tables.
#[derive(Debug, Clone, Serialize, Tabled)]
pub(crate) struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

fn field(field: &'static str, value: impl ToString) -> FieldRow {
    FieldRow {
        field,
        value: value.to_string(),
    }
}

fn display_or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

pub(crate) fn metrics_rows(metrics: &AggregateMetrics) -> Vec<FieldRow> {
    let mut rows = vec![
        field("Repositories", metrics.total_repositories),
        field("Commits", metrics.total_commits),
        field("Stars", metrics.total_stars),
        field("Forks", metrics.total_forks),
        field("Languages", metrics.total_languages),
    ];
    if let Some(score) = metrics.activity_score {
        rows.push(field("Activity score", score));
    }
    rows
}

pub(crate) fn summary_rows(summary: &MetricsSummary) -> Vec<FieldRow> {
    vec![
        field("Public repositories", summary.total_public_repos),
        field("Commits", summary.total_commits),
        field("Pull requests", summary.total_pull_requests),
        field("Issues opened", summary.total_issues_opened),
        field("Stars received", summary.total_stars_received),
        field("Forks", summary.total_forks_made),
    ]
}

pub(crate) fn profile_rows(profile: &FullProfile) -> Vec<FieldRow> {
    let user = &profile.profile;
    vec![
        field("Login", &user.login),
        field("Name", display_or_dash(user.name.as_deref())),
        field("Bio", display_or_dash(user.bio.as_deref())),
        field("Public repositories", user.public_repos),
        field("Followers", user.followers),
        field("Following", user.following),
        field("Created", &user.created_at),
        field("Profile", &user.html_url),
        field(
            "Organizations",
            profile
                .organizations
                .iter()
                .map(|o| o.login.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        field("Gists", profile.gists.len()),
        field("Recent events", profile.events.len()),
    ]
}
