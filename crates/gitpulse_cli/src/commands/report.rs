//! Data commands: run one service operation and print the result.

use gitpulse::{GitHubService, RepoAggregate};

use crate::commands::output::{
    LanguageRow, OutputFormat, RepoRow, RepoSummaryRow, metrics_rows, profile_rows, render_json,
    render_table, summary_rows,
};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Which report a data command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Report {
    Profile,
    Dashboard,
    Languages,
    Metrics,
    PrivateRepos,
}

pub(crate) async fn handle_report(
    report: Report,
    service: &GitHubService,
    username: &str,
    token: Option<&str>,
    output: OutputFormat,
) -> CommandResult {
    let text = match report {
        Report::Profile => {
            let profile = service.full_profile(username, token).await?;
            match output {
                OutputFormat::Json => render_json(&profile)?,
                OutputFormat::Table => format!(
                    "{}\n{}",
                    render_table(profile_rows(&profile)),
                    render_table(profile.repositories.iter().map(RepoRow::from).collect())
                ),
            }
        }
        Report::Dashboard => {
            let outcome = service.dashboard(username, token).await?;
            match (output, &outcome) {
                (OutputFormat::Json, _) => render_json(&outcome)?,
                (OutputFormat::Table, RepoAggregate::Found(dashboard)) => format!(
                    "{}\n{}",
                    render_table(
                        dashboard
                            .repositories
                            .iter()
                            .map(RepoSummaryRow::from)
                            .collect()
                    ),
                    render_table(metrics_rows(&dashboard.metrics))
                ),
                (OutputFormat::Table, RepoAggregate::NoRepositories { username, message }) => {
                    format!("{}: {}", username, message)
                }
            }
        }
        Report::Languages => {
            let outcome = service.language_proficiency(username, token).await?;
            match (output, &outcome) {
                (OutputFormat::Json, _) => render_json(&outcome)?,
                (OutputFormat::Table, RepoAggregate::Found(proficiency)) => format!(
                    "{}\nTotal bytes: {}",
                    render_table(
                        proficiency
                            .languages
                            .iter()
                            .map(LanguageRow::from)
                            .collect()
                    ),
                    proficiency.total_bytes
                ),
                (OutputFormat::Table, RepoAggregate::NoRepositories { username, message }) => {
                    format!("{}: {}", username, message)
                }
            }
        }
        Report::Metrics => {
            let summary = service.metrics_summary(username, token).await?;
            match output {
                OutputFormat::Json => render_json(&summary)?,
                OutputFormat::Table => render_table(summary_rows(&summary)),
            }
        }
        Report::PrivateRepos => {
            let private = service.private_repositories(username, token).await?;
            match output {
                OutputFormat::Json => render_json(&private)?,
                OutputFormat::Table => format!(
                    "{}\n{} private repositories",
                    render_table(
                        private
                            .private_repositories
                            .iter()
                            .map(RepoRow::from)
                            .collect()
                    ),
                    private.private_repositories_count
                ),
            }
        }
    };

    println!("{}", text);
    Ok(())
}

/// Print the raw root listing of `owner/repo` as JSON.
pub(crate) async fn handle_contents(
    service: &GitHubService,
    owner: &str,
    repo: &str,
    token: Option<&str>,
) -> CommandResult {
    let listing = service.repository_contents(owner, repo, token).await?;
    println!("{}", render_json(&listing)?);
    Ok(())
}
