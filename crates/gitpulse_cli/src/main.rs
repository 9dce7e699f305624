//! gitpulse CLI - GitHub activity reports and HTTP API.

mod commands;
mod config;
mod server;
mod shutdown;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use console::Term;
use gitpulse::GitHubService;
use tracing_subscriber::EnvFilter;

use crate::commands::output::OutputFormat;
use crate::commands::report::Report;

#[derive(Parser)]
#[command(name = "gitpulse")]
#[command(version)]
#[command(about = "GitHub activity reports for a user")]
#[command(
    long_about = "gitpulse aggregates a GitHub user's public activity: repositories with \
commit counts, language proficiency, contribution metrics, and a composite profile \
with organizations, gists and recent events. Reports can be printed or served over HTTP."
)]
#[command(after_long_help = r#"EXAMPLES
    Show a user's repositories with commit counts:
        $ gitpulse dashboard octocat

    Language breakdown as JSON:
        $ gitpulse languages octocat --output json

    Include private organizations when the token belongs to the user:
        $ gitpulse profile octocat --token ghp_...

    Serve the HTTP API:
        $ gitpulse serve --bind 0.0.0.0:8000

    Generate shell completions:
        $ gitpulse completions bash > ~/.local/share/bash-completion/completions/gitpulse

CONFIGURATION
    gitpulse reads configuration from:
      1. ~/.config/gitpulse/config.toml (or $XDG_CONFIG_HOME/gitpulse/config.toml)
      2. ./gitpulse.toml
      3. Environment variables (GITPULSE_* prefix, e.g., GITPULSE_GITHUB_TOKEN)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GITPULSE_GITHUB_TOKEN     Default GitHub personal access token
    GITPULSE_SERVER_BIND      Address for `gitpulse serve` (default: 127.0.0.1:8000)
    RUST_LOG                  Log filter (default: gitpulse=info,gitpulse_cli=info)
"#)]
struct Cli {
    #[command(flatten)]
    github: GitHubArgs,

    #[command(subcommand)]
    command: Commands,
}

/// GitHub access options shared by every command.
#[derive(Debug, Clone, Args)]
struct GitHubArgs {
    /// GitHub access token (default from config)
    #[arg(short, long, global = true)]
    token: Option<String>,

    /// GitHub API root (default from config or https://api.github.com)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Per-request timeout in seconds (default from config or 60)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Maximum concurrent per-repository requests (default from config, unbounded)
    #[arg(short = 'c', long, global = true)]
    concurrency: Option<usize>,

    /// Include the recency activity score in aggregate metrics
    #[arg(long, global = true)]
    activity_score: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Profile, repositories, organizations, gists and recent events
    Profile {
        username: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        output: OutputFormat,
    },
    /// Repositories with languages and commit counts, plus totals
    Dashboard {
        username: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Language byte shares across all repositories
    Languages {
        username: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Commits, pull requests, issues, stars and forks
    Metrics {
        username: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Private repositories owned by the user (requires a token)
    PrivateRepos {
        username: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Root directory listing of a repository, as JSON
    Contents { owner: String, repo: String },
    /// Serve the HTTP API
    Serve {
        /// Address to listen on (default from config or 127.0.0.1:8000)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing() {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("gitpulse=info,gitpulse_cli=info"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

/// Apply command-line overrides on top of loaded configuration.
fn apply_overrides(config: &mut config::Config, args: &GitHubArgs) {
    if let Some(ref token) = args.token {
        config.github.token = Some(token.clone());
    }
    if let Some(ref api_url) = args.api_url {
        config.github.api_url = api_url.clone();
    }
    if let Some(timeout) = args.timeout {
        config.github.timeout_secs = timeout;
    }
    if let Some(concurrency) = args.concurrency {
        config.github.max_concurrency = Some(concurrency);
    }
    if args.activity_score {
        config.github.activity_score = true;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Structured logging when piped, and always for the server
    if !Term::stdout().is_term() || matches!(cli.command, Commands::Serve { .. }) {
        init_tracing();
    }

    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    // Load configuration (config file -> env vars -> defaults), then flags
    let mut config = config::Config::load();
    apply_overrides(&mut config, &cli.github);

    let service = GitHubService::new(config.service_options())?;
    let token = config.github_token().map(String::from);
    let token = token.as_deref();

    match cli.command {
        Commands::Profile { username, output } => {
            commands::report::handle_report(Report::Profile, &service, &username, token, output)
                .await?;
        }
        Commands::Dashboard { username, output } => {
            commands::report::handle_report(Report::Dashboard, &service, &username, token, output)
                .await?;
        }
        Commands::Languages { username, output } => {
            commands::report::handle_report(Report::Languages, &service, &username, token, output)
                .await?;
        }
        Commands::Metrics { username, output } => {
            commands::report::handle_report(Report::Metrics, &service, &username, token, output)
                .await?;
        }
        Commands::PrivateRepos { username, output } => {
            commands::report::handle_report(
                Report::PrivateRepos,
                &service,
                &username,
                token,
                output,
            )
            .await?;
        }
        Commands::Contents { owner, repo } => {
            commands::report::handle_contents(&service, &owner, &repo, token).await?;
        }
        Commands::Serve { bind } => {
            let addr = match bind {
                Some(addr) => addr,
                None => config.server.bind.parse().map_err(|e| {
                    format!("Invalid server bind address '{}': {}", config.server.bind, e)
                })?,
            };

            tracing::info!(
                api_url = %config.github.api_url,
                timeout = ?Duration::from_secs(config.github.timeout_secs),
                max_concurrency = ?config.github.max_concurrency,
                default_token = token.is_some(),
                "starting server"
            );

            let state = Arc::new(server::AppState {
                service,
                default_token: token.map(String::from),
            });
            server::serve(addr, state).await?;
        }
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}
