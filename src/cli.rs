use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;

use crate::{
    config::{DEFAULT_CONCURRENCY, RunConfig},
    display::terminal_width,
    types::{Account, DisplayOptions, FilterCriteria, Limits, RepoLimitPolicy, StateSelector},
};

const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Args, Debug, Clone, Default)]
struct StateArgs {
    /// List open PRs (the default)
    #[arg(long, help_heading = "State", conflicts_with_all = ["closed", "all"])]
    pub open: bool,

    /// List closed PRs
    #[arg(long, help_heading = "State", conflicts_with = "all")]
    pub closed: bool,

    /// List all PRs (open and closed)
    #[arg(long, help_heading = "State")]
    pub all: bool,
}

#[derive(Args, Debug, Clone, Default)]
struct ListArgs {
    /// GitHub personal access token (defaults to GITHUB_TOKEN, GH_TOKEN, then `gh auth token`)
    #[arg(short = 't', long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Do not list PRs of private repositories
    #[arg(long = "no-private")]
    pub no_private: bool,

    #[command(flatten)]
    pub state: StateArgs,

    /// List PRs opened by this user (exact, case-sensitive)
    #[arg(long, help_heading = "Filters", value_name = "LOGIN")]
    pub author: Option<String>,

    /// List PRs carrying this label
    #[arg(long, help_heading = "Filters", value_name = "NAME")]
    pub label: Option<String>,

    /// Limit the number of PRs shown per repository (0 = unlimited)
    #[arg(long = "repo-limit", help_heading = "Limits", value_name = "NUM", default_value_t = 0)]
    pub repo_limit: usize,

    /// Limit the number of PRs shown overall (0 = unlimited)
    #[arg(long = "global-limit", help_heading = "Limits", value_name = "NUM", default_value_t = 0)]
    pub global_limit: usize,

    /// Move on to the next repository when --repo-limit is reached instead of stopping
    #[arg(long = "continue-after-repo-limit", help_heading = "Limits")]
    pub continue_after_repo_limit: bool,

    /// Number of repositories fetched concurrently
    #[arg(long, value_name = "NUM", default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Output width in columns (defaults to the terminal width, or 80)
    #[arg(long, value_name = "COLUMNS")]
    pub width: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// List all PRs of all repositories under a personal user account
    User {
        /// The username of the user to list all repository PRs of
        username: String,

        /// Also list repositories the user collaborates on (only usable for the authenticated user)
        #[arg(long)]
        collaborator: bool,

        #[command(flatten)]
        options: ListArgs,
    },

    /// List all PRs of all repositories under an organization
    Org {
        /// The name of the organization to list all repository PRs of
        organization: String,

        #[command(flatten)]
        options: ListArgs,
    },
}

#[derive(Parser, Debug)]
#[command(name = "allprs")]
#[command(about = "List the pull requests of every repository of a GitHub user or organization")]
#[command(long_version = BUILD_INFO_HUMAN, disable_version_flag = true)]
struct CliArgs {
    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    #[command(subcommand)]
    command: AccountCommand,
}

impl ListArgs {
    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            anyhow::bail!("--concurrency must be at least 1");
        }
        if self.width == Some(0) {
            anyhow::bail!("--width must be at least 1");
        }
        Ok(())
    }

    fn selector(&self) -> StateSelector {
        let StateArgs { open, closed, all } = self.state;
        if all {
            return StateSelector::All;
        }
        // Neither flag given falls back to open.
        StateSelector::from_flags(open || !closed, closed).unwrap_or_default()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

fn build_config(cli: CliArgs) -> Result<RunConfig> {
    let (account, include_collaborator_repos, options) = match cli.command {
        AccountCommand::User {
            username,
            collaborator,
            options,
        } => (Account::user(username), collaborator, options),
        AccountCommand::Org {
            organization,
            options,
        } => (Account::organization(organization), false, options),
    };

    if account.login.trim().is_empty() {
        anyhow::bail!("Account name must not be empty");
    }
    options.validate()?;

    let repo_limit_policy = if options.continue_after_repo_limit {
        RepoLimitPolicy::NextRepository
    } else {
        RepoLimitPolicy::StopRun
    };

    Ok(RunConfig {
        account,
        token: non_empty(&options.token).map(SecretString::from),
        exclude_private: options.no_private,
        include_collaborator_repos,
        selector: options.selector(),
        criteria: FilterCriteria {
            author: non_empty(&options.author),
            label: non_empty(&options.label),
        },
        limits: Limits {
            per_repo: options.repo_limit,
            global: options.global_limit,
            repo_limit_policy,
        },
        concurrency: options.concurrency,
        display: DisplayOptions {
            width: terminal_width(options.width),
            styled: false,
        },
    })
}

/// Parses command-line arguments into a validated run configuration.
///
/// The token field only carries an explicit `--token`; environment and `gh`
/// fallbacks are resolved by [`crate::github::resolve_token`]. Styling is
/// left off for the caller to enable when writing to a terminal.
pub fn parse_args<I, T>(args: I) -> Result<RunConfig>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = CliArgs::try_parse_from(args)?;
    build_config(cli)
}
