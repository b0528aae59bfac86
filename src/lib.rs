//! Allprs: list the pull requests of every repository of a GitHub account.
//!
//! Enumerates the repositories of a user or organization, fetches each
//! repository's pull requests concurrently, filters them by state, author,
//! and label, and prints a digest bounded by per-repository and global
//! limits. The GitHub REST API is reached through the [`Forge`] trait so the
//! pipeline can run against any paginated source.

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod github;
pub mod query;
pub mod types;

pub use aggregate::run;
pub use cli::parse_args;
pub use config::RunConfig;
pub use error::{Error, ForgeError, Result};
pub use github::{GitHub, resolve_token};
pub use query::{list_pull_requests, list_repositories};
pub use types::{
    Account, DisplayOptions, FilterCriteria, Forge, Limits, PrState, PullRequest, PullStateQuery,
    RepoLimitPolicy, RepoQuery, Repository, RunSummary, StateSelector, StopReason, UserRepoKind,
};
