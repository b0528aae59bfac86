//! Ties enumeration, fetching, and display together.
//!
//! Pull requests are fetched concurrently but written strictly in the order
//! repositories were enumerated, so limits and output are deterministic.

use std::io::Write;

use futures::{StreamExt, stream};
use tracing::{debug, info};

use crate::{
    config::RunConfig,
    display::{displayable_count, format_pr_line, format_repo_heading},
    error::Result,
    query::{list_pull_requests, list_repositories},
    types::{
        DisplayOptions, Forge, Limits, PullRequest, RepoLimitPolicy, Repository, RunSummary,
        StopReason,
    },
};

/// Display counters. The per-repository counter restarts for every
/// repository; the global one only grows.
#[derive(Debug, Default)]
struct LimitState {
    global_displayed: usize,
    per_repo_displayed: usize,
}

enum RepoOutcome {
    Finished,
    Stop(StopReason),
}

/// Lists the pull requests of every repository of the configured account.
///
/// Fatal errors from enumeration are returned before anything is written.
/// Each repository is written as soon as its fetch and every earlier one
/// have completed. The first failed fetch or reached limit ends the run:
/// blocks already written stay in `writer` and no further fetches start.
pub async fn run<F, W>(forge: &F, config: &RunConfig, writer: &mut W) -> Result<RunSummary>
where
    F: Forge + Sync + ?Sized,
    W: Write,
{
    let mut repos =
        list_repositories(forge, &config.account, config.include_collaborator_repos).await?;
    if config.exclude_private {
        repos.retain(|repo| !repo.is_private);
    }

    writeln!(
        writer,
        "Listing PRs from {} repositories. This may take a while.",
        repos.len()
    )?;

    debug!(
        repositories = repos.len(),
        concurrency = config.concurrency,
        "fetching pull requests"
    );

    // `buffered` yields in input order and only starts a new fetch when
    // polled, so returning early leaves the remaining repositories untouched.
    let mut fetches = stream::iter(&repos)
        .map(|repo| async move {
            let result = list_pull_requests(forge, repo, config.selector, &config.criteria).await;
            (repo, result)
        })
        .buffered(config.concurrency.max(1));

    let mut state = LimitState::default();
    let mut summary = RunSummary {
        repositories: repos.len(),
        repositories_shown: 0,
        displayed: 0,
        stop: StopReason::Completed,
    };

    while let Some((repo, result)) = fetches.next().await {
        let prs = result?;
        if prs.is_empty() {
            continue;
        }

        summary.repositories_shown += 1;
        let outcome = write_repository(
            repo,
            &prs,
            &config.limits,
            &config.display,
            &mut state,
            writer,
        )?;
        summary.displayed = state.global_displayed;

        if let RepoOutcome::Stop(reason) = outcome {
            info!(?reason, displayed = summary.displayed, "display limit reached");
            summary.stop = reason;
            return Ok(summary);
        }
    }

    Ok(summary)
}

fn write_repository<W: Write>(
    repo: &Repository,
    prs: &[PullRequest],
    limits: &Limits,
    display: &DisplayOptions,
    state: &mut LimitState,
    writer: &mut W,
) -> Result<RepoOutcome> {
    let displayable = displayable_count(
        prs.len(),
        limits.per_repo,
        limits.global,
        state.global_displayed,
    );
    writeln!(
        writer,
        "{}",
        format_repo_heading(repo, displayable, prs.len(), display.styled)
    )?;

    state.per_repo_displayed = 0;
    for pr in prs {
        writeln!(writer, "{}", format_pr_line(repo, pr, display.width))?;
        state.per_repo_displayed += 1;
        state.global_displayed += 1;

        if limits.global > 0 && state.global_displayed >= limits.global {
            return Ok(RepoOutcome::Stop(StopReason::GlobalLimit));
        }

        if limits.per_repo > 0 && state.per_repo_displayed >= limits.per_repo {
            match limits.repo_limit_policy {
                RepoLimitPolicy::StopRun => return Ok(RepoOutcome::Stop(StopReason::RepoLimit)),
                RepoLimitPolicy::NextRepository => break,
            }
        }
    }

    writeln!(writer)?;
    Ok(RepoOutcome::Finished)
}
