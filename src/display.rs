use std::io::{self, IsTerminal};

use colored::Colorize;

use crate::types::{DEFAULT_TERMINAL_WIDTH, PullRequest, Repository};

const TITLE_TRUNCATION_SUFFIX: &str = "...";

/// Width used to fit pull request lines.
///
/// An explicit override wins; otherwise the width of the terminal attached
/// to stdout, or 80 columns when stdout is not a terminal.
pub fn terminal_width(width_override: Option<usize>) -> usize {
    if let Some(width) = width_override {
        return width;
    }

    if io::stdout().is_terminal() {
        terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .filter(|w| *w > 0)
            .unwrap_or(DEFAULT_TERMINAL_WIDTH)
    } else {
        DEFAULT_TERMINAL_WIDTH
    }
}

/// Number of pull requests of a repository that fit within the limits.
pub fn displayable_count(
    total: usize,
    per_repo_limit: usize,
    global_limit: usize,
    global_displayed: usize,
) -> usize {
    let mut count = total;
    if per_repo_limit > 0 {
        count = count.min(per_repo_limit);
    }
    if global_limit > 0 {
        count = count.min(global_limit.saturating_sub(global_displayed));
    }
    count
}

/// Heading text for a repository block, e.g. `alice/repo1 (1/2)`.
pub fn format_repo_heading(
    repo: &Repository,
    displayable: usize,
    total: usize,
    styled: bool,
) -> String {
    let full_name = repo.full_name();
    let name = if styled {
        full_name.as_str().bold().to_string()
    } else {
        full_name
    };

    let heading = if displayable == total {
        format!("{name} ({total})")
    } else {
        format!("{name} ({displayable}/{total})")
    };

    if styled {
        heading.as_str().underline().to_string()
    } else {
        heading
    }
}

/// Single digest line for a pull request, fitted to `width` columns.
pub fn format_pr_line(repo: &Repository, pr: &PullRequest, width: usize) -> String {
    let prefix = format!("[{}] {}: ", pr.state.label(), repo.pull_url(pr.number));
    let remaining = width.saturating_sub(prefix.chars().count());
    format!("{prefix}{}", truncate_title(&pr.title, remaining))
}

/// Shortens `title` to at most `max_width` characters, ending in `...`.
///
/// Three characters are reserved for the suffix. When less than that is
/// available only the suffix is kept.
pub fn truncate_title(title: &str, max_width: usize) -> String {
    if title.chars().count() <= max_width {
        return title.to_string();
    }

    let keep = max_width.saturating_sub(TITLE_TRUNCATION_SUFFIX.len());
    let mut truncated: String = title.chars().take(keep).collect();
    truncated.push_str(TITLE_TRUNCATION_SUFFIX);
    truncated
}
