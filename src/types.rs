use std::fmt;

use async_trait::async_trait;

use crate::error::ForgeError;

/// Number of items requested per page from the forge.
pub const PAGE_SIZE: u8 = 100;

/// Width used when the terminal width cannot be determined.
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// A GitHub identity whose repositories are listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub login: String,
    pub is_organization: bool,
}

impl Account {
    pub fn user(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            is_organization: false,
        }
    }

    pub fn organization(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            is_organization: true,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.login)
    }
}

/// A repository snapshot. Identity is `(owner, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub is_private: bool,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, is_private: bool) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            is_private,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    pub fn pull_url(&self, number: u64) -> String {
        format!(
            "https://github.com/{}/{}/pull/{}",
            self.owner, self.name, number
        )
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
}

impl PrState {
    /// Capitalized form used in the digest, e.g. `Open`.
    pub fn label(&self) -> &'static str {
        match self {
            PrState::Open => "Open",
            PrState::Closed => "Closed",
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A pull request snapshot as returned by the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: PrState,
    pub author: Option<String>,
    pub labels: Vec<String>,
}

impl PullRequest {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }

    pub fn is_authored_by(&self, name: &str) -> bool {
        self.author.as_deref() == Some(name)
    }
}

/// Which pull request states to list. There is no "neither" variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StateSelector {
    #[default]
    Open,
    Closed,
    All,
}

impl StateSelector {
    pub fn from_flags(include_open: bool, include_closed: bool) -> Option<Self> {
        match (include_open, include_closed) {
            (true, true) => Some(StateSelector::All),
            (true, false) => Some(StateSelector::Open),
            (false, true) => Some(StateSelector::Closed),
            (false, false) => None,
        }
    }

    pub fn includes_open(&self) -> bool {
        matches!(self, StateSelector::Open | StateSelector::All)
    }

    pub fn includes_closed(&self) -> bool {
        matches!(self, StateSelector::Closed | StateSelector::All)
    }

    pub fn to_query(self) -> PullStateQuery {
        match self {
            StateSelector::Open => PullStateQuery::Open,
            StateSelector::Closed => PullStateQuery::Closed,
            StateSelector::All => PullStateQuery::All,
        }
    }
}

/// State parameter understood by the pulls listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullStateQuery {
    Open,
    Closed,
    All,
}

impl PullStateQuery {
    pub fn as_str(&self) -> &'static str {
        match self {
            PullStateQuery::Open => "open",
            PullStateQuery::Closed => "closed",
            PullStateQuery::All => "all",
        }
    }
}

/// Optional client-side filters applied after fetching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub author: Option<String>,
    pub label: Option<String>,
}

impl FilterCriteria {
    pub fn matches(&self, pr: &PullRequest) -> bool {
        self.author.as_deref().is_none_or(|a| pr.is_authored_by(a))
            && self.label.as_deref().is_none_or(|l| pr.has_label(l))
    }
}

/// Which repositories of a user account to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRepoKind {
    Owner,
    All,
}

impl UserRepoKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRepoKind::Owner => "owner",
            UserRepoKind::All => "all",
        }
    }
}

/// A repository listing request sent to the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoQuery {
    User { login: String, kind: UserRepoKind },
    Organization { login: String },
}

/// Paginated data source for repositories and pull requests.
///
/// Implementations follow every page and return the concatenation in the
/// source's order. Failures are classified into [`ForgeError`].
#[async_trait]
pub trait Forge {
    async fn fetch_repositories(&self, query: &RepoQuery) -> Result<Vec<Repository>, ForgeError>;

    async fn fetch_pull_requests(
        &self,
        repo: &Repository,
        state: PullStateQuery,
    ) -> Result<Vec<PullRequest>, ForgeError>;
}

/// What happens once a repository's display cap is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepoLimitPolicy {
    /// End the whole run, skipping every remaining repository.
    #[default]
    StopRun,
    /// Stop listing this repository and carry on with the next one.
    NextRepository,
}

/// Display caps. Zero means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    pub per_repo: usize,
    pub global: usize,
    pub repo_limit_policy: RepoLimitPolicy,
}

/// How the digest is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub width: usize,
    pub styled: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_TERMINAL_WIDTH,
            styled: false,
        }
    }
}

/// Why the aggregation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Completed,
    GlobalLimit,
    RepoLimit,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Repositories left after visibility filtering.
    pub repositories: usize,
    /// Repositories that received a heading.
    pub repositories_shown: usize,
    /// Pull request lines written.
    pub displayed: usize,
    pub stop: StopReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(author: Option<&str>, labels: &[&str]) -> PullRequest {
        PullRequest {
            number: 1,
            title: "Fix bug".to_string(),
            state: PrState::Open,
            author: author.map(str::to_string),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_selector_from_flags() {
        assert_eq!(StateSelector::from_flags(true, true), Some(StateSelector::All));
        assert_eq!(StateSelector::from_flags(true, false), Some(StateSelector::Open));
        assert_eq!(StateSelector::from_flags(false, true), Some(StateSelector::Closed));
        assert_eq!(StateSelector::from_flags(false, false), None);
    }

    #[test]
    fn test_selector_to_query() {
        assert_eq!(StateSelector::All.to_query().as_str(), "all");
        assert_eq!(StateSelector::Open.to_query().as_str(), "open");
        assert_eq!(StateSelector::Closed.to_query().as_str(), "closed");
        assert!(StateSelector::All.includes_open() && StateSelector::All.includes_closed());
        assert!(!StateSelector::Closed.includes_open());
    }

    #[test]
    fn test_criteria_author_is_case_sensitive() {
        let criteria = FilterCriteria {
            author: Some("Alice".to_string()),
            label: None,
        };
        assert!(criteria.matches(&pr(Some("Alice"), &[])));
        assert!(!criteria.matches(&pr(Some("alice"), &[])));
        assert!(!criteria.matches(&pr(None, &[])));
    }

    #[test]
    fn test_criteria_label_membership() {
        let criteria = FilterCriteria {
            author: None,
            label: Some("bug".to_string()),
        };
        assert!(criteria.matches(&pr(None, &["docs", "bug"])));
        assert!(!criteria.matches(&pr(None, &["bugfix"])));
        assert!(FilterCriteria::default().matches(&pr(None, &[])));
    }

    #[test]
    fn test_repository_urls() {
        let repo = Repository::new("alice", "repo1", false);
        assert_eq!(repo.full_name(), "alice/repo1");
        assert_eq!(repo.to_string(), "alice/repo1");
        assert_eq!(repo.pull_url(7), "https://github.com/alice/repo1/pull/7");
    }
}
