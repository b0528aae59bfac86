use secrecy::SecretString;

use crate::types::{Account, DisplayOptions, FilterCriteria, Limits, StateSelector};

/// Default number of repositories whose pull requests are fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Validated settings for one run.
///
/// Built by [`crate::parse_args`]; everything here has already been checked,
/// so the pipeline never re-validates.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub account: Account,
    pub token: Option<SecretString>,
    pub exclude_private: bool,
    /// Only meaningful for user accounts.
    pub include_collaborator_repos: bool,
    pub selector: StateSelector,
    pub criteria: FilterCriteria,
    pub limits: Limits,
    pub concurrency: usize,
    pub display: DisplayOptions,
}
