use tracing::debug;

use crate::{
    error::{Error, ForgeError, Result},
    types::{
        Account, FilterCriteria, Forge, PullRequest, RepoQuery, Repository, StateSelector,
        UserRepoKind,
    },
};

fn repo_query_for(account: &Account, include_collaborator_repos: bool) -> RepoQuery {
    if account.is_organization {
        return RepoQuery::Organization {
            login: account.login.clone(),
        };
    }

    let kind = if include_collaborator_repos {
        UserRepoKind::All
    } else {
        UserRepoKind::Owner
    };
    RepoQuery::User {
        login: account.login.clone(),
        kind,
    }
}

/// Lists every repository of `account`, across all pages, in source order.
///
/// For a user account, `include_collaborator_repos` widens the listing to
/// repositories the user collaborates on. Organizations always list every
/// repository and ignore the flag.
pub async fn list_repositories<F>(
    forge: &F,
    account: &Account,
    include_collaborator_repos: bool,
) -> Result<Vec<Repository>>
where
    F: Forge + Sync + ?Sized,
{
    let query = repo_query_for(account, include_collaborator_repos);
    debug!(?query, "listing repositories");

    let repos = forge
        .fetch_repositories(&query)
        .await
        .map_err(|err| match err {
            ForgeError::NotFound { .. } => Error::AccountNotFound {
                account: account.login.clone(),
            },
            ForgeError::Unauthorized { message } => Error::Unauthorized(message),
            other => Error::Forge(other),
        })?;

    debug!(account = %account, count = repos.len(), "repositories listed");
    Ok(repos)
}

/// Fetches the pull requests of `repo` oldest first and applies `criteria`.
///
/// The author filter runs before the label filter; each is skipped when
/// unset.
pub async fn list_pull_requests<F>(
    forge: &F,
    repo: &Repository,
    selector: StateSelector,
    criteria: &FilterCriteria,
) -> Result<Vec<PullRequest>>
where
    F: Forge + Sync + ?Sized,
{
    let prs = forge
        .fetch_pull_requests(repo, selector.to_query())
        .await
        .map_err(|err| match err {
            ForgeError::Forbidden { .. } => Error::RepoForbidden {
                repo: repo.full_name(),
            },
            ForgeError::NotFound { .. } => Error::RepoNotFound {
                repo: repo.full_name(),
            },
            other => Error::Forge(other),
        })?;

    let fetched = prs.len();
    let filtered: Vec<PullRequest> = prs.into_iter().filter(|pr| criteria.matches(pr)).collect();

    debug!(
        repo = %repo,
        fetched,
        kept = filtered.len(),
        "pull requests filtered"
    );
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::types::{PrState, PullStateQuery};

    #[derive(Default)]
    struct RecordingForge {
        repo_queries: Mutex<Vec<RepoQuery>>,
        pull_queries: Mutex<Vec<PullStateQuery>>,
        prs: Vec<PullRequest>,
        pulls_error: Mutex<Option<ForgeError>>,
    }

    #[async_trait]
    impl Forge for RecordingForge {
        async fn fetch_repositories(
            &self,
            query: &RepoQuery,
        ) -> std::result::Result<Vec<Repository>, ForgeError> {
            self.repo_queries.lock().unwrap().push(query.clone());
            Ok(vec![Repository::new("alice", "repo1", false)])
        }

        async fn fetch_pull_requests(
            &self,
            _repo: &Repository,
            state: PullStateQuery,
        ) -> std::result::Result<Vec<PullRequest>, ForgeError> {
            self.pull_queries.lock().unwrap().push(state);
            if let Some(err) = self.pulls_error.lock().unwrap().take() {
                return Err(err);
            }
            Ok(self.prs.clone())
        }
    }

    fn pr(number: u64, author: Option<&str>, labels: &[&str]) -> PullRequest {
        PullRequest {
            number,
            title: format!("PR {number}"),
            state: PrState::Open,
            author: author.map(str::to_string),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_repo_query_for_user_and_org() {
        assert_eq!(
            repo_query_for(&Account::user("alice"), false),
            RepoQuery::User {
                login: "alice".to_string(),
                kind: UserRepoKind::Owner
            }
        );
        assert_eq!(
            repo_query_for(&Account::user("alice"), true),
            RepoQuery::User {
                login: "alice".to_string(),
                kind: UserRepoKind::All
            }
        );
        // The collaborator flag has no meaning for organizations.
        assert_eq!(
            repo_query_for(&Account::organization("acme"), true),
            RepoQuery::Organization {
                login: "acme".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_list_pull_requests_passes_state_query() {
        let forge = RecordingForge::default();
        let repo = Repository::new("alice", "repo1", false);

        for selector in [StateSelector::Open, StateSelector::Closed, StateSelector::All] {
            list_pull_requests(&forge, &repo, selector, &FilterCriteria::default())
                .await
                .unwrap();
        }

        assert_eq!(
            *forge.pull_queries.lock().unwrap(),
            vec![
                PullStateQuery::Open,
                PullStateQuery::Closed,
                PullStateQuery::All
            ]
        );
    }

    #[tokio::test]
    async fn test_list_pull_requests_applies_both_filters() {
        let forge = RecordingForge {
            prs: vec![
                pr(1, Some("alice"), &["bug"]),
                pr(2, Some("alice"), &["docs"]),
                pr(3, Some("bob"), &["bug"]),
                pr(4, None, &["bug"]),
            ],
            ..Default::default()
        };
        let repo = Repository::new("alice", "repo1", false);
        let criteria = FilterCriteria {
            author: Some("alice".to_string()),
            label: Some("bug".to_string()),
        };

        let prs = list_pull_requests(&forge, &repo, StateSelector::All, &criteria)
            .await
            .unwrap();

        let numbers: Vec<u64> = prs.iter().map(|pr| pr.number).collect();
        assert_eq!(numbers, vec![1]);
    }

    #[tokio::test]
    async fn test_list_pull_requests_classifies_errors() {
        let repo = Repository::new("alice", "repo1", false);

        let forge = RecordingForge::default();
        *forge.pulls_error.lock().unwrap() = Some(ForgeError::Forbidden {
            message: "Resource not accessible".to_string(),
        });
        let err = list_pull_requests(&forge, &repo, StateSelector::Open, &FilterCriteria::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RepoForbidden { ref repo } if repo == "alice/repo1"));

        *forge.pulls_error.lock().unwrap() = Some(ForgeError::NotFound {
            message: "Not Found".to_string(),
        });
        let err = list_pull_requests(&forge, &repo, StateSelector::Open, &FilterCriteria::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RepoNotFound { .. }));

        *forge.pulls_error.lock().unwrap() = Some(ForgeError::Unauthorized {
            message: "Bad credentials".to_string(),
        });
        let err = list_pull_requests(&forge, &repo, StateSelector::Open, &FilterCriteria::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forge(ForgeError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_list_repositories_records_query() {
        let forge = RecordingForge::default();
        let repos = list_repositories(&forge, &Account::organization("acme"), false)
            .await
            .unwrap();

        assert_eq!(repos.len(), 1);
        assert_eq!(
            *forge.repo_queries.lock().unwrap(),
            vec![RepoQuery::Organization {
                login: "acme".to_string()
            }]
        );
    }
}
