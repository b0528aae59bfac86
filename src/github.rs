use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::{Octocrab, Page};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    error::ForgeError,
    types::{
        Forge, PAGE_SIZE, PrState, PullRequest, PullStateQuery, RepoQuery, Repository,
    },
};

/// Picks the credential to use, in order: the explicit value, `GITHUB_TOKEN`,
/// `GH_TOKEN`, then `gh auth token`. `None` means unauthenticated access.
pub fn resolve_token(explicit: Option<SecretString>) -> Option<SecretString> {
    if explicit.is_some() {
        return explicit;
    }

    std::env::var("GITHUB_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
        .or_else(|| std::env::var("GH_TOKEN").ok())
        .filter(|token| !token.trim().is_empty())
        .or_else(token_from_gh_cli)
        .filter(|token| !token.is_empty())
        .map(SecretString::from)
}

fn token_from_gh_cli() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        debug!("gh CLI has no token, continuing unauthenticated");
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|token| token.trim().to_string())
}

#[derive(Debug, Deserialize)]
struct OwnerRecord {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepoRecord {
    name: String,
    owner: OwnerRecord,
    #[serde(default)]
    private: bool,
}

impl From<RepoRecord> for Repository {
    fn from(record: RepoRecord) -> Self {
        Repository::new(record.owner.login, record.name, record.private)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum StateRecord {
    Open,
    Closed,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    login: String,
}

#[derive(Debug, Deserialize)]
struct LabelRecord {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PullRecord {
    number: u64,
    #[serde(default)]
    title: String,
    state: StateRecord,
    user: Option<UserRecord>,
    #[serde(default)]
    labels: Vec<LabelRecord>,
}

impl From<PullRecord> for PullRequest {
    fn from(record: PullRecord) -> Self {
        PullRequest {
            number: record.number,
            title: record.title,
            state: match record.state {
                StateRecord::Open => PrState::Open,
                StateRecord::Closed => PrState::Closed,
            },
            author: record.user.map(|user| user.login),
            labels: record.labels.into_iter().map(|label| label.name).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RepoListParams<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    per_page: u8,
}

#[derive(Debug, Serialize)]
struct PullListParams<'a> {
    state: &'a str,
    sort: &'a str,
    direction: &'a str,
    per_page: u8,
}

/// Maps an octocrab failure onto the forge error classes by HTTP status.
fn classify(err: octocrab::Error) -> ForgeError {
    let status = match &err {
        octocrab::Error::GitHub { source, .. } => {
            Some((source.status_code.as_u16(), source.message.clone()))
        }
        _ => None,
    };

    match status {
        Some((401, message)) => ForgeError::Unauthorized { message },
        Some((403, message)) => ForgeError::Forbidden { message },
        Some((404, message)) => ForgeError::NotFound { message },
        _ => ForgeError::Other(anyhow::Error::new(err)),
    }
}

fn build_client(base_uri: Option<&str>, token: Option<&SecretString>) -> Result<Octocrab> {
    let mut builder = Octocrab::builder();
    if let Some(base_uri) = base_uri {
        builder = builder
            .base_uri(base_uri)
            .with_context(|| format!("Invalid GitHub API URI: {base_uri}"))?;
    }
    match token {
        Some(token) => builder = builder.personal_token(token.expose_secret().to_string()),
        None => debug!("no token available, using unauthenticated GitHub client"),
    }
    builder.build().context("Failed to create GitHub client")
}

/// GitHub REST API forge backed by octocrab.
#[derive(Debug, Clone)]
pub struct GitHub {
    client: Octocrab,
}

impl GitHub {
    /// Creates a client for api.github.com, authenticated when `token` is
    /// present.
    pub fn new(token: Option<&SecretString>) -> Result<Self> {
        build_client(None, token).map(|client| Self { client })
    }

    /// Creates a client against another API root, e.g. a GitHub Enterprise
    /// server.
    pub fn with_base_uri(base_uri: &str, token: Option<&SecretString>) -> Result<Self> {
        build_client(Some(base_uri), token).map(|client| Self { client })
    }

    async fn get_all<T, P>(&self, route: &str, params: &P) -> Result<Vec<T>, ForgeError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let first: Page<T> = self
            .client
            .get(route, Some(params))
            .await
            .map_err(classify)?;
        self.client.all_pages(first).await.map_err(classify)
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn fetch_repositories(&self, query: &RepoQuery) -> Result<Vec<Repository>, ForgeError> {
        let (route, kind) = match query {
            RepoQuery::User { login, kind } => (format!("/users/{login}/repos"), kind.as_str()),
            RepoQuery::Organization { login } => (format!("/orgs/{login}/repos"), "all"),
        };
        let params = RepoListParams {
            kind,
            per_page: PAGE_SIZE,
        };

        let records: Vec<RepoRecord> = self.get_all(&route, &params).await?;
        debug!(route = %route, count = records.len(), "fetched repositories");
        Ok(records.into_iter().map(Repository::from).collect())
    }

    async fn fetch_pull_requests(
        &self,
        repo: &Repository,
        state: PullStateQuery,
    ) -> Result<Vec<PullRequest>, ForgeError> {
        let route = format!("/repos/{}/{}/pulls", repo.owner, repo.name);
        let params = PullListParams {
            state: state.as_str(),
            sort: "created",
            direction: "asc",
            per_page: PAGE_SIZE,
        };

        let records: Vec<PullRecord> = self.get_all(&route, &params).await?;
        debug!(repo = %repo, count = records.len(), "fetched pull requests");
        Ok(records.into_iter().map(PullRequest::from).collect())
    }
}
