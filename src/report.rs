//! "Latest commits of a user's most starred repositories."
//!
//! One repository search, then one commit listing per selected repository.
//! The commit listings run concurrently (bounded by
//! [`ReportOptions::concurrency`]) and are reassembled in star order.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::client::ToolInvoker;
use crate::error::{Result, ToolError};
use crate::params::{SortKey, SortOrder, MAX_PER_PAGE};
use crate::parse::{CommitEntry, Repository};
use crate::tools::{list_commits, search_repositories, CommitListParams, SearchParams};

pub const DEFAULT_TOP_N_REPOS: u32 = 3;
pub const DEFAULT_LAST_N_COMMITS: u32 = 5;
pub const DEFAULT_CONCURRENCY: usize = 4;

const SHORT_SHA_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitInfo {
    /// First 7 characters of the full SHA.
    pub sha: String,
    /// First line of the commit message.
    pub message: String,
    pub url: String,
}

impl From<CommitEntry> for CommitInfo {
    fn from(entry: CommitEntry) -> Self {
        let sha = entry.sha.chars().take(SHORT_SHA_LEN).collect();
        let message = entry
            .message
            .split('\n')
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            sha,
            message,
            url: entry.html_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoCommits {
    pub name: String,
    pub stars: u64,
    pub commits: Vec<CommitInfo>,
}

/// What to do when listing commits for one repository fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Fail the whole report on the first error.
    #[default]
    Abort,
    /// Log and leave the repository out of the report.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub top_n_repos: u32,
    pub last_n_commits: u32,
    pub concurrency: usize,
    pub on_repo_failure: FailurePolicy,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n_repos: DEFAULT_TOP_N_REPOS,
            last_n_commits: DEFAULT_LAST_N_COMMITS,
            concurrency: DEFAULT_CONCURRENCY,
            on_repo_failure: FailurePolicy::Abort,
        }
    }
}

impl ReportOptions {
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("top_n_repos", self.top_n_repos),
            ("last_n_commits", self.last_n_commits),
        ] {
            if !(1..=MAX_PER_PAGE).contains(&value) {
                return Err(ToolError::validation(
                    field,
                    format!("must be between 1 and {}, got {}", MAX_PER_PAGE, value),
                ));
            }
        }
        if self.concurrency == 0 {
            return Err(ToolError::validation("concurrency", "must be at least 1"));
        }
        Ok(())
    }
}

/// Top `top_n_repos` repositories of `username` by stars, each with its
/// latest `last_n_commits` commits.
pub async fn commits_of_top_repos(
    client: &dyn ToolInvoker,
    username: &str,
    options: &ReportOptions,
    cancel: &CancellationToken,
) -> Result<Vec<RepoCommits>> {
    if username.trim().is_empty() {
        return Err(ToolError::validation("username", "must not be empty"));
    }
    options.validate()?;

    let search = SearchParams::builder(format!("user:{}", username))
        .sort(SortKey::Stars)
        .order(SortOrder::Desc)
        .per_page(options.top_n_repos)
        .build()?;
    let found = search_repositories::run_parsed(client, &search, cancel).await?;

    // The server treats perPage as a hint.
    let selected: Vec<Repository> = found
        .repositories
        .into_iter()
        .take(options.top_n_repos as usize)
        .collect();

    tracing::info!(
        username,
        repos = selected.len(),
        last_n_commits = options.last_n_commits,
        "Fetching latest commits for top repositories"
    );

    let fetches = stream::iter(selected)
        .map(|repo| async move {
            let commits =
                latest_commits(client, username, &repo.name, options.last_n_commits, cancel)
                    .await;
            (repo, commits)
        })
        .buffered(options.concurrency);
    futures::pin_mut!(fetches);

    let mut report = Vec::new();
    while let Some((repo, commits)) = fetches.next().await {
        match commits {
            Ok(commits) => report.push(RepoCommits {
                name: repo.name,
                stars: repo.stargazers_count,
                commits,
            }),
            Err(ToolError::Cancelled) => return Err(ToolError::Cancelled),
            Err(e) if options.on_repo_failure == FailurePolicy::Skip => {
                tracing::warn!(repo = %repo.full_name, error = %e, "Skipping repository");
            }
            Err(e) => {
                tracing::warn!(repo = %repo.full_name, error = %e, "Aborting report");
                return Err(e);
            }
        }
    }

    Ok(report)
}

async fn latest_commits(
    client: &dyn ToolInvoker,
    owner: &str,
    repo: &str,
    last_n: u32,
    cancel: &CancellationToken,
) -> Result<Vec<CommitInfo>> {
    let params = CommitListParams::builder(owner, repo)
        .per_page(last_n)
        .build()?;
    let entries = list_commits::run_parsed(client, &params, cancel).await?;
    Ok(entries.into_iter().map(CommitInfo::from).collect())
}
