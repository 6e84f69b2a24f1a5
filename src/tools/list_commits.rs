use tokio_util::sync::CancellationToken;

use super::{insert_opt, required_text};
use crate::client::{ToolArgs, ToolInvoker};
use crate::error::{Result, ToolError};
use crate::params::{Page, PerPage};
use crate::parse::{parse_list_commits, CommitEntry};

pub const TOOL_NAME: &str = "list_commits";

/// Validated arguments for `list_commits`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitListParams {
    owner: String,
    repo: String,
    author: Option<String>,
    sha: Option<String>,
    page: Option<Page>,
    per_page: Option<PerPage>,
}

#[derive(Debug, Clone)]
pub struct CommitListParamsBuilder {
    owner: String,
    repo: String,
    author: Option<String>,
    sha: Option<String>,
    page: Option<u32>,
    per_page: Option<u32>,
}

impl CommitListParams {
    pub fn builder(owner: impl Into<String>, repo: impl Into<String>) -> CommitListParamsBuilder {
        CommitListParamsBuilder {
            owner: owner.into(),
            repo: repo.into(),
            author: None,
            sha: None,
            page: None,
            per_page: None,
        }
    }

    pub fn to_args(&self) -> ToolArgs {
        let mut args = ToolArgs::new();
        args.insert("owner".to_string(), self.owner.clone().into());
        args.insert("repo".to_string(), self.repo.clone().into());
        insert_opt(&mut args, "author", self.author.clone());
        insert_opt(&mut args, "sha", self.sha.clone());
        insert_opt(&mut args, "page", self.page.map(Page::get));
        insert_opt(&mut args, "perPage", self.per_page.map(PerPage::get));
        args
    }
}

impl CommitListParamsBuilder {
    /// Only commits by this GitHub login or email.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Branch, tag or SHA to list from. The default branch when unset.
    pub fn sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn build(self) -> Result<CommitListParams, ToolError> {
        Ok(CommitListParams {
            owner: required_text("owner", self.owner)?,
            repo: required_text("repo", self.repo)?,
            author: self.author.map(|a| required_text("author", a)).transpose()?,
            sha: self.sha.map(|s| required_text("sha", s)).transpose()?,
            page: self.page.map(Page::new).transpose()?,
            per_page: self.per_page.map(PerPage::new).transpose()?,
        })
    }
}

/// Raw commit JSON as returned by the server.
pub async fn run(
    client: &dyn ToolInvoker,
    params: &CommitListParams,
    cancel: &CancellationToken,
) -> Result<String> {
    client.invoke(TOOL_NAME, params.to_args(), cancel).await
}

/// Parsed commits, cut to `perPage` when it was set. The server may return
/// more than asked for; entries beyond the page are ignored unread.
pub async fn run_parsed(
    client: &dyn ToolInvoker,
    params: &CommitListParams,
    cancel: &CancellationToken,
) -> Result<Vec<CommitEntry>> {
    let raw = run(client, params, cancel).await?;
    let limit = params.per_page.map_or(usize::MAX, |p| p.get() as usize);
    let commits = parse_list_commits(&raw, limit)?;
    tracing::debug!(
        owner = params.owner.as_str(),
        repo = params.repo.as_str(),
        commits = commits.len(),
        "Parsed commit listing"
    );
    Ok(commits)
}
