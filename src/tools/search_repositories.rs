use tokio_util::sync::CancellationToken;

use super::{insert_opt, required_text};
use crate::client::{ToolArgs, ToolInvoker};
use crate::error::{Result, ToolError};
use crate::params::{Page, PerPage, SortKey, SortOrder};
use crate::parse::{parse_search_repositories, SearchResult};

pub const TOOL_NAME: &str = "search_repositories";

/// Validated arguments for `search_repositories`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    query: String,
    sort: Option<SortKey>,
    order: Option<SortOrder>,
    page: Option<Page>,
    per_page: Option<PerPage>,
    minimal_output: bool,
}

#[derive(Debug, Clone)]
pub struct SearchParamsBuilder {
    query: String,
    sort: Option<SortKey>,
    order: Option<SortOrder>,
    page: Option<u32>,
    per_page: Option<u32>,
    minimal_output: bool,
}

impl SearchParams {
    /// Start a search for `query`, e.g. `user:octocat` or `topic:react language:rust`.
    pub fn builder(query: impl Into<String>) -> SearchParamsBuilder {
        SearchParamsBuilder {
            query: query.into(),
            sort: None,
            order: None,
            page: None,
            per_page: None,
            minimal_output: true,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Wire arguments; unset optional fields are left out entirely.
    pub fn to_args(&self) -> ToolArgs {
        let mut args = ToolArgs::new();
        args.insert("query".to_string(), self.query.clone().into());
        insert_opt(&mut args, "sort", self.sort.map(SortKey::as_str));
        insert_opt(&mut args, "order", self.order.map(SortOrder::as_str));
        insert_opt(&mut args, "page", self.page.map(Page::get));
        insert_opt(&mut args, "perPage", self.per_page.map(PerPage::get));
        args.insert("minimal_output".to_string(), self.minimal_output.into());
        args
    }
}

impl SearchParamsBuilder {
    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
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

    /// Full GitHub repository objects when `false`. Defaults to `true`.
    pub fn minimal_output(mut self, minimal: bool) -> Self {
        self.minimal_output = minimal;
        self
    }

    pub fn build(self) -> Result<SearchParams, ToolError> {
        Ok(SearchParams {
            query: required_text("query", self.query)?,
            sort: self.sort,
            order: self.order,
            page: self.page.map(Page::new).transpose()?,
            per_page: self.per_page.map(PerPage::new).transpose()?,
            minimal_output: self.minimal_output,
        })
    }
}

pub async fn run(
    client: &dyn ToolInvoker,
    params: &SearchParams,
    cancel: &CancellationToken,
) -> Result<String> {
    client.invoke(TOOL_NAME, params.to_args(), cancel).await
}

pub async fn run_parsed(
    client: &dyn ToolInvoker,
    params: &SearchParams,
    cancel: &CancellationToken,
) -> Result<SearchResult> {
    let raw = run(client, params, cancel).await?;
    let result = parse_search_repositories(&raw)?;
    tracing::debug!(
        query = params.query(),
        total_count = result.total_count,
        returned = result.repositories.len(),
        "Parsed repository search"
    );
    Ok(result)
}
