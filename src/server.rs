use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{schemars, tool, tool_handler, tool_router, RoleServer, ServerHandler};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::client::ToolInvoker;
use crate::error::ToolError;
use crate::report::{self, FailurePolicy, RepoCommits, ReportOptions};

/// Serves the commit report as an MCP tool, backed by a GitHub tool client.
#[derive(Clone)]
pub struct McpGithubToolsServer {
    tools: Arc<dyn ToolInvoker>,
    concurrency: usize,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct TopReposCommitsParams {
    #[schemars(description = "GitHub username whose repositories are ranked by stars")]
    pub username: String,

    #[schemars(description = "Number of most starred repositories to include (default: 3, max: 100)")]
    #[serde(default)]
    pub top_n_repos: Option<u32>,

    #[schemars(description = "Number of latest commits per repository (default: 5, max: 100)")]
    #[serde(default)]
    pub last_n_commits: Option<u32>,

    #[schemars(description = "Leave out repositories whose commits cannot be fetched instead of failing (default: false)")]
    #[serde(default)]
    pub skip_failed_repos: Option<bool>,
}

impl McpGithubToolsServer {
    pub fn new(tools: Arc<dyn ToolInvoker>, concurrency: usize) -> Self {
        Self {
            tools,
            concurrency,
            tool_router: Self::tool_router(),
        }
    }

    fn report_options(&self, params: &TopReposCommitsParams) -> ReportOptions {
        ReportOptions {
            top_n_repos: params.top_n_repos.unwrap_or(report::DEFAULT_TOP_N_REPOS),
            last_n_commits: params
                .last_n_commits
                .unwrap_or(report::DEFAULT_LAST_N_COMMITS),
            concurrency: self.concurrency,
            on_repo_failure: if params.skip_failed_repos.unwrap_or(false) {
                FailurePolicy::Skip
            } else {
                FailurePolicy::Abort
            },
        }
    }

    async fn run_report(
        &self,
        params: &TopReposCommitsParams,
        cancel: &CancellationToken,
    ) -> Result<Vec<RepoCommits>, ToolError> {
        let options = self.report_options(params);
        report::commits_of_top_repos(self.tools.as_ref(), &params.username, &options, cancel).await
    }
}

#[tool_router]
impl McpGithubToolsServer {
    #[tool(
        name = "get_commits_of_top_repos",
        description = "Get the latest commits from a GitHub user's most starred repositories"
    )]
    async fn get_commits_of_top_repos(
        &self,
        Parameters(params): Parameters<TopReposCommitsParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let report = self
            .run_report(&params, &context.ct)
            .await
            .map_err(|e| {
                tracing::warn!(username = %params.username, error = %e, "Report failed");
                e.to_mcp_error()
            })?;

        let text = serde_json::to_string_pretty(&serde_json::json!({
            "username": params.username,
            "repos": report,
            "count": report.len(),
        }))
        .unwrap_or_else(|_| "{}".to_string());
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for McpGithubToolsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mcp-github-tools".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "GitHub report server. Use get_commits_of_top_repos to see the latest commits \
                 of a user's most starred repositories."
                    .to_string(),
            ),
        }
    }
}
