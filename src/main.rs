use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mcp_github_tools::client::ToolClient;
use mcp_github_tools::config::{
    ToolClientConfig, ToolServerAddress, DEFAULT_SECRET_NAME, GITHUB_SERVER_URL,
};
use mcp_github_tools::report::{self, FailurePolicy, ReportOptions};
use mcp_github_tools::server::McpGithubToolsServer;
use rmcp::{transport::stdio, ServiceExt};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Report the latest commits of a GitHub user's most starred repositories via MCP tools
#[derive(Parser)]
#[command(name = "mcp-github-tools", version, about)]
struct Cli {
    /// Tool bridge host.
    /// Default: TOOL_SERVER_HOST, then localhost
    #[arg(long, global = true)]
    host: Option<String>,

    /// Tool bridge port.
    /// Default: TOOL_SERVER_PORT, then 8900
    #[arg(long, global = true)]
    port: Option<u16>,

    /// URL of the remote GitHub MCP server
    #[arg(long, global = true, default_value = GITHUB_SERVER_URL)]
    server_url: String,

    /// Environment variable holding the GitHub token used in the Authorization header
    #[arg(long = "secret-env", global = true, default_value = DEFAULT_SECRET_NAME)]
    secret_env: String,

    /// Maximum concurrent commit listings (default: 4)
    #[arg(long, global = true, default_value_t = report::DEFAULT_CONCURRENCY)]
    concurrency: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the latest commits of a user's most starred repositories as JSON
    Report {
        /// GitHub username
        username: String,

        /// Number of most starred repositories (default: 3)
        #[arg(long, default_value_t = report::DEFAULT_TOP_N_REPOS)]
        top_repos: u32,

        /// Number of latest commits per repository (default: 5)
        #[arg(long, default_value_t = report::DEFAULT_LAST_N_COMMITS)]
        last_commits: u32,

        /// Leave out repositories whose commits cannot be fetched
        #[arg(long)]
        skip_failed: bool,
    },
    /// Serve the report as an MCP tool over stdio
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Resolve bridge address: flags > TOOL_SERVER_HOST/PORT > localhost:8900
    let mut address = ToolServerAddress::from_env()?;
    if let Some(host) = cli.host {
        address.host = host;
    }
    if let Some(port) = cli.port {
        address.port = port;
    }

    if std::env::var(&cli.secret_env).map_or(true, |v| v.is_empty()) {
        tracing::warn!(
            env = cli.secret_env.as_str(),
            "GitHub token not set, tool calls will fail until it is"
        );
    }

    let config = ToolClientConfig::github_at(&cli.server_url, address, &cli.secret_env)?;
    tracing::info!(
        server = config.server_name(),
        bridge = %config.address().run_url(),
        concurrency = cli.concurrency,
        "Configured tool client"
    );
    let client = ToolClient::new(config);

    match cli.command {
        Command::Report {
            username,
            top_repos,
            last_commits,
            skip_failed,
        } => {
            let options = ReportOptions {
                top_n_repos: top_repos,
                last_n_commits: last_commits,
                concurrency: cli.concurrency,
                on_repo_failure: if skip_failed {
                    FailurePolicy::Skip
                } else {
                    FailurePolicy::Abort
                },
            };

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupted, cancelling in-flight tool calls");
                    on_interrupt.cancel();
                }
            });

            let report = report::commits_of_top_repos(&client, &username, &options, &cancel).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Serve => {
            tracing::info!("Starting mcp-github-tools server");
            let service = McpGithubToolsServer::new(Arc::new(client), cli.concurrency);
            let running = service.serve(stdio()).await?;
            running.waiting().await?;
        }
    }

    Ok(())
}
