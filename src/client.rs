//! Remote tool invocation through the local tool bridge.
//!
//! A [`ToolClient`] addresses one MCP server (by logical name and URL) via a
//! bridge listening on `host:port`. Each call posts
//! `{server_name, server_params, tool_name, tool_args}` to `/run` and hands
//! back the tool's text result without interpreting it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::config::{ServerParams, ToolClientConfig};
use crate::error::{Result, ToolError};
use crate::secret::{EnvSecrets, SecretResolver};

/// Argument map sent as `tool_args`.
pub type ToolArgs = Map<String, Value>;

/// Anything that can run a named tool and return its raw text result.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn invoke(
        &self,
        tool_name: &str,
        args: ToolArgs,
        cancel: &CancellationToken,
    ) -> Result<String>;
}

#[derive(Serialize)]
struct RunRequest<'a> {
    server_name: &'a str,
    server_params: ServerParams<'a>,
    tool_name: &'a str,
    tool_args: &'a ToolArgs,
}

#[derive(Clone)]
pub struct ToolClient {
    config: Arc<ToolClientConfig>,
    secrets: Arc<dyn SecretResolver>,
    http: reqwest::Client,
}

impl ToolClient {
    /// Client resolving header secrets from the process environment.
    pub fn new(config: ToolClientConfig) -> Self {
        Self::with_secrets(config, EnvSecrets)
    }

    pub fn with_secrets(config: ToolClientConfig, secrets: impl SecretResolver + 'static) -> Self {
        Self {
            config: Arc::new(config),
            secrets: Arc::new(secrets),
            http: reqwest::Client::new(),
        }
    }

    async fn send(&self, tool_name: &str, request: &RunRequest<'_>) -> Result<String> {
        let response = self
            .http
            .post(self.config.address().run_url())
            .json(request)
            .send()
            .await
            .map_err(|e| ToolError::invocation(tool_name, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::invocation(tool_name, e.to_string()))?;

        if !status.is_success() {
            return Err(ToolError::invocation(
                tool_name,
                format!("HTTP {}: {}", status, body.trim()),
            ));
        }

        unwrap_result(tool_name, body)
    }
}

impl std::fmt::Debug for ToolClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ToolInvoker for ToolClient {
    async fn invoke(
        &self,
        tool_name: &str,
        args: ToolArgs,
        cancel: &CancellationToken,
    ) -> Result<String> {
        if cancel.is_cancelled() {
            return Err(ToolError::Cancelled);
        }

        let request = RunRequest {
            server_name: self.config.server_name(),
            server_params: self.config.server_params(self.secrets.as_ref())?,
            tool_name,
            tool_args: &args,
        };

        tracing::debug!(
            tool = tool_name,
            server = self.config.server_name(),
            arg_count = args.len(),
            "Invoking tool"
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(tool = tool_name, "Tool call cancelled");
                Err(ToolError::Cancelled)
            }
            result = self.send(tool_name, &request) => result,
        }
    }
}

/// Strip the bridge's `{"result": ...}` / `{"error": ...}` envelope.
fn unwrap_result(tool_name: &str, body: String) -> Result<String> {
    let Ok(Value::Object(mut envelope)) = serde_json::from_str::<Value>(&body) else {
        return Ok(body);
    };

    match envelope.remove("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(message)) => return Err(ToolError::invocation(tool_name, message)),
        Some(other) => return Err(ToolError::invocation(tool_name, other.to_string())),
    }

    match envelope.remove("result") {
        Some(Value::String(text)) => Ok(text),
        Some(other) => Ok(other.to_string()),
        None => Ok(body),
    }
}
