//! Typed wrappers for the GitHub MCP server's tools.
//!
//! Each tool module pairs a validated request record with `run` (raw text)
//! and, where the output has a known shape, `run_parsed`.

pub mod list_commits;
pub mod search_repositories;

use serde_json::Value;

use crate::client::ToolArgs;
use crate::error::ToolError;

pub use list_commits::CommitListParams;
pub use search_repositories::SearchParams;

fn insert_opt(args: &mut ToolArgs, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        args.insert(key.to_string(), value.into());
    }
}

fn required_text(field: &'static str, value: String) -> Result<String, ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::validation(field, "must not be empty"));
    }
    Ok(value)
}
