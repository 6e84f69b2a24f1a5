//! Typed client for the tools of a GitHub MCP server, reached through a local
//! tool bridge.
//!
//! Provides validated request records for `search_repositories` and
//! `list_commits`, parsers for their results, and a report of the latest
//! commits in a user's most starred repositories.

pub mod client;
pub mod config;
pub mod error;
pub mod params;
pub mod parse;
pub mod report;
pub mod secret;
pub mod server;
pub mod tools;
