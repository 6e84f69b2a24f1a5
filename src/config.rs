use serde::Serialize;

use crate::error::ToolError;
use crate::secret::{HeaderTemplates, ResolvedHeaders, SecretResolver};

pub const HOST_ENV: &str = "TOOL_SERVER_HOST";
pub const PORT_ENV: &str = "TOOL_SERVER_PORT";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8900;

pub const GITHUB_SERVER_NAME: &str = "github";
pub const GITHUB_SERVER_URL: &str = "https://api.githubcopilot.com/mcp/";
pub const DEFAULT_SECRET_NAME: &str = "GITHUB_API_KEY";

/// Local endpoint that proxies tool calls to the remote MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolServerAddress {
    pub host: String,
    pub port: u16,
}

impl Default for ToolServerAddress {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ToolServerAddress {
    /// Read `TOOL_SERVER_HOST` / `TOOL_SERVER_PORT`, falling back to `localhost:8900`.
    pub fn from_env() -> Result<Self, ToolError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ToolError> {
        let host = lookup(HOST_ENV)
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_ENV).filter(|p| !p.is_empty()) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                ToolError::Configuration(format!(
                    "{} must be a port number, got '{}'",
                    PORT_ENV, raw
                ))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }

    /// Bridge endpoint. IPv6 literals are bracketed.
    pub fn run_url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}/run", self.host, self.port)
        } else {
            format!("http://{}:{}/run", self.host, self.port)
        }
    }
}

/// Identity of one remote MCP server as seen through the tool bridge.
///
/// Immutable once built; share it freely between concurrent calls.
#[derive(Debug, Clone)]
pub struct ToolClientConfig {
    server_name: String,
    server_url: String,
    headers: HeaderTemplates,
    address: ToolServerAddress,
}

/// Connection parameters sent with every call, secrets already substituted.
#[derive(Debug, Serialize)]
pub struct ServerParams<'a> {
    pub url: &'a str,
    #[serde(skip_serializing_if = "ResolvedHeaders::is_empty")]
    pub headers: ResolvedHeaders,
}

impl ToolClientConfig {
    pub fn new(
        server_name: impl Into<String>,
        server_url: impl Into<String>,
        headers: HeaderTemplates,
        address: ToolServerAddress,
    ) -> Result<Self, ToolError> {
        let server_name = server_name.into();
        let server_url = server_url.into();
        if server_name.is_empty() {
            return Err(ToolError::Configuration(
                "server name must not be empty".to_string(),
            ));
        }
        if server_url.is_empty() {
            return Err(ToolError::Configuration(
                "server URL must not be empty".to_string(),
            ));
        }
        let run_url = address.run_url();
        if let Err(e) = reqwest::Url::parse(&run_url) {
            return Err(ToolError::Configuration(format!(
                "tool server address '{}' is not a valid URL: {}",
                run_url, e
            )));
        }
        Ok(Self {
            server_name,
            server_url,
            headers,
            address,
        })
    }

    /// GitHub's hosted MCP server, authorized with `Bearer ${secret_name}`.
    pub fn github(address: ToolServerAddress, secret_name: &str) -> Result<Self, ToolError> {
        Self::github_at(GITHUB_SERVER_URL, address, secret_name)
    }

    pub fn github_at(
        server_url: &str,
        address: ToolServerAddress,
        secret_name: &str,
    ) -> Result<Self, ToolError> {
        let headers = HeaderTemplates::new()
            .with("Authorization", &format!("Bearer ${{{}}}", secret_name))?;
        Self::new(GITHUB_SERVER_NAME, server_url, headers, address)
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn address(&self) -> &ToolServerAddress {
        &self.address
    }

    pub fn server_params(
        &self,
        secrets: &dyn SecretResolver,
    ) -> Result<ServerParams<'_>, ToolError> {
        Ok(ServerParams {
            url: &self.server_url,
            headers: self.headers.resolve(secrets)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_address_defaults() {
        let addr = ToolServerAddress::from_lookup(lookup(&[])).unwrap();
        assert_eq!(addr, ToolServerAddress::default());
        assert_eq!(addr.run_url(), "http://localhost:8900/run");
    }

    #[test]
    fn test_address_from_env_values() {
        let addr = ToolServerAddress::from_lookup(lookup(&[
            (HOST_ENV, "bridge.internal"),
            (PORT_ENV, "9100"),
        ]))
        .unwrap();
        assert_eq!(addr.host, "bridge.internal");
        assert_eq!(addr.port, 9100);
    }

    #[test]
    fn test_address_rejects_bad_port() {
        let err = ToolServerAddress::from_lookup(lookup(&[(PORT_ENV, "eighty")])).unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));
    }

    #[test]
    fn test_github_preset() {
        let config = ToolClientConfig::github(ToolServerAddress::default(), "GH_TOKEN").unwrap();
        assert_eq!(config.server_name(), "github");
        assert_eq!(config.server_url(), GITHUB_SERVER_URL);

        let secrets: HashMap<String, String> =
            [("GH_TOKEN".to_string(), "abc".to_string())].into();
        let params = config.server_params(&secrets).unwrap();
        assert_eq!(params.headers.get("Authorization"), Some("Bearer abc"));
    }

    #[test]
    fn test_server_params_fail_without_secret() {
        let config = ToolClientConfig::github(ToolServerAddress::default(), "GH_TOKEN").unwrap();
        let secrets: HashMap<String, String> = HashMap::new();
        assert!(matches!(
            config.server_params(&secrets),
            Err(ToolError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_server_name_rejected() {
        let result = ToolClientConfig::new(
            "",
            GITHUB_SERVER_URL,
            HeaderTemplates::new(),
            ToolServerAddress::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let addr = ToolServerAddress {
            host: "::1".to_string(),
            port: 8900,
        };
        assert_eq!(addr.run_url(), "http://[::1]:8900/run");
        assert!(ToolClientConfig::github(addr, "GH_TOKEN").is_ok());

        let already = ToolServerAddress {
            host: "[fe80::1]".to_string(),
            port: 9000,
        };
        assert_eq!(already.run_url(), "http://[fe80::1]:9000/run");
    }

    #[test]
    fn test_unusable_host_rejected_at_construction() {
        let addr = ToolServerAddress {
            host: "bad host".to_string(),
            port: 8900,
        };
        match ToolClientConfig::github(addr, "GH_TOKEN") {
            Err(ToolError::Configuration(message)) => assert!(message.contains("bad host")),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }
}
