//! Header templates with `${NAME}` secret placeholders.
//!
//! Templates are stored unresolved and expanded against a [`SecretResolver`]
//! on every call, so a rotated secret is picked up without rebuilding the
//! client.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::ToolError;

/// Source of secret values referenced by `${NAME}` placeholders.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<String>;
}

/// Resolves placeholders from the process environment at lookup time.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretResolver for EnvSecrets {
    fn resolve(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl SecretResolver for HashMap<String, String> {
    fn resolve(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Secret(String),
}

/// A header value such as `Bearer ${GITHUB_API_KEY}`.
#[derive(Clone, PartialEq, Eq)]
pub struct HeaderTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl HeaderTemplate {
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        let mut segments = Vec::new();
        let mut rest = raw;

        while let Some(start) = rest.find("${") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                ToolError::Configuration(format!("unterminated placeholder in header '{}'", raw))
            })?;
            let name = &after[..end];
            if name.is_empty() {
                return Err(ToolError::Configuration(format!(
                    "empty placeholder in header '{}'",
                    raw
                )));
            }
            segments.push(Segment::Secret(name.to_string()));
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Names of the secrets this template refers to, in order of appearance.
    pub fn secret_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Secret(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn resolve(&self, secrets: &dyn SecretResolver) -> Result<String, ToolError> {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Secret(name) => {
                    let value = secrets.resolve(name).ok_or_else(|| {
                        ToolError::Configuration(format!("secret {} is not set", name))
                    })?;
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Debug for HeaderTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HeaderTemplate").field(&self.raw).finish()
    }
}

/// Header name to template. Ordered so the wire payload is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTemplates(BTreeMap<String, HeaderTemplate>);

impl HeaderTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), ToolError> {
        self.0.insert(name.to_string(), HeaderTemplate::parse(value)?);
        Ok(())
    }

    pub fn with(mut self, name: &str, value: &str) -> Result<Self, ToolError> {
        self.insert(name, value)?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn resolve(&self, secrets: &dyn SecretResolver) -> Result<ResolvedHeaders, ToolError> {
        self.0
            .iter()
            .map(|(name, template)| -> Result<(String, String), ToolError> {
                Ok((name.clone(), template.resolve(secrets)?))
            })
            .collect::<Result<BTreeMap<_, _>, ToolError>>()
            .map(ResolvedHeaders)
    }
}

/// Headers with secrets substituted. `Debug` prints header names only.
#[derive(Clone, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ResolvedHeaders(BTreeMap<String, String>);

impl ResolvedHeaders {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ResolvedHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}
