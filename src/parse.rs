//! Result parsers for tools whose text output needs structure.
//!
//! Required fields are read explicitly so a missing one is reported by name.
//! Nullable fields become `None` when absent or `null`; nothing is defaulted.

use serde_json::{Map, Value};

use crate::error::ParseError;

/// One repository from a `search_repositories` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub updated_at: String,
    pub created_at: String,
    pub private: bool,
    pub fork: bool,
    pub archived: bool,
    pub default_branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub total_count: u64,
    pub incomplete_results: bool,
    /// In the order the server returned them.
    pub repositories: Vec<Repository>,
}

/// One entry of a `list_commits` response, reduced to what reports need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    pub sha: String,
    pub message: String,
    pub html_url: String,
}

struct Fields<'a> {
    obj: &'a Map<String, Value>,
    prefix: String,
}

impl<'a> Fields<'a> {
    fn new(value: &'a Value, path: &str) -> Result<Self, ParseError> {
        let obj = value.as_object().ok_or_else(|| ParseError::InvalidField {
            field: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
            expected: "an object",
        })?;
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}.", path)
        };
        Ok(Self { obj, prefix })
    }

    fn path(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn required(&self, key: &str) -> Result<&'a Value, ParseError> {
        self.obj.get(key).ok_or_else(|| ParseError::MissingField {
            field: self.path(key),
        })
    }

    fn invalid(&self, key: &str, expected: &'static str) -> ParseError {
        ParseError::InvalidField {
            field: self.path(key),
            expected,
        }
    }

    fn str(&self, key: &str) -> Result<String, ParseError> {
        self.required(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(key, "a string"))
    }

    fn u64(&self, key: &str) -> Result<u64, ParseError> {
        self.required(key)?
            .as_u64()
            .ok_or_else(|| self.invalid(key, "a non-negative integer"))
    }

    fn bool(&self, key: &str) -> Result<bool, ParseError> {
        self.required(key)?
            .as_bool()
            .ok_or_else(|| self.invalid(key, "a boolean"))
    }

    fn array(&self, key: &str) -> Result<&'a Vec<Value>, ParseError> {
        self.required(key)?
            .as_array()
            .ok_or_else(|| self.invalid(key, "an array"))
    }

    fn nullable_str(&self, key: &str) -> Result<Option<String>, ParseError> {
        match self.obj.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(key, "a string or null")),
        }
    }
}

fn parse_json(raw: &str, context: &'static str) -> Result<Value, ParseError> {
    serde_json::from_str(raw).map_err(|source| ParseError::Syntax { context, source })
}

fn parse_repository(item: &Value, path: &str) -> Result<Repository, ParseError> {
    let f = Fields::new(item, path)?;
    Ok(Repository {
        id: f.u64("id")?,
        name: f.str("name")?,
        full_name: f.str("full_name")?,
        description: f.nullable_str("description")?,
        html_url: f.str("html_url")?,
        language: f.nullable_str("language")?,
        stargazers_count: f.u64("stargazers_count")?,
        forks_count: f.u64("forks_count")?,
        open_issues_count: f.u64("open_issues_count")?,
        updated_at: f.str("updated_at")?,
        created_at: f.str("created_at")?,
        private: f.bool("private")?,
        fork: f.bool("fork")?,
        archived: f.bool("archived")?,
        default_branch: f.str("default_branch")?,
    })
}

/// Parse the raw text of a `search_repositories` call.
pub fn parse_search_repositories(raw: &str) -> Result<SearchResult, ParseError> {
    let data = parse_json(raw, "search_repositories result")?;
    let root = Fields::new(&data, "")?;

    let repositories = root
        .array("items")?
        .iter()
        .enumerate()
        .map(|(i, item)| parse_repository(item, &format!("items[{}]", i)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchResult {
        total_count: root.u64("total_count")?,
        incomplete_results: root.bool("incomplete_results")?,
        repositories,
    })
}

/// Parse the raw text of a `list_commits` call, keeping at most `limit`
/// entries. Entries past the limit are not inspected.
pub fn parse_list_commits(raw: &str, limit: usize) -> Result<Vec<CommitEntry>, ParseError> {
    let data = parse_json(raw, "list_commits result")?;
    let items = data.as_array().ok_or_else(|| ParseError::InvalidField {
        field: "<root>".to_string(),
        expected: "an array",
    })?;

    items
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, item)| -> Result<CommitEntry, ParseError> {
            let path = format!("[{}]", i);
            let f = Fields::new(item, &path)?;
            let commit = Fields::new(f.required("commit")?, &f.path("commit"))?;
            Ok(CommitEntry {
                sha: f.str("sha")?,
                message: commit.str("message")?,
                html_url: f.str("html_url")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn repo_json() -> Value {
        json!({
            "id": 1296269,
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "description": "This your first repo!",
            "html_url": "https://github.com/octocat/Hello-World",
            "language": null,
            "stargazers_count": 80,
            "forks_count": 9,
            "open_issues_count": 0,
            "updated_at": "2011-01-26T19:14:43Z",
            "created_at": "2011-01-26T19:01:12Z",
            "private": false,
            "fork": false,
            "archived": false,
            "default_branch": "master"
        })
    }

    #[test]
    fn test_parse_search_result() {
        let raw = json!({
            "total_count": 42,
            "incomplete_results": false,
            "items": [repo_json()]
        })
        .to_string();

        let result = parse_search_repositories(&raw).unwrap();
        assert_eq!(result.total_count, 42);
        assert!(!result.incomplete_results);
        assert_eq!(
            result.repositories,
            vec![Repository {
                id: 1296269,
                name: "Hello-World".to_string(),
                full_name: "octocat/Hello-World".to_string(),
                description: Some("This your first repo!".to_string()),
                html_url: "https://github.com/octocat/Hello-World".to_string(),
                language: None,
                stargazers_count: 80,
                forks_count: 9,
                open_issues_count: 0,
                updated_at: "2011-01-26T19:14:43Z".to_string(),
                created_at: "2011-01-26T19:01:12Z".to_string(),
                private: false,
                fork: false,
                archived: false,
                default_branch: "master".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_search_keeps_server_order() {
        let mut a = repo_json();
        a["name"] = json!("a");
        let mut b = repo_json();
        b["name"] = json!("b");
        let raw = json!({"total_count": 2, "incomplete_results": true, "items": [b, a]}).to_string();

        let names: Vec<_> = parse_search_repositories(&raw)
            .unwrap()
            .repositories
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_parse_search_missing_stargazers_count() {
        let mut item = repo_json();
        item.as_object_mut().unwrap().remove("stargazers_count");
        let raw = json!({"total_count": 1, "incomplete_results": false, "items": [item]}).to_string();

        let err = parse_search_repositories(&raw).unwrap_err();
        match &err {
            ParseError::MissingField { field } => assert!(field.ends_with("stargazers_count")),
            other => panic!("expected missing field, got {:?}", other),
        }
        assert!(err.to_string().contains("stargazers_count"));
    }

    #[test]
    fn test_parse_search_absent_nullable_fields() {
        let mut item = repo_json();
        item.as_object_mut().unwrap().remove("description");
        item.as_object_mut().unwrap().remove("language");
        let raw = json!({"total_count": 1, "incomplete_results": false, "items": [item]}).to_string();

        let repo = &parse_search_repositories(&raw).unwrap().repositories[0];
        assert_eq!(repo.description, None);
        assert_eq!(repo.language, None);
    }

    #[test]
    fn test_parse_search_missing_top_level_field() {
        let raw = json!({"incomplete_results": false, "items": []}).to_string();
        match parse_search_repositories(&raw) {
            Err(ParseError::MissingField { field }) => assert_eq!(field, "total_count"),
            other => panic!("expected missing total_count, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_rejects_fractional_counts() {
        let mut item = repo_json();
        item["forks_count"] = json!(9.5);
        let raw = json!({"total_count": 1, "incomplete_results": false, "items": [item]}).to_string();
        assert!(matches!(
            parse_search_repositories(&raw),
            Err(ParseError::InvalidField { .. })
        ));
    }

    #[test]
    fn test_parse_search_malformed_json() {
        let err = parse_search_repositories("{not json").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        assert!(err.to_string().starts_with("Failed to parse search_repositories result"));
    }

    #[test]
    fn test_parse_list_commits() {
        let raw = json!([
            {
                "sha": "abcdef1234567890",
                "commit": {"message": "Fix bug\n\nDetails here"},
                "html_url": "https://github.com/octocat/a/commit/abcdef1234567890"
            }
        ])
        .to_string();

        let commits = parse_list_commits(&raw, usize::MAX).unwrap();
        assert_eq!(
            commits,
            vec![CommitEntry {
                sha: "abcdef1234567890".to_string(),
                message: "Fix bug\n\nDetails here".to_string(),
                html_url: "https://github.com/octocat/a/commit/abcdef1234567890".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_list_commits_missing_message() {
        let raw = json!([{"sha": "abc", "commit": {}, "html_url": "u"}]).to_string();
        match parse_list_commits(&raw, usize::MAX) {
            Err(ParseError::MissingField { field }) => assert_eq!(field, "[0].commit.message"),
            other => panic!("expected missing message, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_commits_ignores_entries_past_limit() {
        let raw = json!([
            {"sha": "aaa", "commit": {"message": "kept"}, "html_url": "u1"},
            {"sha": "bbb", "commit": {"message": "dropped"}, "html_url": null},
            {"garbage": true}
        ])
        .to_string();

        let commits = parse_list_commits(&raw, 1).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].sha, "aaa");

        match parse_list_commits(&raw, 2) {
            Err(ParseError::InvalidField { field, .. }) => assert_eq!(field, "[1].html_url"),
            other => panic!("expected invalid html_url, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_list_commits_requires_array() {
        assert!(matches!(
            parse_list_commits(r#"{"sha": "abc"}"#, 5),
            Err(ParseError::InvalidField { .. })
        ));
    }
}
