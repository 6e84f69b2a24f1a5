use rmcp::model::ErrorData;

pub type Result<T, E = ToolError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid value for {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Tool '{tool}' failed: {message}")]
    Invocation { tool: String, message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Tool call cancelled")]
    Cancelled,
}

/// Failure to turn a tool's raw text into a structured result.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse {context} as JSON: {source}")]
    Syntax {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field {field} is not {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
}

impl ToolError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        ToolError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn invocation(tool: &str, message: impl Into<String>) -> Self {
        ToolError::Invocation {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    pub fn to_mcp_error(&self) -> ErrorData {
        match self {
            ToolError::Validation { .. } => ErrorData::invalid_params(self.to_string(), None),
            ToolError::Configuration(_)
            | ToolError::Invocation { .. }
            | ToolError::Parse(_)
            | ToolError::Cancelled => ErrorData::internal_error(self.to_string(), None),
        }
    }
}
