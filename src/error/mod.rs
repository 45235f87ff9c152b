use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("CourtListener error: {0}")]
    Backend(#[from] BackendError),

    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// CourtListener API errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited by CourtListener{}", wait_until.as_deref().map(|w| format!(" (wait until {w})")).unwrap_or_default())]
    RateLimited { wait_until: Option<String> },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BackendError {
    /// Short machine-readable reason, surfaced on per-item ERROR results so a
    /// caller can tell a rate limit apart from an outage without parsing text.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Api { status, .. } if *status >= 500 => "backend_unavailable",
            BackendError::Api { .. } => "backend_error",
            BackendError::RateLimited { .. } => "rate_limited",
            BackendError::Timeout { .. } => "backend_timeout",
            BackendError::InvalidResponse { .. } => "invalid_payload",
            BackendError::Http(_) => "backend_unavailable",
        }
    }
}

/// A citation reference that failed validation before any backend call
#[derive(Debug, Error)]
#[error("Invalid citation reference: {message}")]
pub struct InvalidReference {
    /// What was wrong with the reference.
    pub message: String,
}

impl InvalidReference {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// MCP protocol errors
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("Invalid parameters for {tool_name}: {message}")]
    InvalidParameters { tool_name: String, message: String },

    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<AppError> for McpError {
    fn from(err: AppError) -> Self {
        McpError::ExecutionFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for CourtListener operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, McpError>;
