use std::env;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub courtlistener: CourtListenerConfig,
    pub request: RequestConfig,
    pub limits: LimitsConfig,
    pub logging: LoggingConfig,
}

/// CourtListener API configuration
#[derive(Debug, Clone)]
pub struct CourtListenerConfig {
    pub api_token: String,
    pub base_url: String,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    /// Page size requested from the paged opinions-cited endpoints.
    pub page_size: u32,
}

/// Bounds on resolution batches and graph traversal
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Concurrent backend lookups per resolve batch.
    pub resolve_concurrency: usize,
    /// Candidate cap on AMBIGUOUS results.
    pub max_candidates: usize,
    /// Depth used when analyze_citation_network gets no max_depth.
    pub default_graph_depth: u32,
    /// Node budget used when analyze_citation_network gets no max_nodes.
    pub default_graph_nodes: usize,
    /// Hard ceiling on requested traversal depth.
    pub max_graph_depth: u32,
    /// Hard ceiling on requested node budgets.
    pub max_graph_nodes: usize,
    /// Maximum text length accepted by verify_citations.
    pub max_text_len: usize,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let courtlistener = CourtListenerConfig {
            api_token: env::var("COURTLISTENER_API_TOKEN").map_err(|_| AppError::Config {
                message: "COURTLISTENER_API_TOKEN is required".to_string(),
            })?,
            base_url: env::var("COURTLISTENER_BASE_URL")
                .unwrap_or_else(|_| "https://www.courtlistener.com/api/rest/v4".to_string()),
        };

        let request = RequestConfig {
            timeout_ms: env_parsed("REQUEST_TIMEOUT_MS", 30000),
            page_size: env_parsed("REQUEST_PAGE_SIZE", 50),
        };

        let limits = LimitsConfig {
            resolve_concurrency: env_parsed("RESOLVE_CONCURRENCY", 4),
            max_candidates: env_parsed("MAX_CANDIDATES", 10),
            default_graph_depth: env_parsed("GRAPH_DEFAULT_DEPTH", 2),
            default_graph_nodes: env_parsed("GRAPH_DEFAULT_NODES", 50),
            max_graph_depth: env_parsed("GRAPH_MAX_DEPTH", 4),
            max_graph_nodes: env_parsed("GRAPH_MAX_NODES", 200),
            max_text_len: env_parsed("MAX_TEXT_LEN", 64_000),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Ok(Config {
            courtlistener,
            request,
            limits,
            logging,
        })
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            page_size: 50,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            resolve_concurrency: 4,
            max_candidates: 10,
            default_graph_depth: 2,
            default_graph_nodes: 50,
            max_graph_depth: 4,
            max_graph_nodes: 200,
            max_text_len: 64_000,
        }
    }
}
