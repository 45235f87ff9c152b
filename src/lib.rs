//! # MCP CourtListener Citations Server
//!
//! A Model Context Protocol (MCP) server for legal citation research,
//! backed by the CourtListener REST API.
//!
//! ## Features
//!
//! - **Citation Verification**: Extract reporter citations from free text and
//!   resolve each one to the matching case, or check a single structured
//!   citation
//! - **Authorities Lookup**: List the opinions a case relies on
//! - **Citing Opinions**: List the later opinions that rely on a case
//! - **Citation Networks**: Bounded breadth-first traversal of the citation
//!   graph around a seed case, with depth and node budgets
//! - **Code Translation**: CourtListener's internal codes rendered as
//!   human-readable labels in every response
//!
//! ## Architecture
//!
//! ```text
//! MCP Client → MCP Server (Rust) → CourtListener REST API (HTTP)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mcp_courtlistener_citations::{Config, AppState, McpServer};
//! use mcp_courtlistener_citations::courtlistener::CourtListenerClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let backend = CourtListenerClient::new(&config.courtlistener, config.request.clone())?;
//!     let state = Arc::new(AppState::new(config, Arc::new(backend)));
//!     let server = McpServer::new(state);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Citation extraction, resolution, graph traversal, and formatting.
pub mod citations;
/// Configuration management for the MCP server.
pub mod config;
/// CourtListener API client and types.
pub mod courtlistener;
/// Error types and result aliases for the application.
pub mod error;
/// MCP server implementation and request handling.
pub mod server;
/// Static code-to-label translation tables.
pub mod translate;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, McpServer, SharedState};
