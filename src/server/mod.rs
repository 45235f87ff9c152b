//! Server module for MCP protocol handling.
//!
//! This module provides:
//! - MCP server implementation over stdio
//! - Tool call handlers and routing
//! - Shared application state management

mod handlers;
mod mcp;

pub use handlers::*;
pub use mcp::*;

use std::sync::Arc;

use crate::citations::{CitationExtractor, CitationResolver, PrecedentGraphBuilder, ResultFormatter};
use crate::config::Config;
use crate::courtlistener::CourtListener;
use crate::translate::CodeTranslator;

/// Application state shared across handlers.
///
/// All components are constructed once at startup over a single backend
/// handle; requests never hold mutable state here.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Citation backend, trait-object so tests can substitute a fake.
    pub backend: Arc<dyn CourtListener>,
    /// Regex-based citation scanner.
    pub extractor: CitationExtractor,
    /// Batch citation resolver.
    pub resolver: CitationResolver,
    /// Bounded precedent network builder.
    pub graph_builder: PrecedentGraphBuilder,
    /// Code-to-label translator.
    pub translator: Arc<CodeTranslator>,
    /// Tool output renderer.
    pub formatter: ResultFormatter,
}

impl AppState {
    /// Create new application state over the given backend
    pub fn new(config: Config, backend: Arc<dyn CourtListener>) -> Self {
        let translator = Arc::new(CodeTranslator::new());
        let extractor = CitationExtractor::new();
        let resolver = CitationResolver::new(Arc::clone(&backend), &config.limits);
        let graph_builder = PrecedentGraphBuilder::new(Arc::clone(&backend), &config.limits);
        let formatter = ResultFormatter::new(Arc::clone(&translator));

        Self {
            config,
            backend,
            extractor,
            resolver,
            graph_builder,
            translator,
            formatter,
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;
