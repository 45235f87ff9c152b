//! Citation resolution and precedent-network core.
//!
//! Three cooperating pieces: [`CitationExtractor`] scans free text for
//! citation-shaped substrings, [`CitationResolver`] verifies references
//! against the CourtListener citation database, and
//! [`PrecedentGraphBuilder`] walks forward/backward citation edges into a
//! bounded graph. [`ResultFormatter`] renders all of it into the structured
//! records the MCP tools return.

mod extractor;
mod format;
mod graph;
mod resolver;

pub use extractor::{CitationExtractor, CitationMatches, CitationReference, Span};
pub use format::ResultFormatter;
pub use graph::{
    CaseNode, CitationEdge, Direction, NetworkOptions, PrecedentGraph, PrecedentGraphBuilder,
};
pub use resolver::{CitationResolver, ResolutionError, ResolutionResult, ResolutionStatus};
