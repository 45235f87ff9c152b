//! CourtListener backend collaborator.
//!
//! The [`CourtListener`] trait is the seam between the citation core and the
//! HTTP client: the resolver and graph builder only ever see the trait, so
//! tests can substitute a canned backend and the transport can change without
//! touching traversal logic.

mod client;
mod types;

pub use client::CourtListenerClient;
pub use types::{CaseSummary, CitationEdgePage, CitationEdgeRecord, CitationLookupEntry};

use async_trait::async_trait;

use crate::error::BackendResult;

/// Read-only access to the CourtListener case-law database
#[async_trait]
pub trait CourtListener: Send + Sync {
    /// Exact-match lookup of a structured citation. Every matching cluster is
    /// returned; duplicates in the underlying data mean more than one.
    async fn find_citation(
        &self,
        volume: u32,
        reporter: &str,
        page: u32,
    ) -> BackendResult<Vec<CaseSummary>>;

    /// Server-side citation lookup over free text (Eyecite-backed).
    async fn lookup_text(&self, text: &str) -> BackendResult<Vec<CitationLookupEntry>>;

    /// One page of authorities cited by `case_id` (backward citations).
    async fn list_authorities(
        &self,
        case_id: i64,
        cursor: Option<&str>,
    ) -> BackendResult<CitationEdgePage>;

    /// One page of later opinions citing `case_id` (forward citations).
    async fn list_citing(
        &self,
        case_id: i64,
        cursor: Option<&str>,
    ) -> BackendResult<CitationEdgePage>;

    /// Fetch a case summary by cluster id, `None` when the id is unknown.
    async fn fetch_case(&self, case_id: i64) -> BackendResult<Option<CaseSummary>>;
}
