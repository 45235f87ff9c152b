use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Summary of a case-law cluster as returned by CourtListener
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseSummary {
    /// Cluster id, the canonical case key in CourtListener.
    #[serde(rename = "id")]
    pub case_id: i64,
    #[serde(default)]
    pub case_name: String,
    #[serde(default)]
    pub court: Option<String>,
    #[serde(default)]
    pub date_filed: Option<NaiveDate>,
    /// How many later opinions cite this case.
    #[serde(default)]
    pub citation_count: u64,
    /// Raw precedential status code, translated at the formatting layer.
    #[serde(default)]
    pub precedential_status: Option<String>,
    #[serde(default)]
    pub absolute_url: Option<String>,
}

/// One entry of a citation-lookup response.
///
/// The endpoint returns one entry per citation it recognized, each carrying
/// the matching clusters (zero for a miss, more than one for duplicates in
/// the underlying data).
#[derive(Debug, Clone, Deserialize)]
pub struct CitationLookupEntry {
    #[serde(default)]
    pub citation: String,
    #[serde(default)]
    pub normalized_citations: Vec<String>,
    /// Per-citation HTTP-style status (200 hit, 404 miss).
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub clusters: Vec<CaseSummary>,
}

/// One page of citation edges from the opinions-cited endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct CitationEdgePage {
    pub entries: Vec<CitationEdgeRecord>,
    /// Cursor for the next page, `None` when exhausted.
    pub next_cursor: Option<String>,
    /// Total edges on the backend side, across all pages.
    pub total: u64,
}

/// A single citation relation to another case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationEdgeRecord {
    /// The case on the other side of the relation.
    pub case_id: i64,
    /// Citation frequency within the opinion ("depth" in CourtListener terms).
    pub weight: u32,
}

/// Wire shape of an opinions-cited page
#[derive(Debug, Deserialize)]
pub(crate) struct OpinionsCitedResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<OpinionsCitedRow>,
}

/// Wire shape of one opinions-cited row; opinion fields are resource URLs
#[derive(Debug, Deserialize)]
pub(crate) struct OpinionsCitedRow {
    #[serde(default)]
    pub depth: Option<u32>,
    #[serde(default)]
    pub citing_opinion: String,
    #[serde(default)]
    pub cited_opinion: String,
}

/// Extract the trailing numeric id from a CourtListener resource URL
pub(crate) fn opinion_id_from_url(url: &str) -> Option<i64> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}
