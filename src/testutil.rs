//! In-memory backend and fixtures shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::courtlistener::{
    CaseSummary, CitationEdgePage, CitationEdgeRecord, CitationLookupEntry, CourtListener,
};
use crate::error::{BackendError, BackendResult};

/// Minimal case fixture; June dates so ranking tests only vary the year.
pub fn case(case_id: i64, name: &str, year: i32) -> CaseSummary {
    CaseSummary {
        case_id,
        case_name: name.to_string(),
        court: None,
        date_filed: NaiveDate::from_ymd_opt(year, 6, 26),
        citation_count: 0,
        precedential_status: Some("Published".to_string()),
        absolute_url: None,
    }
}

/// Scriptable CourtListener with canned responses and failure injection.
///
/// Configure before wrapping in an Arc; all state is fixed at that point
/// except the call counter.
#[derive(Default)]
pub struct StaticBackend {
    citations: HashMap<(u32, String, u32), Vec<CaseSummary>>,
    authorities: HashMap<i64, Vec<(i64, u32)>>,
    citing: HashMap<i64, Vec<(i64, u32)>>,
    cases: HashMap<i64, CaseSummary>,
    fail_volumes: HashSet<u32>,
    rate_limit_volumes: HashSet<u32>,
    fail_edges: HashSet<i64>,
    page_limit: Option<usize>,
    pub call_count: Arc<AtomicUsize>,
}

impl StaticBackend {
    pub fn add_citation(&mut self, volume: u32, reporter: &str, page: u32, summary: CaseSummary) {
        self.citations
            .entry((volume, reporter.to_string(), page))
            .or_default()
            .push(summary);
    }

    /// Lookups for this volume fail with a 500.
    pub fn fail_volume(&mut self, volume: u32) {
        self.fail_volumes.insert(volume);
    }

    /// Lookups for this volume fail with a 429.
    pub fn rate_limit_volume(&mut self, volume: u32) {
        self.rate_limit_volumes.insert(volume);
    }

    pub fn add_authorities(&mut self, case_id: i64, cited: &[i64]) {
        self.authorities
            .insert(case_id, cited.iter().map(|&id| (id, 1)).collect());
    }

    /// Authorities with explicit per-edge citation frequencies.
    pub fn add_weighted_authorities(&mut self, case_id: i64, cited: &[(i64, u32)]) {
        self.authorities.insert(case_id, cited.to_vec());
    }

    pub fn add_citing(&mut self, case_id: i64, citers: &[i64]) {
        self.citing
            .insert(case_id, citers.iter().map(|&id| (id, 1)).collect());
    }

    /// Serve edge listings in pages of `limit` rows, with the next offset as
    /// the cursor.
    pub fn paginate_edges(&mut self, limit: usize) {
        self.page_limit = Some(limit.max(1));
    }

    pub fn add_case(&mut self, summary: CaseSummary) {
        self.cases.insert(summary.case_id, summary);
    }

    /// Edge listings for this case fail on both sides.
    pub fn fail_edges_for(&mut self, case_id: i64) {
        self.fail_edges.insert(case_id);
    }

    fn edge_page(
        &self,
        case_id: i64,
        cursor: Option<&str>,
        table: &HashMap<i64, Vec<(i64, u32)>>,
    ) -> BackendResult<CitationEdgePage> {
        if self.fail_edges.contains(&case_id) {
            return Err(BackendError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        let rows = table.get(&case_id).cloned().unwrap_or_default();
        let total = rows.len() as u64;
        let offset: usize = cursor
            .and_then(|c| c.parse().ok())
            .unwrap_or(0)
            .min(rows.len());
        let end = match self.page_limit {
            Some(limit) => rows.len().min(offset + limit),
            None => rows.len(),
        };
        Ok(CitationEdgePage {
            total,
            entries: rows[offset..end]
                .iter()
                .map(|&(id, weight)| CitationEdgeRecord {
                    case_id: id,
                    weight,
                })
                .collect(),
            next_cursor: (end < rows.len()).then(|| end.to_string()),
        })
    }
}

#[async_trait]
impl CourtListener for StaticBackend {
    async fn find_citation(
        &self,
        volume: u32,
        reporter: &str,
        page: u32,
    ) -> BackendResult<Vec<CaseSummary>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_volumes.contains(&volume) {
            return Err(BackendError::Api {
                status: 500,
                message: "internal server error".to_string(),
            });
        }
        if self.rate_limit_volumes.contains(&volume) {
            return Err(BackendError::RateLimited { wait_until: None });
        }
        Ok(self
            .citations
            .get(&(volume, reporter.to_string(), page))
            .cloned()
            .unwrap_or_default())
    }

    async fn lookup_text(&self, _text: &str) -> BackendResult<Vec<CitationLookupEntry>> {
        Ok(Vec::new())
    }

    async fn list_authorities(
        &self,
        case_id: i64,
        cursor: Option<&str>,
    ) -> BackendResult<CitationEdgePage> {
        self.edge_page(case_id, cursor, &self.authorities)
    }

    async fn list_citing(
        &self,
        case_id: i64,
        cursor: Option<&str>,
    ) -> BackendResult<CitationEdgePage> {
        self.edge_page(case_id, cursor, &self.citing)
    }

    async fn fetch_case(&self, case_id: i64) -> BackendResult<Option<CaseSummary>> {
        Ok(self.cases.get(&case_id).cloned())
    }
}
