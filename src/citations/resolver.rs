use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, warn};

use super::extractor::CitationReference;
use crate::config::LimitsConfig;
use crate::courtlistener::{CaseSummary, CourtListener};
use crate::error::{BackendError, InvalidReference};

/// Outcome category of resolving one citation reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    Found,
    NotFound,
    Ambiguous,
    Error,
}

/// Why a reference could not be resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionError {
    /// Stable reason key (`rate_limited`, `backend_timeout`, ...).
    pub reason: String,
    pub message: String,
}

/// Outcome of resolving one citation reference.
///
/// Exactly one of `case_summary`, `candidates`, `error` is populated,
/// consistent with `status`; the constructors are the only way these are
/// built so the invariant holds by construction.
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    pub reference: CitationReference,
    pub status: ResolutionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_summary: Option<CaseSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<CaseSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResolutionError>,
}

impl ResolutionResult {
    fn base(reference: CitationReference, status: ResolutionStatus) -> Self {
        Self {
            reference,
            status,
            case_id: None,
            case_summary: None,
            candidates: Vec::new(),
            error: None,
        }
    }

    /// Single exact match
    pub fn found(reference: CitationReference, summary: CaseSummary) -> Self {
        let mut result = Self::base(reference, ResolutionStatus::Found);
        result.case_id = Some(summary.case_id);
        result.case_summary = Some(summary);
        result
    }

    /// No match in the citation database
    pub fn not_found(reference: CitationReference) -> Self {
        Self::base(reference, ResolutionStatus::NotFound)
    }

    /// Multiple matches; `candidates` must already be ordered and capped
    pub fn ambiguous(reference: CitationReference, candidates: Vec<CaseSummary>) -> Self {
        let mut result = Self::base(reference, ResolutionStatus::Ambiguous);
        result.candidates = candidates;
        result
    }

    /// Backend failure for this reference only
    pub fn backend_error(reference: CitationReference, err: &BackendError) -> Self {
        let mut result = Self::base(reference, ResolutionStatus::Error);
        result.error = Some(ResolutionError {
            reason: err.kind().to_string(),
            message: err.to_string(),
        });
        result
    }
}

/// Resolver verifying citation references against CourtListener
pub struct CitationResolver {
    backend: Arc<dyn CourtListener>,
    concurrency: usize,
    max_candidates: usize,
}

impl CitationResolver {
    /// Create a resolver over the given backend
    pub fn new(backend: Arc<dyn CourtListener>, limits: &LimitsConfig) -> Self {
        Self {
            backend,
            concurrency: limits.resolve_concurrency.max(1),
            max_candidates: limits.max_candidates.max(1),
        }
    }

    /// Resolve a batch of references. One result per reference, in input
    /// order, no matter how the underlying concurrent lookups complete.
    /// A reference failing or coming back ambiguous never affects the others.
    pub async fn resolve(&self, refs: &[CitationReference]) -> Vec<ResolutionResult> {
        stream::iter(refs.iter().cloned())
            .map(|reference| self.resolve_ref(reference))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Resolve one structured citation, validating inputs before any backend
    /// call.
    pub async fn resolve_one(
        &self,
        volume: u32,
        reporter: &str,
        page: u32,
    ) -> Result<ResolutionResult, InvalidReference> {
        let reference = CitationReference::new(volume, reporter, page)?;
        Ok(self.resolve_ref(reference).await)
    }

    async fn resolve_ref(&self, reference: CitationReference) -> ResolutionResult {
        debug!(citation = %reference.raw_text, "Resolving citation");

        let matches = match self
            .backend
            .find_citation(reference.volume, &reference.reporter, reference.page)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                warn!(citation = %reference.raw_text, error = %e, "Citation lookup failed");
                return ResolutionResult::backend_error(reference, &e);
            }
        };

        match matches.len() {
            0 => ResolutionResult::not_found(reference),
            1 => {
                let summary = matches.into_iter().next().expect("one match");
                ResolutionResult::found(reference, summary)
            }
            n => {
                debug!(citation = %reference.raw_text, matches = n, "Ambiguous citation");
                ResolutionResult::ambiguous(reference, self.rank_candidates(matches))
            }
        }
    }

    /// Order duplicate matches newest-first; equal dates fall back to
    /// case_id ascending so the ordering is deterministic. Capped to keep
    /// the payload bounded.
    fn rank_candidates(&self, mut candidates: Vec<CaseSummary>) -> Vec<CaseSummary> {
        candidates.sort_by(|a, b| {
            b.date_filed
                .cmp(&a.date_filed)
                .then(a.case_id.cmp(&b.case_id))
        });
        candidates.truncate(self.max_candidates);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{case, StaticBackend};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn resolver(backend: StaticBackend) -> CitationResolver {
        CitationResolver::new(Arc::new(backend), &LimitsConfig::default())
    }

    fn reference(volume: u32, page: u32) -> CitationReference {
        CitationReference::new(volume, "U.S.", page).unwrap()
    }

    #[tokio::test]
    async fn test_found_single_match() {
        let mut backend = StaticBackend::default();
        backend.add_citation(576, "U.S.", 644, case(2812209, "Obergefell v. Hodges", 2015));

        let result = resolver(backend).resolve_one(576, "U.S.", 644).await.unwrap();

        assert_eq!(result.status, ResolutionStatus::Found);
        assert_eq!(result.case_id, Some(2812209));
        assert_eq!(
            result.case_summary.as_ref().unwrap().case_name,
            "Obergefell v. Hodges"
        );
        assert!(result.candidates.is_empty());
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_not_found() {
        let result = resolver(StaticBackend::default())
            .resolve_one(999, "U.S.", 1)
            .await
            .unwrap();

        assert_eq!(result.status, ResolutionStatus::NotFound);
        assert!(result.case_id.is_none());
        assert!(result.case_summary.is_none());
    }

    #[tokio::test]
    async fn test_invalid_reference_rejected_before_backend_call() {
        let backend = StaticBackend::default();
        let calls = backend.call_count.clone();
        let resolver = resolver(backend);

        assert!(resolver.resolve_one(0, "U.S.", 1).await.is_err());
        assert!(resolver.resolve_one(1, "", 1).await.is_err());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ambiguous_ordered_by_date_descending() {
        let mut backend = StaticBackend::default();
        backend.add_citation(100, "U.S.", 5, case(11, "Older Case", 1990));
        backend.add_citation(100, "U.S.", 5, case(22, "Newer Case", 2005));

        let result = resolver(backend).resolve_one(100, "U.S.", 5).await.unwrap();

        assert_eq!(result.status, ResolutionStatus::Ambiguous);
        let ids: Vec<i64> = result.candidates.iter().map(|c| c.case_id).collect();
        assert_eq!(ids, vec![22, 11]);
    }

    #[tokio::test]
    async fn test_ambiguous_equal_dates_break_tie_on_case_id() {
        let mut backend = StaticBackend::default();
        let date = NaiveDate::from_ymd_opt(2000, 1, 1);
        let mut a = case(30, "Case B", 2000);
        let mut b = case(20, "Case A", 2000);
        a.date_filed = date;
        b.date_filed = date;
        backend.add_citation(100, "U.S.", 5, a);
        backend.add_citation(100, "U.S.", 5, b);

        let result = resolver(backend).resolve_one(100, "U.S.", 5).await.unwrap();

        let ids: Vec<i64> = result.candidates.iter().map(|c| c.case_id).collect();
        assert_eq!(ids, vec![20, 30]);
    }

    #[tokio::test]
    async fn test_ambiguous_candidates_capped() {
        let mut backend = StaticBackend::default();
        for i in 0..25 {
            backend.add_citation(100, "U.S.", 5, case(i, "Duplicate", 1980 + i as i32));
        }

        let result = resolver(backend).resolve_one(100, "U.S.", 5).await.unwrap();

        assert_eq!(result.status, ResolutionStatus::Ambiguous);
        assert_eq!(result.candidates.len(), 10);
        // newest first
        assert_eq!(result.candidates[0].case_id, 24);
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order_and_length() {
        let mut backend = StaticBackend::default();
        backend.add_citation(410, "U.S.", 113, case(1, "Roe v. Wade", 1973));
        backend.add_citation(576, "U.S.", 644, case(2, "Obergefell v. Hodges", 2015));

        let refs = vec![
            reference(576, 644),
            reference(999, 1),
            reference(410, 113),
        ];
        let results = resolver(backend).resolve(&refs).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].case_id, Some(2));
        assert_eq!(results[1].status, ResolutionStatus::NotFound);
        assert_eq!(results[2].case_id, Some(1));
        for (result, r) in results.iter().zip(&refs) {
            assert_eq!(&result.reference, r);
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_poison_the_batch() {
        let mut backend = StaticBackend::default();
        backend.add_citation(410, "U.S.", 113, case(1, "Roe v. Wade", 1973));
        backend.fail_volume(500);

        let refs = vec![reference(410, 113), reference(500, 1), reference(410, 113)];
        let results = resolver(backend).resolve(&refs).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].status, ResolutionStatus::Found);
        assert_eq!(results[1].status, ResolutionStatus::Error);
        assert_eq!(
            results[1].error.as_ref().unwrap().reason,
            "backend_unavailable"
        );
        assert_eq!(results[2].status, ResolutionStatus::Found);
    }

    #[tokio::test]
    async fn test_rate_limit_reason_is_distinguishable() {
        let mut backend = StaticBackend::default();
        backend.rate_limit_volume(429);

        let results = resolver(backend).resolve(&[reference(429, 1)]).await;

        assert_eq!(results[0].status, ResolutionStatus::Error);
        assert_eq!(results[0].error.as_ref().unwrap().reason, "rate_limited");
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let mut backend = StaticBackend::default();
        backend.add_citation(576, "U.S.", 644, case(2812209, "Obergefell v. Hodges", 2015));
        let resolver = resolver(backend);

        let first = resolver.resolve_one(576, "U.S.", 644).await.unwrap();
        let second = resolver.resolve_one(576, "U.S.", 644).await.unwrap();

        assert_eq!(first.status, second.status);
        assert_eq!(first.case_id, second.case_id);
    }
}
