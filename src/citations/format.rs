use std::sync::Arc;

use serde_json::{json, Value};

use crate::citations::graph::PrecedentGraph;
use crate::citations::resolver::{ResolutionResult, ResolutionStatus};
use crate::courtlistener::CaseSummary;
use crate::translate::CodeTranslator;

/// Renders resolver and graph output as the JSON documents the tools return.
///
/// All presentation decisions live here; the resolver and builder stay
/// wire-format agnostic.
pub struct ResultFormatter {
    translator: Arc<CodeTranslator>,
}

impl ResultFormatter {
    pub fn new(translator: Arc<CodeTranslator>) -> Self {
        Self { translator }
    }

    /// Batch resolution report: per-citation results in input order plus a
    /// status tally.
    pub fn resolution_report(&self, results: &[ResolutionResult]) -> Value {
        let mut found = 0usize;
        let mut not_found = 0usize;
        let mut ambiguous = 0usize;
        let mut errored = 0usize;
        for result in results {
            match result.status {
                ResolutionStatus::Found => found += 1,
                ResolutionStatus::NotFound => not_found += 1,
                ResolutionStatus::Ambiguous => ambiguous += 1,
                ResolutionStatus::Error => errored += 1,
            }
        }

        let citations: Vec<Value> = results.iter().map(|r| self.resolution_entry(r)).collect();

        json!({
            "summary": {
                "total": results.len(),
                "found": found,
                "not_found": not_found,
                "ambiguous": ambiguous,
                "error": errored,
            },
            "citations": citations,
        })
    }

    fn resolution_entry(&self, result: &ResolutionResult) -> Value {
        let mut entry = json!({
            "citation": result.reference.raw_text,
            "status": result.status,
        });
        let obj = entry.as_object_mut().unwrap();

        if let Some(span) = &result.reference.span {
            obj.insert("span".into(), json!({ "start": span.start, "end": span.end }));
        }
        if let Some(case_id) = result.case_id {
            obj.insert("case_id".into(), json!(case_id));
        }
        if let Some(summary) = &result.case_summary {
            obj.insert("case".into(), self.case_record(summary));
        }
        if !result.candidates.is_empty() {
            let candidates: Vec<Value> =
                result.candidates.iter().map(|c| self.case_record(c)).collect();
            obj.insert("candidates".into(), Value::Array(candidates));
        }
        if let Some(error) = &result.error {
            obj.insert(
                "error".into(),
                json!({ "reason": error.reason, "message": error.message }),
            );
        }
        entry
    }

    /// Human-oriented record for one case, with codes translated to labels.
    pub fn case_record(&self, summary: &CaseSummary) -> Value {
        let mut record = json!({
            "case_id": summary.case_id,
            "case_name": summary.case_name,
            "citation_count": summary.citation_count,
        });
        let obj = record.as_object_mut().unwrap();

        if let Some(court) = &summary.court {
            obj.insert("court".into(), json!(court));
        }
        if let Some(date_filed) = summary.date_filed {
            obj.insert("date_filed".into(), json!(date_filed.to_string()));
        }
        if let Some(status) = &summary.precedential_status {
            obj.insert(
                "precedential_status".into(),
                json!(self.translator.translate("precedential_status", status)),
            );
        }
        if let Some(url) = &summary.absolute_url {
            obj.insert("absolute_url".into(), json!(url));
        }
        record
    }

    /// Graph report: stable node ordering by (depth, case_id), normalized
    /// citer → cited edges, and the truncation flag callers must surface.
    pub fn graph_report(&self, graph: &PrecedentGraph) -> Value {
        let nodes: Vec<Value> = graph
            .sorted_nodes()
            .into_iter()
            .map(|node| {
                let mut record = json!({
                    "case_id": node.case_id,
                    "label": node.citation_label,
                    "depth": node.depth,
                    "cited_by_count": node.cited_by_count,
                    "cites_count": node.cites_count,
                });
                if node.partial_edges {
                    record
                        .as_object_mut()
                        .unwrap()
                        .insert("partial_edges".into(), json!(true));
                }
                record
            })
            .collect();

        let edges: Vec<Value> = graph
            .edges()
            .iter()
            .map(|edge| {
                json!({
                    "from": edge.from_case_id,
                    "to": edge.to_case_id,
                    "weight": edge.weight,
                })
            })
            .collect();

        json!({
            "seed_case_id": graph.seed_case_id,
            "direction": graph.direction,
            "node_count": nodes.len(),
            "edge_count": edges.len(),
            "truncated": graph.truncated,
            "nodes": nodes,
            "edges": edges,
        })
    }
}
