use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LimitsConfig;
use crate::courtlistener::{CitationEdgeRecord, CourtListener};
use crate::error::BackendError;

/// Which citation relation(s) to traverse from the seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Backward: what the seed's lineage cites.
    Authorities,
    /// Forward: what cites the seed's lineage.
    Citing,
    /// Both relations at every node.
    Both,
}

impl Direction {
    fn sides(self) -> &'static [TraversalSide] {
        match self {
            Direction::Authorities => &[TraversalSide::Authorities],
            Direction::Citing => &[TraversalSide::Citing],
            Direction::Both => &[TraversalSide::Authorities, TraversalSide::Citing],
        }
    }
}

/// One concrete relation fetched during expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TraversalSide {
    Authorities,
    Citing,
}

/// Traversal bounds for one build_network call.
///
/// Both the depth and node budgets are mandatory; heavily-cited cases fan
/// out far too fast for an unbounded walk.
#[derive(Debug, Clone, Copy)]
pub struct NetworkOptions {
    pub max_depth: u32,
    pub max_nodes: usize,
    pub direction: Direction,
    /// Fetch case names and citation counts for discovered nodes.
    pub annotate: bool,
}

/// A vertex in a precedent graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseNode {
    pub case_id: i64,
    /// Case name when annotated, otherwise a `case <id>` placeholder.
    pub citation_label: String,
    /// Minimum distance from the seed; BFS discovery order guarantees this.
    pub depth: u32,
    pub cited_by_count: u64,
    pub cites_count: u64,
    /// Set when an edge fetch for this node failed; its edges may be
    /// incomplete but the rest of the graph is intact.
    pub partial_edges: bool,
}

/// A directed citation relation, always stored citer → cited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CitationEdge {
    pub from_case_id: i64,
    pub to_case_id: i64,
    /// Backend-reported citation frequency: how many times the citing
    /// opinion references the cited one. Higher weights mark load-bearing
    /// authorities.
    pub weight: u32,
}

/// Bounded precedent graph around a seed case.
///
/// Owned by the request that built it; nothing is shared or persisted.
#[derive(Debug)]
pub struct PrecedentGraph {
    pub seed_case_id: i64,
    pub direction: Direction,
    /// True when the node budget cut the traversal short.
    pub truncated: bool,
    nodes: HashMap<i64, CaseNode>,
    edges: Vec<CitationEdge>,
    edge_keys: HashSet<(i64, i64)>,
}

impl PrecedentGraph {
    fn new(seed_case_id: i64, direction: Direction) -> Self {
        let mut graph = Self {
            seed_case_id,
            direction,
            truncated: false,
            nodes: HashMap::new(),
            edges: Vec::new(),
            edge_keys: HashSet::new(),
        };
        graph.insert_node(seed_case_id, 0);
        graph
    }

    fn insert_node(&mut self, case_id: i64, depth: u32) {
        self.nodes.insert(
            case_id,
            CaseNode {
                case_id,
                citation_label: format!("case {}", case_id),
                depth,
                cited_by_count: 0,
                cites_count: 0,
                partial_edges: false,
            },
        );
    }

    /// Record an edge unless it is a self-edge or already present. The first
    /// sighting of a pair wins; both traversal sides report the same weight.
    fn add_edge(&mut self, from_case_id: i64, to_case_id: i64, weight: u32) {
        if from_case_id == to_case_id {
            return;
        }
        if self.edge_keys.insert((from_case_id, to_case_id)) {
            self.edges.push(CitationEdge {
                from_case_id,
                to_case_id,
                weight,
            });
        }
    }

    pub fn contains(&self, case_id: i64) -> bool {
        self.nodes.contains_key(&case_id)
    }

    pub fn node(&self, case_id: i64) -> Option<&CaseNode> {
        self.nodes.get(&case_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[CitationEdge] {
        &self.edges
    }

    /// Nodes ordered by (depth, case_id) for stable output.
    pub fn sorted_nodes(&self) -> Vec<&CaseNode> {
        let mut nodes: Vec<&CaseNode> = self.nodes.values().collect();
        nodes.sort_by_key(|n| (n.depth, n.case_id));
        nodes
    }
}

/// Outcome of expanding one node on one side
struct Expansion {
    case_id: i64,
    side: TraversalSide,
    outcome: Result<FetchedEdges, BackendError>,
}

struct FetchedEdges {
    records: Vec<CitationEdgeRecord>,
    /// Backend-reported total for this relation, across all pages.
    total: u64,
    /// A pagination cursor was abandoned because the node budget was
    /// already covered; the relation is only partially materialized.
    more: bool,
}

/// Breadth-first builder of bounded precedent graphs
pub struct PrecedentGraphBuilder {
    backend: Arc<dyn CourtListener>,
    annotate_concurrency: usize,
}

impl PrecedentGraphBuilder {
    /// Create a builder over the given backend
    pub fn new(backend: Arc<dyn CourtListener>, limits: &LimitsConfig) -> Self {
        Self {
            backend,
            annotate_concurrency: limits.resolve_concurrency.max(1),
        }
    }

    /// Build the precedent network around `seed_case_id`.
    ///
    /// Level-barrier BFS: every node of the current depth is expanded
    /// concurrently, but discovered edges are merged into the graph only in
    /// this loop, one expansion at a time, so depth assignment and budget
    /// checks always see a consistent snapshot. Budget exhaustion flips
    /// `truncated` and stops the walk; a single node's fetch failure marks
    /// that node `partial_edges` and the walk continues.
    pub async fn build_network(&self, seed_case_id: i64, options: NetworkOptions) -> PrecedentGraph {
        let max_nodes = options.max_nodes.max(1);
        info!(
            seed = seed_case_id,
            max_depth = options.max_depth,
            max_nodes,
            direction = ?options.direction,
            "Building precedent network"
        );

        let mut graph = PrecedentGraph::new(seed_case_id, options.direction);
        let mut frontier = vec![seed_case_id];

        for level in 0..options.max_depth {
            if frontier.is_empty() {
                break;
            }
            if graph.node_count() >= max_nodes {
                // The budget is spent but undiscovered edges remain behind
                // the unexpanded frontier; the graph is a partial result
                // even when no individual node was refused.
                graph.truncated = true;
                break;
            }

            // Leaf tasks only fetch; the budget hint bounds how many pages
            // they bother pulling, the real budget is enforced on merge.
            let budget_hint = max_nodes - graph.node_count();
            let fetches = frontier.iter().flat_map(|&case_id| {
                options.direction.sides().iter().map(move |&side| {
                    self.fetch_side(case_id, side, budget_hint)
                })
            });
            let expansions = join_all(fetches).await;

            let mut next_frontier = Vec::new();
            for expansion in expansions {
                self.merge(&mut graph, expansion, level + 1, max_nodes, &mut next_frontier);
            }

            debug!(
                level,
                discovered = next_frontier.len(),
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "Level expanded"
            );
            frontier = next_frontier;
        }

        if options.annotate {
            self.annotate(&mut graph).await;
        }

        graph
    }

    /// Fetch all edges on one side of a node, following pagination until the
    /// backend is exhausted or the records on hand already exceed the budget
    /// hint.
    async fn fetch_side(&self, case_id: i64, side: TraversalSide, budget_hint: usize) -> Expansion {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;

        let outcome = loop {
            let page = match side {
                TraversalSide::Authorities => {
                    self.backend.list_authorities(case_id, cursor.as_deref()).await
                }
                TraversalSide::Citing => {
                    self.backend.list_citing(case_id, cursor.as_deref()).await
                }
            };

            match page {
                Ok(page) => {
                    let total = page.total;
                    records.extend(page.entries);
                    match page.next_cursor {
                        Some(next) if records.len() < budget_hint => cursor = Some(next),
                        next => {
                            break Ok(FetchedEdges {
                                records,
                                total,
                                more: next.is_some(),
                            })
                        }
                    }
                }
                Err(e) => break Err(e),
            }
        };

        Expansion {
            case_id,
            side,
            outcome,
        }
    }

    /// Merge one expansion into the graph. Runs on the traversal loop only;
    /// this is the single place nodes and edges are mutated.
    fn merge(
        &self,
        graph: &mut PrecedentGraph,
        expansion: Expansion,
        child_depth: u32,
        max_nodes: usize,
        next_frontier: &mut Vec<i64>,
    ) {
        let node_id = expansion.case_id;
        let fetched = match expansion.outcome {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!(case_id = node_id, error = %e, "Edge fetch failed, continuing traversal");
                if let Some(node) = graph.nodes.get_mut(&node_id) {
                    node.partial_edges = true;
                }
                return;
            }
        };

        // The paged endpoint's total tells us this node's full relation
        // count even when the budget keeps us from materializing it.
        if let Some(node) = graph.nodes.get_mut(&node_id) {
            match expansion.side {
                TraversalSide::Authorities => node.cites_count = fetched.total,
                TraversalSide::Citing => node.cited_by_count = fetched.total,
            }
        }

        if fetched.more {
            graph.truncated = true;
        }

        for record in fetched.records {
            let other = record.case_id;
            if other == node_id {
                // self-citation rows exist in the data; discard
                continue;
            }

            if !graph.contains(other) {
                if graph.node_count() >= max_nodes {
                    graph.truncated = true;
                    continue;
                }
                graph.insert_node(other, child_depth);
                next_frontier.push(other);
            }

            // Normalize to citer → cited regardless of which side found it.
            match expansion.side {
                TraversalSide::Authorities => graph.add_edge(node_id, other, record.weight),
                TraversalSide::Citing => graph.add_edge(other, node_id, record.weight),
            }
        }
    }

    /// Fill in case names and citation counts with bounded-concurrency
    /// cluster fetches. A failed fetch leaves the placeholder label; the
    /// graph structure is already complete at this point.
    async fn annotate(&self, graph: &mut PrecedentGraph) {
        let ids: Vec<i64> = graph.nodes.keys().copied().collect();

        let summaries: Vec<_> = stream::iter(ids)
            .map(|id| {
                let backend = Arc::clone(&self.backend);
                async move { (id, backend.fetch_case(id).await) }
            })
            .buffer_unordered(self.annotate_concurrency)
            .collect()
            .await;

        for (id, fetched) in summaries {
            match fetched {
                Ok(Some(summary)) => {
                    if let Some(node) = graph.nodes.get_mut(&id) {
                        if !summary.case_name.is_empty() {
                            node.citation_label = summary.case_name;
                        }
                        node.cited_by_count = node.cited_by_count.max(summary.citation_count);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(case_id = id, error = %e, "Node annotation failed, keeping placeholder");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{case, StaticBackend};
    use pretty_assertions::assert_eq;

    fn builder(backend: StaticBackend) -> PrecedentGraphBuilder {
        PrecedentGraphBuilder::new(Arc::new(backend), &LimitsConfig::default())
    }

    fn options(direction: Direction, max_depth: u32, max_nodes: usize) -> NetworkOptions {
        NetworkOptions {
            max_depth,
            max_nodes,
            direction,
            annotate: false,
        }
    }

    #[tokio::test]
    async fn test_depth_one_authorities() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(10, &[1, 2, 3]);

        let graph = builder(backend)
            .build_network(10, options(Direction::Authorities, 1, 50))
            .await;

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(!graph.truncated);
        assert_eq!(graph.node(10).unwrap().depth, 0);
        for id in [1, 2, 3] {
            assert_eq!(graph.node(id).unwrap().depth, 1);
            assert!(graph.edges().contains(&CitationEdge {
                from_case_id: 10,
                to_case_id: id,
                weight: 1,
            }));
        }
    }

    #[tokio::test]
    async fn test_citing_edges_still_point_citer_to_cited() {
        let mut backend = StaticBackend::default();
        backend.add_citing(10, &[77, 88]);

        let graph = builder(backend)
            .build_network(10, options(Direction::Citing, 1, 50))
            .await;

        assert_eq!(graph.edge_count(), 2);
        for edge in graph.edges() {
            assert_eq!(edge.to_case_id, 10);
        }
    }

    #[tokio::test]
    async fn test_depth_is_minimum_discovery_distance() {
        // diamond: 10 cites 1 and 2, both cite 3
        let mut backend = StaticBackend::default();
        backend.add_authorities(10, &[1, 2]);
        backend.add_authorities(1, &[3]);
        backend.add_authorities(2, &[3]);
        backend.add_authorities(3, &[]);

        let graph = builder(backend)
            .build_network(10, options(Direction::Authorities, 3, 50))
            .await;

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.node(3).unwrap().depth, 2);
        // both incoming edges to the shared ancestor are kept
        assert_eq!(graph.edge_count(), 4);
    }

    #[tokio::test]
    async fn test_cycles_do_not_loop_or_duplicate() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(1, &[2]);
        backend.add_authorities(2, &[1]);

        let graph = builder(backend)
            .build_network(1, options(Direction::Authorities, 5, 50))
            .await;

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2); // 1→2 and 2→1, each once
        assert_eq!(graph.node(1).unwrap().depth, 0);
        assert_eq!(graph.node(2).unwrap().depth, 1);
    }

    #[tokio::test]
    async fn test_self_edges_discarded() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(5, &[5, 6]);

        let graph = builder(backend)
            .build_network(5, options(Direction::Authorities, 1, 50))
            .await;

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
    }

    #[tokio::test]
    async fn test_truncation_at_node_budget() {
        let mut backend = StaticBackend::default();
        let children: Vec<i64> = (1..=20).collect();
        backend.add_authorities(100, &children);

        let graph = builder(backend)
            .build_network(100, options(Direction::Authorities, 1, 5))
            .await;

        assert_eq!(graph.node_count(), 5);
        assert!(graph.truncated);
    }

    #[tokio::test]
    async fn test_exact_budget_fill_with_pending_frontier_is_truncated() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(100, &[1, 2, 3]);
        backend.add_authorities(1, &[99]);

        let graph = builder(backend)
            .build_network(100, options(Direction::Authorities, 3, 4))
            .await;

        // the first level fills the budget exactly: no node is refused, but
        // node 1's own authorities are never fetched
        assert_eq!(graph.node_count(), 4);
        assert!(graph.node(99).is_none());
        assert!(graph.truncated);
    }

    #[tokio::test]
    async fn test_abandoned_pagination_is_truncated() {
        let mut backend = StaticBackend::default();
        let children: Vec<i64> = (1..=10).collect();
        backend.add_authorities(100, &children);
        backend.paginate_edges(2);

        let graph = builder(backend)
            .build_network(100, options(Direction::Authorities, 1, 3))
            .await;

        // paging stopped at the budget hint with a cursor outstanding
        assert_eq!(graph.node_count(), 3);
        assert!(graph.truncated);
    }

    #[tokio::test]
    async fn test_edge_weights_carried_from_backend() {
        let mut backend = StaticBackend::default();
        backend.add_weighted_authorities(10, &[(1, 4), (2, 1)]);

        let graph = builder(backend)
            .build_network(10, options(Direction::Authorities, 1, 50))
            .await;

        assert!(graph.edges().contains(&CitationEdge {
            from_case_id: 10,
            to_case_id: 1,
            weight: 4,
        }));
        assert!(graph.edges().contains(&CitationEdge {
            from_case_id: 10,
            to_case_id: 2,
            weight: 1,
        }));
    }

    #[tokio::test]
    async fn test_within_budget_not_truncated() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(100, &[1, 2]);

        let graph = builder(backend)
            .build_network(100, options(Direction::Authorities, 2, 50))
            .await;

        assert!(!graph.truncated);
    }

    #[tokio::test]
    async fn test_max_depth_leaves_are_not_expanded() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(10, &[1]);
        backend.add_authorities(1, &[2]);

        let graph = builder(backend)
            .build_network(10, options(Direction::Authorities, 1, 50))
            .await;

        assert_eq!(graph.node_count(), 2);
        assert!(graph.node(2).is_none());
        assert!(!graph.truncated);
    }

    #[tokio::test]
    async fn test_failed_node_degrades_to_partial_edges() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(10, &[1, 2]);
        backend.add_authorities(2, &[3]);
        backend.fail_edges_for(1);

        let graph = builder(backend)
            .build_network(10, options(Direction::Authorities, 2, 50))
            .await;

        assert!(graph.node(1).unwrap().partial_edges);
        assert!(!graph.node(2).unwrap().partial_edges);
        // traversal continued through the healthy sibling
        assert_eq!(graph.node(3).unwrap().depth, 2);
    }

    #[tokio::test]
    async fn test_both_directions_from_seed() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(10, &[1]);
        backend.add_citing(10, &[99]);

        let graph = builder(backend)
            .build_network(10, options(Direction::Both, 1, 50))
            .await;

        assert_eq!(graph.node_count(), 3);
        assert!(graph.edges().contains(&CitationEdge {
            from_case_id: 10,
            to_case_id: 1,
            weight: 1,
        }));
        assert!(graph.edges().contains(&CitationEdge {
            from_case_id: 99,
            to_case_id: 10,
            weight: 1,
        }));
    }

    #[tokio::test]
    async fn test_relation_totals_recorded_on_expanded_nodes() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(10, &[1, 2, 3]);
        backend.add_citing(10, &[4]);

        let graph = builder(backend)
            .build_network(10, options(Direction::Both, 1, 50))
            .await;

        let seed = graph.node(10).unwrap();
        assert_eq!(seed.cites_count, 3);
        assert_eq!(seed.cited_by_count, 1);
    }

    #[tokio::test]
    async fn test_annotation_fills_labels_and_counts() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(10, &[1]);
        let mut seed = case(10, "Obergefell v. Hodges", 2015);
        seed.citation_count = 1280;
        backend.add_case(seed);
        backend.add_case(case(1, "Loving v. Virginia", 1967));

        let graph = builder(backend)
            .build_network(
                10,
                NetworkOptions {
                    max_depth: 1,
                    max_nodes: 50,
                    direction: Direction::Authorities,
                    annotate: true,
                },
            )
            .await;

        assert_eq!(graph.node(10).unwrap().citation_label, "Obergefell v. Hodges");
        assert_eq!(graph.node(10).unwrap().cited_by_count, 1280);
        assert_eq!(graph.node(1).unwrap().citation_label, "Loving v. Virginia");
    }

    #[tokio::test]
    async fn test_annotation_failure_keeps_placeholder() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(10, &[1]);
        // no case records registered: fetch_case returns None

        let graph = builder(backend)
            .build_network(
                10,
                NetworkOptions {
                    max_depth: 1,
                    max_nodes: 50,
                    direction: Direction::Authorities,
                    annotate: true,
                },
            )
            .await;

        assert_eq!(graph.node(1).unwrap().citation_label, "case 1");
    }

    #[tokio::test]
    async fn test_sorted_nodes_stable_order() {
        let mut backend = StaticBackend::default();
        backend.add_authorities(10, &[3, 1, 2]);

        let graph = builder(backend)
            .build_network(10, options(Direction::Authorities, 1, 50))
            .await;

        let ids: Vec<i64> = graph.sorted_nodes().iter().map(|n| n.case_id).collect();
        assert_eq!(ids, vec![10, 1, 2, 3]);
    }
}
