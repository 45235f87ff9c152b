use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::SharedState;
use crate::citations::{CitationReference, Direction, NetworkOptions};
use crate::error::{McpError, McpResult};

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<Value> {
    info!(tool = %tool_name, "Routing tool call");

    match tool_name {
        "verify_citations" => handle_verify_citations(state, arguments).await,
        "find_authorities_cited" => handle_find_authorities(state, arguments).await,
        "find_citing_opinions" => handle_find_citing(state, arguments).await,
        "analyze_citation_network" => handle_citation_network(state, arguments).await,
        _ => Err(McpError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    }
}

/// Handle verify_citations: either scan free text or check one structured
/// citation. The two input shapes are mutually exclusive.
async fn handle_verify_citations(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    #[derive(Deserialize)]
    struct VerifyParams {
        text: Option<String>,
        volume: Option<u32>,
        reporter: Option<String>,
        page: Option<u32>,
    }

    let params: VerifyParams = parse_arguments("verify_citations", arguments)?;
    let has_structured =
        params.volume.is_some() || params.reporter.is_some() || params.page.is_some();

    let references = match (params.text, has_structured) {
        (Some(_), true) => {
            return Err(invalid_params(
                "verify_citations",
                "Provide either text or volume/reporter/page, not both",
            ));
        }
        (Some(text), false) => {
            let max_len = state.config.limits.max_text_len;
            // the cap counts characters, not bytes
            if text.chars().count() > max_len {
                return Err(invalid_params(
                    "verify_citations",
                    format!("text exceeds maximum length of {} characters", max_len),
                ));
            }
            state.extractor.extract(&text)
        }
        (None, true) => {
            let (volume, reporter, page) = match (params.volume, params.reporter, params.page) {
                (Some(v), Some(r), Some(p)) => (v, r, p),
                _ => {
                    return Err(invalid_params(
                        "verify_citations",
                        "Structured lookup requires volume, reporter, and page together",
                    ));
                }
            };
            let reference = CitationReference::new(volume, &reporter, page)
                .map_err(|e| invalid_params("verify_citations", e.to_string()))?;
            vec![reference]
        }
        (None, false) => {
            return Err(invalid_params(
                "verify_citations",
                "Provide text or volume/reporter/page",
            ));
        }
    };

    let results = state.resolver.resolve(&references).await;
    Ok(state.formatter.resolution_report(&results))
}

#[derive(Deserialize)]
struct CaseParams {
    case_id: i64,
}

/// Handle find_authorities_cited: the cases one opinion relies on.
async fn handle_find_authorities(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: CaseParams = parse_arguments("find_authorities_cited", arguments)?;
    single_level_graph(state, params.case_id, Direction::Authorities).await
}

/// Handle find_citing_opinions: the later cases that rely on one opinion.
async fn handle_find_citing(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: CaseParams = parse_arguments("find_citing_opinions", arguments)?;
    single_level_graph(state, params.case_id, Direction::Citing).await
}

async fn single_level_graph(
    state: &SharedState,
    case_id: i64,
    direction: Direction,
) -> McpResult<Value> {
    let options = NetworkOptions {
        max_depth: 1,
        max_nodes: state.config.limits.default_graph_nodes,
        direction,
        annotate: true,
    };
    let graph = state.graph_builder.build_network(case_id, options).await;
    Ok(state.formatter.graph_report(&graph))
}

/// Handle analyze_citation_network: multi-level traversal with caller-chosen
/// bounds, clamped to the configured ceilings.
async fn handle_citation_network(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    #[derive(Deserialize)]
    struct NetworkParams {
        case_id: i64,
        max_depth: Option<u32>,
        max_nodes: Option<usize>,
        direction: Option<Direction>,
    }

    let params: NetworkParams = parse_arguments("analyze_citation_network", arguments)?;
    let limits = &state.config.limits;

    let options = NetworkOptions {
        max_depth: params
            .max_depth
            .unwrap_or(limits.default_graph_depth)
            .clamp(1, limits.max_graph_depth),
        max_nodes: params
            .max_nodes
            .unwrap_or(limits.default_graph_nodes)
            .clamp(1, limits.max_graph_nodes),
        direction: params.direction.unwrap_or(Direction::Both),
        annotate: true,
    };

    let graph = state
        .graph_builder
        .build_network(params.case_id, options)
        .await;
    Ok(state.formatter.graph_report(&graph))
}

/// Parse tool arguments with consistent error handling
fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<T> {
    match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: e.to_string(),
        }),
        None => Err(McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: "Missing arguments".to_string(),
        }),
    }
}

fn invalid_params(tool_name: &str, message: impl Into<String>) -> McpError {
    McpError::InvalidParameters {
        tool_name: tool_name.to_string(),
        message: message.into(),
    }
}
