use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info, warn};

use super::types::{
    opinion_id_from_url, CaseSummary, CitationEdgePage, CitationEdgeRecord, CitationLookupEntry,
    OpinionsCitedResponse,
};
use super::CourtListener;
use crate::config::{CourtListenerConfig, RequestConfig};
use crate::error::{BackendError, BackendResult};

/// HTTP client for the CourtListener REST API (v4)
#[derive(Clone)]
pub struct CourtListenerClient {
    client: Client,
    base_url: String,
    api_token: String,
    request_config: RequestConfig,
}

impl CourtListenerClient {
    /// Create a new CourtListener client
    pub fn new(config: &CourtListenerConfig, request_config: RequestConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(BackendError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, url: &str) -> BackendResult<Response> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Token {}", self.api_token))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        debug!(url = %url, status = %response.status(), latency_ms = start.elapsed().as_millis(), "GET");
        Ok(response)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout {
                timeout_ms: self.request_config.timeout_ms,
            }
        } else {
            BackendError::Http(e)
        }
    }

    /// Map a non-success status to a typed error, reading the body for detail.
    async fn error_for_status(response: Response) -> BackendError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            // CourtListener 429 bodies carry a wait_until timestamp
            let wait_until = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("wait_until").and_then(|w| w.as_str().map(String::from)));
            return BackendError::RateLimited { wait_until };
        }

        BackendError::Api {
            status: status.as_u16(),
            message: body,
        }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> BackendResult<T> {
        response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse {
                message: format!("Failed to parse response: {}", e),
            })
    }

    /// POST to the citation-lookup endpoint with form-encoded fields.
    async fn citation_lookup(
        &self,
        form: &[(&str, String)],
    ) -> BackendResult<Vec<CitationLookupEntry>> {
        let url = format!("{}/citation-lookup/", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_token))
            .form(form)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        Self::parse_json(response).await
    }

    /// Fetch one opinions-cited page. `cursor` (the `next` URL of the prior
    /// page) takes precedence over building a fresh query.
    async fn edge_page(
        &self,
        filter_field: &str,
        case_id: i64,
        cursor: Option<&str>,
    ) -> BackendResult<OpinionsCitedResponse> {
        let url = match cursor {
            Some(next) => next.to_string(),
            None => format!(
                "{}/opinions-cited/?{}={}&page_size={}",
                self.base_url, filter_field, case_id, self.request_config.page_size
            ),
        };

        let response = self.get(&url).await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        Self::parse_json(response).await
    }
}

#[async_trait]
impl CourtListener for CourtListenerClient {
    async fn find_citation(
        &self,
        volume: u32,
        reporter: &str,
        page: u32,
    ) -> BackendResult<Vec<CaseSummary>> {
        info!(volume, reporter = %reporter, page, "Citation lookup");

        let entries = self
            .citation_lookup(&[
                ("volume", volume.to_string()),
                ("reporter", reporter.to_string()),
                ("page", page.to_string()),
            ])
            .await?;

        Ok(entries.into_iter().flat_map(|e| e.clusters).collect())
    }

    async fn lookup_text(&self, text: &str) -> BackendResult<Vec<CitationLookupEntry>> {
        info!(chars = text.len(), "Citation lookup over text");
        self.citation_lookup(&[("text", text.to_string())]).await
    }

    async fn list_authorities(
        &self,
        case_id: i64,
        cursor: Option<&str>,
    ) -> BackendResult<CitationEdgePage> {
        let body = self.edge_page("citing_opinion", case_id, cursor).await?;
        Ok(to_edge_page(body, |row| &row.cited_opinion))
    }

    async fn list_citing(
        &self,
        case_id: i64,
        cursor: Option<&str>,
    ) -> BackendResult<CitationEdgePage> {
        let body = self.edge_page("cited_opinion", case_id, cursor).await?;
        Ok(to_edge_page(body, |row| &row.citing_opinion))
    }

    async fn fetch_case(&self, case_id: i64) -> BackendResult<Option<CaseSummary>> {
        let url = format!("{}/clusters/{}/", self.base_url, case_id);

        let response = self.get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        Ok(Some(Self::parse_json(response).await?))
    }
}

/// Convert a wire page to edge records, picking the opinion on the far side
/// of the relation. Rows whose URL carries no parseable id are dropped.
fn to_edge_page(
    body: OpinionsCitedResponse,
    far_side: impl Fn(&super::types::OpinionsCitedRow) -> &String,
) -> CitationEdgePage {
    let entries = body
        .results
        .iter()
        .filter_map(|row| {
            let case_id = opinion_id_from_url(far_side(row));
            if case_id.is_none() {
                warn!(citing = %row.citing_opinion, cited = %row.cited_opinion, "Dropping edge row with unparseable opinion URL");
            }
            Some(CitationEdgeRecord {
                case_id: case_id?,
                weight: row.depth.unwrap_or(1),
            })
        })
        .collect();

    CitationEdgePage {
        entries,
        next_cursor: body.next,
        total: body.count,
    }
}
