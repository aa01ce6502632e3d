//! Backend REST API client
//!
//! Fetches single pages from the paged dataset endpoints and the two one-shot
//! analytics endpoints. Pagination itself lives in [`crate::fetch`].

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;

use super::envelope::{validate_page, EnvelopeSpec, FetchError, PageEnvelope, PaginationLayout};
use super::{FilterParam, Filters, TransactionStats, UserAnalytics};
use crate::fetch::PageSource;

/// A paged backend endpoint, the shape of its envelope and the filters it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub path: &'static str,
    pub spec: EnvelopeSpec,
    pub params: &'static [FilterParam],
}

impl Endpoint {
    pub const SPLIT_CONTRACTS: Endpoint = Endpoint {
        path: "contracts/split-contracts",
        spec: EnvelopeSpec::new("splitContracts", PaginationLayout::Flat),
        params: &[FilterParam::Chain, FilterParam::User],
    };

    pub const MINT_EDITIONS: Endpoint = Endpoint {
        path: "contracts/mint-editions",
        spec: EnvelopeSpec::new("contracts", PaginationLayout::Flat),
        params: &[FilterParam::Chain],
    };

    pub const PAYMENTS: Endpoint = Endpoint {
        path: "points/all-payments",
        spec: EnvelopeSpec::new("payments", PaginationLayout::Nested("pagination")),
        params: &[],
    };

    pub const STORY_STATS: Endpoint = Endpoint {
        path: "story/ip-assets-stats",
        spec: EnvelopeSpec::new("stats", PaginationLayout::Nested("pages")),
        params: &[FilterParam::IpType, FilterParam::Chain],
    };
}

const USERS_PATH: &str = "analytics/users";
const TRANSACTION_METRICS_PATH: &str = "analytics/transaction-metrics";

/// Client for the analytics backend
#[derive(Debug, Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a client for the backend at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns a page source for one paged endpoint
    pub fn pages<T>(&self, endpoint: Endpoint) -> EndpointSource<'_, T> {
        EndpointSource {
            client: self,
            endpoint,
            _item: PhantomData,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Builds the GET request for one page, sending only the filters `endpoint` accepts
    fn page_request(&self, endpoint: Endpoint, page: u32, limit: u32, filters: &Filters) -> RequestBuilder {
        self.http_client
            .get(self.url(endpoint.path))
            .query(&[("page", page), ("limit", limit)])
            .query(&filters.restricted_to(endpoint.params).query_pairs())
    }

    /// Sends a request and decodes the JSON body, failing on non-2xx statuses
    async fn get_json(&self, request: RequestBuilder) -> Result<Value, FetchError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetches one page of `endpoint`
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        page: u32,
        limit: u32,
        filters: &Filters,
    ) -> Result<PageEnvelope<T>, FetchError> {
        debug!(path = endpoint.path, page, limit, "Fetching page");
        let body = self
            .get_json(self.page_request(endpoint, page, limit, filters))
            .await?;
        validate_page(body, &endpoint.spec, page)
    }

    /// Fetches platform-wide user analytics
    pub async fn fetch_user_analytics(&self) -> Result<UserAnalytics, FetchError> {
        let body = self
            .get_json(self.http_client.get(self.url(USERS_PATH)))
            .await?;
        parse_user_analytics(body)
    }

    /// Fetches per-chain transaction totals
    pub async fn fetch_transaction_stats(&self) -> Result<TransactionStats, FetchError> {
        let body = self
            .get_json(self.http_client.get(self.url(TRANSACTION_METRICS_PATH)))
            .await?;
        parse_transaction_stats(body)
    }
}

/// Validates a user analytics body; a missing total or growth series is malformed
fn parse_user_analytics(body: Value) -> Result<UserAnalytics, FetchError> {
    let body = unwrap_data(body);
    if body.get("totalUsers").map_or(true, Value::is_null)
        || body.get("userGrowth").map_or(true, Value::is_null)
    {
        return Err(FetchError::Malformed(
            "user analytics missing totalUsers or userGrowth".to_string(),
        ));
    }
    serde_json::from_value(body).map_err(|e| FetchError::Malformed(e.to_string()))
}

fn parse_transaction_stats(body: Value) -> Result<TransactionStats, FetchError> {
    let body = unwrap_data(body);
    if !body.is_object() {
        return Err(FetchError::Malformed(
            "transaction metrics is not an object".to_string(),
        ));
    }
    serde_json::from_value(body).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Accepts both a bare object and one wrapped in a `{status, data}` envelope
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("status") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// [`PageSource`] over one endpoint of a [`BackendClient`]
#[derive(Debug)]
pub struct EndpointSource<'a, T> {
    client: &'a BackendClient,
    endpoint: Endpoint,
    _item: PhantomData<fn() -> T>,
}

impl<T> PageSource<T> for EndpointSource<'_, T>
where
    T: DeserializeOwned + Send,
{
    async fn fetch_page(
        &self,
        page: u32,
        limit: u32,
        filters: &Filters,
    ) -> Result<PageEnvelope<T>, FetchError> {
        self.client
            .fetch_page(self.endpoint, page, limit, filters)
            .await
    }
}
