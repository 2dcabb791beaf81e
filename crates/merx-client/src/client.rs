//! # API Client
//!
//! The reqwest-backed implementation of the merx-flow collaborator traits.
//!
//! One client instance serves all three contracts; it is cheap to clone
//! (reqwest pools connections internally) and carries the optional bearer
//! token from the config on every request.
//!
//! Error mapping: transport problems become `RemoteError::Transport`;
//! non-2xx answers become `RemoteError::Remote` carrying the backend's
//! `message` field when the body has one, or the bare HTTP status
//! otherwise.

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use merx_core::{CatalogProduct, LineItem, Party, PaymentCapture, ValidationReport};
use merx_flow::{
    CatalogService, CreatedRecord, ProductFilter, RecordDraft, RecordFilter, RecordPage,
    RecordStore, RecordSummary, RemoteError, ValidationService,
};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::wire::{
    ApiErrorBody, CreateResponse, PageResponse, PartyListResponse, RecordRow, StatusResponse,
    ValidateRequest,
};

/// HTTP client for the storefront backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl ApiClient {
    /// Builds a client from config. Validates the base URL up front so a
    /// typo fails here instead of on the first request.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        Url::parse(&config.api.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(ApiClient {
            http,
            base: config.api.base_url.trim_end_matches('/').to_string(),
            token: config.auth.bearer_token.clone(),
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Sends the request and decodes a JSON body.
    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, RemoteError> {
        let resp = self
            .authed(req)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::remote_error(status, resp).await);
        }
        resp.json::<T>()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))
    }

    /// Sends the request, discarding any success body.
    async fn send_empty(&self, req: RequestBuilder) -> Result<(), RemoteError> {
        let resp = self
            .authed(req)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Self::remote_error(status, resp).await);
        }
        Ok(())
    }

    async fn remote_error(status: StatusCode, resp: reqwest::Response) -> RemoteError {
        let message = match resp.json::<ApiErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => format!("http status {status}"),
        };
        RemoteError::Remote {
            status: status.as_u16(),
            message,
        }
    }
}

// =============================================================================
// Catalog Service
// =============================================================================

#[async_trait]
impl CatalogService for ApiClient {
    async fn list_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<CatalogProduct>, RemoteError> {
        debug!(page = filter.page, "GET products");
        let mut req = self.http.get(self.endpoint("products")).query(&[
            ("page", filter.page.to_string()),
            ("limit", filter.limit.to_string()),
        ]);
        if let Some(search) = &filter.search {
            req = req.query(&[("search", search.as_str())]);
        }

        let page: PageResponse<CatalogProduct> = self.send_json(req).await?;
        Ok(page.data)
    }

    async fn list_active_suppliers(&self) -> Result<Vec<Party>, RemoteError> {
        debug!("GET suppliers/active");
        let req = self.http.get(self.endpoint("suppliers/active"));
        let list: PartyListResponse = self.send_json(req).await?;
        Ok(list.data)
    }

    async fn list_active_customers(&self) -> Result<Vec<Party>, RemoteError> {
        debug!("GET customers/active");
        let req = self.http.get(self.endpoint("customers/active"));
        let list: PartyListResponse = self.send_json(req).await?;
        Ok(list.data)
    }
}

// =============================================================================
// Validation Service
// =============================================================================

#[async_trait]
impl ValidationService for ApiClient {
    async fn validate(
        &self,
        party: &Party,
        items: &[LineItem],
    ) -> Result<ValidationReport, RemoteError> {
        debug!(party = %party.id, items = items.len(), "POST validate");
        let req = self
            .http
            .post(self.endpoint("purchase-invoices/validate"))
            .json(&ValidateRequest {
                target_party_ref: &party.id,
                items,
            });
        self.send_json(req).await
    }
}

// =============================================================================
// Record Store
// =============================================================================

#[async_trait]
impl RecordStore for ApiClient {
    async fn create(&self, draft: &RecordDraft) -> Result<CreatedRecord, RemoteError> {
        debug!(kind = ?draft.kind, items = draft.items.len(), "POST records");
        let req = self.http.post(self.endpoint("records")).json(draft);
        let resp: CreateResponse = self.send_json(req).await?;
        Ok(CreatedRecord {
            remote_id: resp.id,
            status: resp.status,
            totals: resp.totals,
        })
    }

    async fn cancel(&self, remote_id: &str) -> Result<merx_core::RecordStatus, RemoteError> {
        debug!(remote_id, "POST records/cancel");
        let req = self
            .http
            .post(self.endpoint(&format!("records/{remote_id}/cancel")));
        let resp: StatusResponse = self.send_json(req).await?;
        Ok(resp.status)
    }

    async fn mark_paid(
        &self,
        remote_id: &str,
        capture: &PaymentCapture,
    ) -> Result<merx_core::RecordStatus, RemoteError> {
        debug!(remote_id, transaction = %capture.transaction_id, "PUT records/pay");
        let req = self
            .http
            .put(self.endpoint(&format!("records/{remote_id}/pay")))
            .json(capture);
        let resp: StatusResponse = self.send_json(req).await?;
        Ok(resp.status)
    }

    async fn delete(&self, remote_id: &str) -> Result<(), RemoteError> {
        debug!(remote_id, "DELETE records");
        let req = self
            .http
            .delete(self.endpoint(&format!("records/{remote_id}")));
        self.send_empty(req).await
    }

    async fn get_by_id(&self, remote_id: &str) -> Result<Option<RecordSummary>, RemoteError> {
        debug!(remote_id, "GET records by id");
        let req = self.http.get(self.endpoint(&format!("records/{remote_id}")));

        match self.send_json::<RecordRow>(req).await {
            Ok(row) => Ok(Some(row.into())),
            Err(RemoteError::Remote { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn list(&self, filter: &RecordFilter) -> Result<RecordPage, RemoteError> {
        debug!(page = filter.page, status = ?filter.status, "GET records");
        let mut req = self.http.get(self.endpoint("records")).query(&[
            ("page", filter.page.to_string()),
            ("limit", filter.limit.to_string()),
        ]);
        if let Some(status) = filter.status {
            req = req.query(&[("status", status.to_string())]);
        }

        let page: PageResponse<RecordRow> = self.send_json(req).await?;
        Ok(RecordPage {
            records: page.data.into_iter().map(RecordSummary::from).collect(),
            page: page.page,
            total_pages: page.total_pages,
            total_records: page.total_records,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let mut cfg = ClientConfig::default();
        cfg.api.base_url = "https://shop.example.com/api/".to_string();
        let client = ApiClient::new(&cfg).unwrap();

        assert_eq!(
            client.endpoint("records/O1/cancel"),
            "https://shop.example.com/api/records/O1/cancel"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let mut cfg = ClientConfig::default();
        cfg.api.base_url = "not a url".to_string();
        assert!(matches!(
            ApiClient::new(&cfg),
            Err(ClientError::InvalidBaseUrl(_))
        ));
    }
}
