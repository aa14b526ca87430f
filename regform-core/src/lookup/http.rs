//! HTTP region lookup.
//!
//! `GET {endpoint}?{query_param}={country}` answering with a JSON array of
//! `{id, name}` objects, already ordered by the backend.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::AppError;
use crate::config::LookupConfig;
use crate::lookup::traits::{LookupError, RegionLookup};
use crate::model::region_list::{CountryId, Region};

#[derive(Debug, Clone)]
pub struct HttpRegionLookup {
    http: reqwest::Client,
    endpoint: Url,
    query_param: String,
}

impl HttpRegionLookup {
    pub fn new(config: &LookupConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Other(format!("HTTP client init failed: {e}")))?;

        Ok(Self::with_client(http, config.endpoint()?, &config.query_param))
    }

    pub fn with_client(http: reqwest::Client, endpoint: Url, query_param: &str) -> Self {
        Self {
            http,
            endpoint,
            query_param: query_param.to_string(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RegionLookup for HttpRegionLookup {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn regions(&self, country: &CountryId) -> Result<Vec<Region>, LookupError> {
        let endpoint = self.endpoint.to_string();

        let resp = self
            .http
            .get(self.endpoint.clone())
            .query(&[(self.query_param.as_str(), country.as_str())])
            .send()
            .await
            .map_err(|e| LookupError::Transport {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(
                marker = "REGION_LOOKUP",
                operation_type = "lookup_status",
                status = status.as_u16(),
                "Region lookup answered with non-success status"
            );
            return Err(LookupError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| LookupError::Transport {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let regions: Vec<Region> =
            serde_json::from_slice(&body).map_err(|e| LookupError::Decode {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        debug!(
            marker = "REGION_LOOKUP",
            operation_type = "lookup_success",
            count = regions.len(),
            "Region lookup decoded"
        );

        Ok(regions)
    }
}
