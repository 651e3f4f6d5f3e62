//! HTTP Client
//!
//! Talks to a node's HTTP surface. Transport failures are retried with backoff. A `409`
//! from `/cas` is returned as a typed conflict; `check_and_update_with_refresh` turns that into the
//! re-read-and-retry loop callers are expected to run.

use crate::error::CasError;
use crate::procedure::{CasRequest, PayloadUpdate};
use crate::retry::RetryPolicy;
use crate::router::protocol::{CasResponse, ENDPOINT_CAS, PartitionCasResponse, partition_cas_path};
use crate::storage::protocol::{
    ENDPOINT_GET_ROW, ENDPOINT_SEED, ENDPOINT_STATS, GetRowResponse, SeedRequest, SeedResponse,
    StatsResponse,
};
use crate::storage::types::VersionedRow;

use anyhow::Result;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_millis(2000);

/// Outcome of a `/cas` call that reached the node.
#[derive(Debug, Clone)]
pub enum CasOutcome {
    Applied(CasResponse),
    /// At least one partition aborted; the others may have committed.
    Conflicted(CasResponse),
    Rejected(CasError),
}

pub struct CasClient {
    base_url: String,
    http_client: reqwest::Client,
    transport_retry: RetryPolicy,
}

impl CasClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::new(),
            transport_retry: RetryPolicy::default(),
        }
    }

    async fn send_with_retry(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let attempts = self.transport_retry.max_attempts.max(1);

        for attempt in 0..attempts {
            let request = request
                .try_clone()
                .ok_or_else(|| anyhow::anyhow!("Request body cannot be retried"))?;

            match request.timeout(REQUEST_TIMEOUT).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == attempts {
                        return Err(anyhow::anyhow!(e));
                    }
                    tracing::debug!("Request failed (attempt {}): {}", attempt + 1, e);
                    tokio::time::sleep(self.transport_retry.backoff(attempt)).await;
                }
            }
        }

        Err(anyhow::anyhow!("Retry attempts exhausted"))
    }

    pub async fn check_and_update(&self, request: &CasRequest) -> Result<CasOutcome> {
        let url = format!("{}{}", self.base_url, ENDPOINT_CAS);
        let response = self
            .send_with_retry(self.http_client.post(url).json(request))
            .await?;

        let status = response.status();
        let body: CasResponse = response.json().await?;

        if status.is_success() {
            return Ok(CasOutcome::Applied(body));
        }
        if status == reqwest::StatusCode::CONFLICT {
            return Ok(CasOutcome::Conflicted(body));
        }
        if let Some(error) = body.error {
            return Ok(CasOutcome::Rejected(error));
        }
        Err(anyhow::anyhow!("CAS request failed {}", status))
    }

    /// Runs the procedure on one partition only, bypassing the fan-out.
    pub async fn check_and_update_partition(
        &self,
        partition: u32,
        request: &CasRequest,
    ) -> Result<PartitionCasResponse> {
        let url = format!("{}{}", self.base_url, partition_cas_path(partition));
        let response = self
            .send_with_retry(self.http_client.post(url).json(request))
            .await?;

        Ok(response.json().await?)
    }

    pub async fn get_row(&self, key: i64) -> Result<Option<VersionedRow>> {
        let url = format!("{}{}/{}", self.base_url, ENDPOINT_GET_ROW, key);
        let response = self.send_with_retry(self.http_client.get(url)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("GET request failed {}", response.status()));
        }

        let body: GetRowResponse = response.json().await?;
        Ok(body.row)
    }

    pub async fn seed(&self, rows: Vec<VersionedRow>) -> Result<usize> {
        let url = format!("{}{}", self.base_url, ENDPOINT_SEED);
        let response = self
            .send_with_retry(self.http_client.post(url).json(&SeedRequest { rows }))
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Seed failed {}", response.status()));
        }
        let body: SeedResponse = response.json().await?;
        Ok(body.seeded)
    }

    pub async fn stats(&self) -> Result<StatsResponse> {
        let url = format!("{}{}", self.base_url, ENDPOINT_STATS);
        let response = self.send_with_retry(self.http_client.get(url)).await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Stats request failed {}", response.status()));
        }
        Ok(response.json().await?)
    }

    /// Reads the current versions of `keys`, submits them, and on conflict re-reads the keys of
    /// the aborted partitions and tries again. Distinct keys only; missing rows are skipped.
    pub async fn check_and_update_with_refresh(
        &self,
        keys: &[i64],
        update: PayloadUpdate,
        policy: &RetryPolicy,
    ) -> Result<std::result::Result<u64, CasError>> {
        let mut pending: Vec<i64> = Vec::new();
        for key in keys {
            if !pending.contains(key) {
                pending.push(*key);
            }
        }

        let mut total = 0u64;
        let mut last_conflict = None;

        for attempt in 0..policy.max_attempts.max(1) {
            let mut present = Vec::new();
            let mut expected = Vec::new();
            for key in &pending {
                if let Some(row) = self.get_row(*key).await? {
                    present.push(row.key);
                    expected.push(row.version);
                }
            }
            if present.is_empty() {
                return Ok(Ok(total));
            }

            let request = CasRequest::new(present, expected).with_update(update.clone());
            match self.check_and_update(&request).await? {
                CasOutcome::Applied(body) => return Ok(Ok(total + body.updated_count)),
                CasOutcome::Rejected(error) => return Ok(Err(error)),
                CasOutcome::Conflicted(body) => {
                    total += body.updated_count;
                    if let Some(e) = body
                        .first_error()
                        .filter(|e| matches!(e, CasError::InvalidInput(_)))
                    {
                        return Ok(Err(e.clone()));
                    }
                    last_conflict = body.first_error().cloned();

                    pending = body.conflicted_keys();

                    tracing::debug!(
                        "Attempt {} conflicted, retrying {} key(s)",
                        attempt + 1,
                        pending.len()
                    );
                    if attempt + 1 < policy.max_attempts {
                        tokio::time::sleep(policy.backoff(attempt)).await;
                    }
                }
            }
        }

        Ok(Err(last_conflict.unwrap_or_else(|| {
            CasError::invalid("retry policy allows no attempts")
        })))
    }
}
