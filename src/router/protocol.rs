//! Conditional Update HTTP Protocol
//!
//! `POST /cas` fans a request out over all owning partitions. The internal per-partition
//! endpoint runs exactly one partition-local invocation.

use super::types::{FanOutResult, PartitionOutcome};
use crate::error::CasError;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Public endpoint for logical (possibly multi-partition) conditional updates.
pub const ENDPOINT_CAS: &str = "/cas";
/// Prefix of the single-partition endpoint: `{prefix}/{partition}/cas`.
pub const ENDPOINT_PARTITION_PREFIX: &str = "/internal/partition";

pub fn partition_cas_path(partition: u32) -> String {
    format!("{}/{}/cas", ENDPOINT_PARTITION_PREFIX, partition)
}

// --- Data Transfer Objects ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionReport {
    pub partition: u32,
    /// Request keys owned by this partition.
    pub keys: Vec<i64>,
    pub updated_count: u64,
    /// Set when this partition aborted.
    pub error: Option<CasError>,
}

impl From<&PartitionOutcome> for PartitionReport {
    fn from(outcome: &PartitionOutcome) -> Self {
        match &outcome.result {
            Ok(count) => Self {
                partition: outcome.partition,
                keys: outcome.keys.clone(),
                updated_count: *count,
                error: None,
            },
            Err(e) => Self {
                partition: outcome.partition,
                keys: outcome.keys.clone(),
                updated_count: 0,
                error: Some(e.clone()),
            },
        }
    }
}

/// Response to `POST /cas`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CasResponse {
    pub invocation_id: Option<String>,
    /// Sum over committed partitions.
    pub updated_count: u64,
    pub partitions: Vec<PartitionReport>,
    /// Request-level failure (invalid input).
    pub error: Option<CasError>,
}

impl CasResponse {
    pub fn rejected(error: CasError) -> Self {
        Self {
            invocation_id: None,
            updated_count: 0,
            partitions: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_fully_applied(&self) -> bool {
        self.error.is_none() && self.partitions.iter().all(|p| p.error.is_none())
    }

    /// Keys owned by partitions that aborted.
    pub fn conflicted_keys(&self) -> Vec<i64> {
        self.partitions
            .iter()
            .filter(|p| p.error.is_some())
            .flat_map(|p| p.keys.iter().copied())
            .collect()
    }

    pub fn first_error(&self) -> Option<&CasError> {
        self.error
            .as_ref()
            .or_else(|| self.partitions.iter().find_map(|p| p.error.as_ref()))
    }
}

impl From<&FanOutResult> for CasResponse {
    fn from(result: &FanOutResult) -> Self {
        Self {
            invocation_id: Some(result.invocation.0.clone()),
            updated_count: result.updated_count,
            partitions: result.outcomes.iter().map(PartitionReport::from).collect(),
            error: None,
        }
    }
}

/// Response to the single-partition endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionCasResponse {
    pub partition: u32,
    pub updated_count: u64,
    pub error: Option<CasError>,
}
