//! Storage HTTP Protocol
//!
//! Endpoints and DTOs for the out-of-protocol side of the store: reading rows, seeding them and
//! inspecting partitions. None of these participate in version fencing.

use super::types::VersionedRow;
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Routed single-row read.
pub const ENDPOINT_GET_ROW: &str = "/row";
/// Bulk insert/overwrite of rows (bootstrap and tests).
pub const ENDPOINT_SEED: &str = "/seed";
/// Full dump of one partition.
pub const ENDPOINT_PARTITION_DUMP: &str = "/internal/partition";
/// Row counts and mean version.
pub const ENDPOINT_STATS: &str = "/stats";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct GetRowResponse {
    /// `None` when no partition holds the key.
    pub row: Option<VersionedRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeedRequest {
    pub rows: Vec<VersionedRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeedResponse {
    pub seeded: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PartitionDumpResponse {
    pub partition: u32,
    pub rows: Vec<VersionedRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub partitions: u32,
    pub rows: usize,
    /// Mean row version across all partitions, absent for an empty store.
    pub mean_version: Option<i64>,
}
