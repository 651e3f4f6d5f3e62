use crate::error::CasError;
use serde::{Deserialize, Serialize};

/// Tags one logical request across all of its partition invocations in the logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InvocationId(pub String);

impl InvocationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of the procedure on one partition. Each partition commits or aborts on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionOutcome {
    pub partition: u32,
    /// Distinct request keys owned by this partition.
    pub keys: Vec<i64>,
    pub result: Result<u64, CasError>,
}

/// Aggregated result of a logical request fanned out over several partitions.
#[derive(Debug, Clone)]
pub struct FanOutResult {
    pub invocation: InvocationId,
    /// Sorted by partition.
    pub outcomes: Vec<PartitionOutcome>,
    /// Sum of the counts of the partitions that committed.
    pub updated_count: u64,
}

impl FanOutResult {
    pub fn from_outcomes(invocation: InvocationId, mut outcomes: Vec<PartitionOutcome>) -> Self {
        outcomes.sort_by_key(|outcome| outcome.partition);
        let updated_count = outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
            .sum();

        Self {
            invocation,
            outcomes,
            updated_count,
        }
    }

    /// True when no partition aborted.
    pub fn is_fully_applied(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    pub fn conflicted_partitions(&self) -> Vec<u32> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .map(|outcome| outcome.partition)
            .collect()
    }

    /// Keys owned by partitions that aborted.
    pub fn conflicted_keys(&self) -> Vec<i64> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .flat_map(|outcome| outcome.keys.iter().copied())
            .collect()
    }

    pub fn first_conflict(&self) -> Option<&CasError> {
        self.outcomes
            .iter()
            .find_map(|outcome| outcome.result.as_ref().err())
    }
}
