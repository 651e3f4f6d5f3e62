//! Invocation Router
//!
//! Turns a logical multi-key request into one procedure invocation per owning partition.
//! Every partition receives the full pair list and only finds the keys it owns. Partitions run
//! concurrently and commit independently; the router never compensates across them.

use super::types::{FanOutResult, InvocationId, PartitionOutcome};
use crate::error::CasError;
use crate::procedure::{CasRequest, PayloadUpdate, check_and_update};
use crate::retry::RetryPolicy;
use crate::storage::memory::PartitionedRowStore;

use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;

pub struct InvocationRouter {
    store: Arc<PartitionedRowStore>,
}

impl InvocationRouter {
    pub fn new(store: Arc<PartitionedRowStore>) -> Arc<Self> {
        Arc::new(Self { store })
    }

    pub fn store(&self) -> &Arc<PartitionedRowStore> {
        &self.store
    }

    /// Runs the procedure on a single partition: the unit of atomicity.
    pub async fn invoke_partition(
        &self,
        partition: u32,
        request: &CasRequest,
    ) -> Result<u64, CasError> {
        request.validate()?;
        self.store
            .execute(partition, |txn| check_and_update(txn, request))
            .await
    }

    /// Fans `request` out to every partition owning at least one of its keys.
    ///
    /// `InvalidInput` is returned before any partition is touched. Conflicts are reported per
    /// partition inside the result.
    pub async fn invoke(&self, request: CasRequest) -> Result<FanOutResult, CasError> {
        request.validate()?;

        let invocation = InvocationId::new();
        let partitioner = self.store.partitioner();
        let partitions = partitioner.owners_of(&request.keys);
        tracing::debug!(
            "Invocation {} covers {} key(s) on {} partition(s)",
            invocation.0,
            request.keys.len(),
            partitions.len()
        );

        let request = Arc::new(request);
        let mut invocations = JoinSet::new();
        for partition in partitions {
            let mut keys: Vec<i64> = Vec::new();
            for key in &request.keys {
                if partitioner.partition_for(*key) == partition && !keys.contains(key) {
                    keys.push(*key);
                }
            }

            let store = self.store.clone();
            let request = request.clone();
            invocations.spawn(async move {
                let result = store
                    .execute(partition, |txn| check_and_update(txn, &request))
                    .await;
                PartitionOutcome {
                    partition,
                    keys,
                    result,
                }
            });
        }

        let mut outcomes = Vec::new();
        while let Some(joined) = invocations.join_next().await {
            let outcome = joined.unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()));
            if let Err(e) = &outcome.result {
                tracing::warn!(
                    "Invocation {} aborted on partition {}: {}",
                    invocation.0,
                    outcome.partition,
                    e
                );
            }
            outcomes.push(outcome);
        }

        let result = FanOutResult::from_outcomes(invocation, outcomes);
        tracing::info!(
            "Invocation {} updated {} row(s), fully applied: {}",
            result.invocation.0,
            result.updated_count,
            result.is_fully_applied()
        );
        Ok(result)
    }

    /// Current version of each key, `None` where no partition holds it.
    pub async fn read_versions(&self, keys: &[i64]) -> Vec<(i64, Option<i64>)> {
        let mut versions = Vec::with_capacity(keys.len());
        for key in keys {
            versions.push((*key, self.store.read_version(*key).await));
        }
        versions
    }

    /// Caller-side optimistic loop: read versions, invoke, and on conflict re-read and retry
    /// the keys of the partitions that aborted.
    ///
    /// Each distinct key is advanced at most once. Keys without a row are ignored. Returns the
    /// total number of rows updated, or the last conflict once `policy` is exhausted. A
    /// partition rejecting its input is not retried.
    pub async fn apply_with_refresh(
        &self,
        keys: &[i64],
        update: PayloadUpdate,
        policy: &RetryPolicy,
    ) -> Result<u64, CasError> {
        let mut seen = HashSet::new();
        let mut pending: Vec<i64> = keys.iter().copied().filter(|key| seen.insert(*key)).collect();

        let mut total = 0u64;
        let mut last_conflict = None;

        for attempt in 0..policy.max_attempts.max(1) {
            let (present, expected): (Vec<i64>, Vec<i64>) = self
                .read_versions(&pending)
                .await
                .into_iter()
                .filter_map(|(key, version)| version.map(|v| (key, v)))
                .unzip();

            if present.is_empty() {
                return Ok(total);
            }

            let request = CasRequest::new(present, expected).with_update(update.clone());
            let result = self.invoke(request).await?;
            total += result.updated_count;

            let conflicted = result.conflicted_partitions();
            if conflicted.is_empty() {
                return Ok(total);
            }

            if let Some(e) = result
                .first_conflict()
                .filter(|e| matches!(e, CasError::InvalidInput(_)))
            {
                return Err(e.clone());
            }
            last_conflict = result.first_conflict().cloned();
            pending = result.conflicted_keys();

            tracing::debug!(
                "Attempt {} conflicted on {} partition(s), retrying {} key(s)",
                attempt + 1,
                conflicted.len(),
                pending.len()
            );
            if attempt + 1 < policy.max_attempts {
                tokio::time::sleep(policy.backoff(attempt)).await;
            }
        }

        Err(last_conflict.unwrap_or_else(|| CasError::invalid("retry policy allows no attempts")))
    }
}
