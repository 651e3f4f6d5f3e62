use super::partitioner::PartitionManager;
use super::txn::{Partition, PartitionTxn};
use super::types::VersionedRow;
use crate::aggregate::RunningAverage;
use crate::error::CasError;

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// In-memory row store split into fixed partitions.
///
/// Each partition sits behind its own mutex: an invocation holds it from the first read to
/// the final commit or rollback, so invocations on one partition never interleave while
/// different partitions proceed in parallel.
pub struct PartitionedRowStore {
    partitions: Arc<DashMap<u32, Arc<Mutex<Partition>>>>,
    partitioner: Arc<PartitionManager>,
}

impl PartitionedRowStore {
    pub fn new(partitioner: Arc<PartitionManager>) -> Self {
        Self {
            partitions: Arc::new(DashMap::new()),
            partitioner,
        }
    }

    pub fn partitioner(&self) -> &Arc<PartitionManager> {
        &self.partitioner
    }

    fn partition_handle(&self, partition: u32) -> Result<Arc<Mutex<Partition>>, CasError> {
        if !self.partitioner.contains(partition) {
            return Err(CasError::invalid(format!(
                "unknown partition {} (store has {})",
                partition,
                self.partitioner.num_partitions()
            )));
        }

        let handle = self
            .partitions
            .entry(partition)
            .or_insert_with(|| Arc::new(Mutex::new(Partition::new(partition))))
            .clone();
        Ok(handle)
    }

    fn handle_for_key(&self, key: i64) -> Arc<Mutex<Partition>> {
        let partition = self.partitioner.partition_for(key);
        self.partitions
            .entry(partition)
            .or_insert_with(|| Arc::new(Mutex::new(Partition::new(partition))))
            .clone()
    }

    /// Runs `f` against one partition with exclusive access, as a single transaction.
    pub async fn execute<T, F>(&self, partition: u32, f: F) -> Result<T, CasError>
    where
        F: FnOnce(&mut PartitionTxn<'_>) -> Result<T, CasError>,
    {
        let handle = self.partition_handle(partition)?;
        let mut guard = handle.lock().await;
        guard.transact(f)
    }

    /// Inserts or overwrites a row in its owning partition, outside any invocation.
    pub async fn seed(&self, row: VersionedRow) {
        let handle = self.handle_for_key(row.key);
        let mut partition = handle.lock().await;
        tracing::debug!(
            "Seeding key {} (version {}) into partition {}",
            row.key,
            row.version,
            partition.id()
        );
        partition.insert(row);
    }

    pub async fn seed_many(&self, rows: Vec<VersionedRow>) -> usize {
        let count = rows.len();
        for row in rows {
            self.seed(row).await;
        }
        count
    }

    pub async fn remove(&self, key: i64) -> Option<VersionedRow> {
        let handle = self.handle_for_key(key);
        let mut partition = handle.lock().await;
        partition.remove(key)
    }

    pub async fn get(&self, key: i64) -> Option<VersionedRow> {
        let handle = self.handle_for_key(key);
        let partition = handle.lock().await;
        partition.get(key).cloned()
    }

    pub async fn read_version(&self, key: i64) -> Option<i64> {
        self.get(key).await.map(|row| row.version)
    }

    /// All rows of one partition, ordered by key.
    pub async fn dump_partition(&self, partition: u32) -> Result<Vec<VersionedRow>, CasError> {
        let handle = self.partition_handle(partition)?;
        let guard = handle.lock().await;
        Ok(guard.rows().cloned().collect())
    }

    fn handles(&self) -> Vec<Arc<Mutex<Partition>>> {
        self.partitions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub async fn local_row_count(&self) -> usize {
        let mut total = 0;
        for handle in self.handles() {
            total += handle.lock().await.len();
        }
        total
    }

    /// Mean row version, computed per partition and merged across partitions.
    pub async fn version_average(&self) -> RunningAverage {
        let mut total = RunningAverage::new();
        for handle in self.handles() {
            let partition = handle.lock().await;
            let mut partial = RunningAverage::new();
            for row in partition.rows() {
                partial.accumulate(row.version);
            }
            total.merge(&partial);
        }
        total
    }
}
