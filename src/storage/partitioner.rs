use anyhow::Result;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub const DEFAULT_PARTITIONS: u32 = 16;

/// Static key -> partition assignment.
///
/// Ownership never changes for the lifetime of the manager, so every key belongs to exactly
/// one partition.
pub struct PartitionManager {
    num_partitions: u32,
}

impl PartitionManager {
    pub fn new(num_partitions: u32) -> Result<Arc<Self>> {
        if num_partitions == 0 {
            return Err(anyhow::anyhow!("Partition count must be at least 1"));
        }
        Ok(Arc::new(Self { num_partitions }))
    }

    pub fn num_partitions(&self) -> u32 {
        self.num_partitions
    }

    pub fn partition_for(&self, key: i64) -> u32 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let hash = hasher.finish();
        (hash % self.num_partitions as u64) as u32
    }

    pub fn contains(&self, partition: u32) -> bool {
        partition < self.num_partitions
    }

    /// Distinct partitions owning at least one of `keys`, ascending.
    pub fn owners_of(&self, keys: &[i64]) -> Vec<u32> {
        let mut partitions: Vec<u32> = keys.iter().map(|key| self.partition_for(*key)).collect();
        partitions.sort_unstable();
        partitions.dedup();
        partitions
    }
}
