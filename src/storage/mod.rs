//! Partitioned Row Store
//!
//! Holds versioned rows keyed by an integer identifier, split across a fixed set of partitions.
//!
//! ## Core Concepts
//! - **Partitioning**: `PartitionManager` hashes a key to exactly one partition. The assignment
//!   never changes.
//! - **Exclusivity**: each partition is guarded by its own lock, held for a whole invocation.
//! - **Transactions**: `Partition::transact` keeps before-images of mutated rows and restores
//!   them when the invocation fails.
//! - **Access**: `PartitionedRowStore` exposes routed reads, seeding and partition dumps.

pub mod handlers;
pub mod memory;
pub mod partitioner;
pub mod protocol;
pub mod txn;
pub mod types;

#[cfg(test)]
mod tests;
