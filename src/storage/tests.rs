//! Storage Module Tests
//!
//! Validates key placement, partition transactions and the routed store operations.
//!
//! ## Test Scopes
//! - **Partitioner**: deterministic, in-range placement with a reasonable spread.
//! - **Transactions**: commit keeps changes, failure restores before-images.
//! - **PartitionedRowStore**: seeding, routed reads, dumps and statistics.
//! - **Endpoint column**: packing a network endpoint into a row payload.

#[cfg(test)]
mod tests {
    use crate::error::CasError;
    use crate::procedure::{PayloadUpdate, RowAccess};
    use crate::storage::memory::PartitionedRowStore;
    use crate::storage::partitioner::PartitionManager;
    use crate::storage::txn::Partition;
    use crate::storage::types::VersionedRow;
    use serde_json::json;
    use crate::error::CodecError;
    use std::net::IpAddr;
    use std::panic::{self, AssertUnwindSafe};

    fn store(partitions: u32) -> PartitionedRowStore {
        PartitionedRowStore::new(PartitionManager::new(partitions).unwrap())
    }

    // ============================================================
    // PARTITIONER TESTS
    // ============================================================

    #[test]
    fn test_partition_is_within_range() {
        let partitioner = PartitionManager::new(16).unwrap();

        for key in -500..500 {
            let partition = partitioner.partition_for(key);
            assert!(
                partition < partitioner.num_partitions(),
                "Partition {} should be < {}",
                partition,
                partitioner.num_partitions()
            );
        }
    }

    #[test]
    fn test_partition_distribution() {
        let partitioner = PartitionManager::new(16).unwrap();
        let mut partition_counts = std::collections::HashMap::new();

        for key in 0..10_000i64 {
            *partition_counts
                .entry(partitioner.partition_for(key))
                .or_insert(0) += 1;
        }

        // Every partition should receive some keys
        assert_eq!(partition_counts.len(), 16);
    }

    #[test]
    fn test_single_partition_owns_everything() {
        let partitioner = PartitionManager::new(1).unwrap();

        assert_eq!(partitioner.owners_of(&[1, 2, 3, 99]), vec![0]);
    }

    // ============================================================
    // TRANSACTION TESTS
    // ============================================================

    #[test]
    fn test_transaction_commit_keeps_changes() {
        let mut partition = Partition::new(3);
        partition.insert(VersionedRow::new(1, 1));

        let result: Result<u64, CasError> =
            partition.transact(|txn| Ok(txn.conditional_update(1, &PayloadUpdate::Keep)));

        assert_eq!(result, Ok(1));
        assert_eq!(partition.get(1).unwrap().version, 2);
    }

    #[test]
    fn test_transaction_failure_restores_every_row() {
        let mut partition = Partition::new(0);
        partition.insert(VersionedRow::new(1, 1).with_payload(json!("a")));
        partition.insert(VersionedRow::new(2, 10));

        let result: Result<(), CasError> = partition.transact(|txn| {
            txn.conditional_update(1, &PayloadUpdate::Replace(json!("b")));
            txn.conditional_update(1, &PayloadUpdate::Replace(json!("c")));
            txn.conditional_update(2, &PayloadUpdate::Keep);
            assert_eq!(txn.touched(), 2);
            Err(CasError::invalid("forced"))
        });

        assert!(result.is_err());
        assert_eq!(partition.get(1).unwrap(), &VersionedRow::new(1, 1).with_payload(json!("a")));
        assert_eq!(partition.get(2).unwrap().version, 10);
    }

    #[test]
    fn test_panic_inside_transaction_restores_rows() {
        let mut partition = Partition::new(0);
        partition.insert(VersionedRow::new(1, 1).with_payload(json!("a")));
        partition.insert(VersionedRow::new(2, 4));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _: Result<(), CasError> = partition.transact(|txn| {
                txn.conditional_update(1, &PayloadUpdate::Replace(json!("b")));
                txn.conditional_update(2, &PayloadUpdate::Keep);
                panic!("invocation blew up");
            });
        }));

        assert!(outcome.is_err());
        assert_eq!(partition.get(1).unwrap(), &VersionedRow::new(1, 1).with_payload(json!("a")));
        assert_eq!(partition.get(2).unwrap().version, 4);
    }

    #[test]
    fn test_update_at_max_version_is_refused() {
        let mut partition = Partition::new(0);
        partition.insert(VersionedRow::new(1, i64::MAX));

        let result: Result<(u64, usize), CasError> = partition.transact(|txn| {
            let affected = txn.conditional_update(1, &PayloadUpdate::Keep);
            Ok((affected, txn.touched()))
        });

        assert_eq!(result, Ok((0, 0)));
        assert_eq!(partition.get(1).unwrap().version, i64::MAX);
    }

    #[test]
    fn test_update_of_missing_key_affects_nothing() {
        let mut partition = Partition::new(0);

        let result: Result<(u64, Option<i64>), CasError> = partition.transact(|txn| {
            let affected = txn.conditional_update(42, &PayloadUpdate::Keep);
            Ok((affected, txn.read_version(42)))
        });

        assert_eq!(result, Ok((0, None)));
        assert!(partition.is_empty());
    }

    // ============================================================
    // PARTITIONED ROW STORE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_seed_and_get() {
        let store = store(8);

        store.seed(VersionedRow::new(1, 5)).await;

        assert_eq!(store.get(1).await, Some(VersionedRow::new(1, 5)));
        assert_eq!(store.read_version(1).await, Some(5));
        assert_eq!(store.get(2).await, None);
    }

    #[tokio::test]
    async fn test_seed_lands_in_owning_partition() {
        let store = store(8);
        let partition = store.partitioner().partition_for(77);

        store.seed(VersionedRow::new(77, 1)).await;

        let rows = store.dump_partition(partition).await.unwrap();
        assert_eq!(rows, vec![VersionedRow::new(77, 1)]);
    }

    #[tokio::test]
    async fn test_remove_row() {
        let store = store(4);
        store.seed(VersionedRow::new(9, 1)).await;

        assert_eq!(store.remove(9).await, Some(VersionedRow::new(9, 1)));
        assert_eq!(store.get(9).await, None);
    }

    #[tokio::test]
    async fn test_execute_rejects_unknown_partition() {
        let store = store(4);

        let result = store.execute(4, |_txn| Ok(())).await;

        assert!(matches!(result, Err(CasError::InvalidInput(_))));
        assert!(store.dump_partition(100).await.is_err());
    }

    #[tokio::test]
    async fn test_execute_failure_rolls_back() {
        let store = store(1);
        store.seed(VersionedRow::new(1, 1)).await;

        let result: Result<(), CasError> = store
            .execute(0, |txn| {
                txn.conditional_update(1, &PayloadUpdate::Keep);
                Err(CasError::invalid("abort"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.read_version(1).await, Some(1));
    }

    #[tokio::test]
    async fn test_row_count_and_version_average() {
        let store = store(8);
        assert_eq!(store.version_average().await.finalize(), None);

        store
            .seed_many(vec![
                VersionedRow::new(1, 2),
                VersionedRow::new(2, 4),
                VersionedRow::new(3, 9),
            ])
            .await;

        assert_eq!(store.local_row_count().await, 3);
        let average = store.version_average().await;
        assert_eq!(average.count, 3);
        assert_eq!(average.finalize(), Some(5));
    }

    // ============================================================
    // ENDPOINT COLUMN
    // ============================================================

    #[test]
    fn test_row_endpoint_column() {
        let row = VersionedRow::new(1, 0)
            .with_payload(json!({"owner": "ops"}))
            .with_endpoint("10.1.2.3", 5432)
            .unwrap();

        let (ip, port) = row.endpoint().unwrap().unwrap();
        assert_eq!(ip, "10.1.2.3".parse::<IpAddr>().unwrap());
        assert_eq!(port, 5432);
        assert_eq!(row.payload["owner"], json!("ops"));
    }

    #[test]
    fn test_malformed_endpoint_column() {
        let row = VersionedRow::new(1, 0).with_payload(json!({"endpoint": "10.0.0.1:80"}));

        assert!(matches!(
            row.endpoint(),
            Some(Err(CodecError::MalformedColumn(_)))
        ));
    }

    #[test]
    fn test_row_without_endpoint() {
        assert!(VersionedRow::new(1, 0).endpoint().is_none());
        assert!(VersionedRow::new(1, 0).with_endpoint("::1", 70000).is_err());
    }
}
