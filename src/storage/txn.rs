//! Partition-Local Transactions
//!
//! A `Partition` owns the rows of one shard. Every invocation against it runs inside
//! `Partition::transact`, which hands the closure a `PartitionTxn`. The transaction keeps the
//! before-image of each row the first time it is mutated, so an `Err` from the closure puts the
//! partition back exactly as it was when the invocation started.

use super::types::VersionedRow;
use crate::procedure::types::{PayloadUpdate, RowAccess};

use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};

pub struct Partition {
    id: u32,
    rows: BTreeMap<i64, VersionedRow>,
}

impl Partition {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            rows: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn get(&self, key: i64) -> Option<&VersionedRow> {
        self.rows.get(&key)
    }

    pub fn insert(&mut self, row: VersionedRow) -> Option<VersionedRow> {
        self.rows.insert(row.key, row)
    }

    pub fn remove(&mut self, key: i64) -> Option<VersionedRow> {
        self.rows.remove(&key)
    }

    pub fn rows(&self) -> impl Iterator<Item = &VersionedRow> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Runs `f` as one unit of atomicity: commit on `Ok`, full rollback on `Err`.
    ///
    /// A panic inside `f` also rolls back before it is resumed, since the partition lock does
    /// not poison.
    pub fn transact<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut PartitionTxn<'_>) -> Result<T, E>,
    {
        let mut txn = PartitionTxn {
            partition: self.id,
            rows: &mut self.rows,
            undo: HashMap::new(),
        };

        match panic::catch_unwind(AssertUnwindSafe(|| f(&mut txn))) {
            Ok(Ok(value)) => {
                txn.commit();
                Ok(value)
            }
            Ok(Err(e)) => {
                txn.rollback();
                Err(e)
            }
            Err(payload) => {
                tracing::error!("Partition {} invocation panicked", txn.partition);
                txn.rollback();
                panic::resume_unwind(payload)
            }
        }
    }
}

pub struct PartitionTxn<'a> {
    partition: u32,
    rows: &'a mut BTreeMap<i64, VersionedRow>,
    /// Before-image per touched key; `None` means the key did not exist.
    undo: HashMap<i64, Option<VersionedRow>>,
}

impl PartitionTxn<'_> {
    pub fn touched(&self) -> usize {
        self.undo.len()
    }

    fn remember(&mut self, key: i64) {
        if !self.undo.contains_key(&key) {
            let before = self.rows.get(&key).cloned();
            self.undo.insert(key, before);
        }
    }

    fn commit(self) {
        tracing::trace!(
            "Partition {} committed {} touched row(s)",
            self.partition,
            self.undo.len()
        );
    }

    fn rollback(self) {
        let PartitionTxn {
            partition,
            rows,
            undo,
        } = self;

        let restored = undo.len();
        for (key, before) in undo {
            match before {
                Some(row) => {
                    rows.insert(key, row);
                }
                None => {
                    rows.remove(&key);
                }
            }
        }
        tracing::debug!(
            "Partition {} rolled back {} touched row(s)",
            partition,
            restored
        );
    }
}

impl RowAccess for PartitionTxn<'_> {
    fn read_version(&self, key: i64) -> Option<i64> {
        self.rows.get(&key).map(|row| row.version)
    }

    fn conditional_update(&mut self, key: i64, update: &PayloadUpdate) -> u64 {
        let Some(next) = self
            .rows
            .get(&key)
            .and_then(|row| row.version.checked_add(1))
        else {
            return 0;
        };
        self.remember(key);

        match self.rows.get_mut(&key) {
            Some(row) => {
                row.version = next;
                update.apply_to(&mut row.payload);
                1
            }
            None => 0,
        }
    }
}
