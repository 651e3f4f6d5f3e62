//! HTTP application wiring.

use crate::router::handlers::{handle_cas, handle_partition_cas};
use crate::router::protocol::{ENDPOINT_CAS, ENDPOINT_PARTITION_PREFIX};
use crate::router::router::InvocationRouter;
use crate::storage::handlers::{handle_get_row, handle_partition_dump, handle_seed, handle_stats};
use crate::storage::memory::PartitionedRowStore;
use crate::storage::partitioner::PartitionManager;
use crate::storage::protocol::{
    ENDPOINT_GET_ROW, ENDPOINT_PARTITION_DUMP, ENDPOINT_SEED, ENDPOINT_STATS,
};

use anyhow::Result;
use axum::{
    Router,
    extract::Extension,
    routing::{get, post},
};
use std::sync::Arc;

/// Store and router of one node.
pub struct Node {
    pub store: Arc<PartitionedRowStore>,
    pub router: Arc<InvocationRouter>,
}

impl Node {
    pub fn new(num_partitions: u32) -> Result<Self> {
        let partitioner = PartitionManager::new(num_partitions)?;
        let store = Arc::new(PartitionedRowStore::new(partitioner));
        let router = InvocationRouter::new(store.clone());
        Ok(Self { store, router })
    }

    pub fn app(&self) -> Router {
        Router::new()
            .route(ENDPOINT_CAS, post(handle_cas))
            .route(
                &format!("{}/:partition/cas", ENDPOINT_PARTITION_PREFIX),
                post(handle_partition_cas),
            )
            .route(&format!("{}/:key", ENDPOINT_GET_ROW), get(handle_get_row))
            .route(ENDPOINT_SEED, post(handle_seed))
            .route(
                &format!("{}/:partition", ENDPOINT_PARTITION_DUMP),
                get(handle_partition_dump),
            )
            .route(ENDPOINT_STATS, get(handle_stats))
            .layer(Extension(self.store.clone()))
            .layer(Extension(self.router.clone()))
    }
}
