use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
};
use std::sync::Arc;

use super::memory::PartitionedRowStore;
use super::protocol::{
    GetRowResponse, PartitionDumpResponse, SeedRequest, SeedResponse, StatsResponse,
};

pub async fn handle_get_row(
    Extension(store): Extension<Arc<PartitionedRowStore>>,
    Path(key): Path<i64>,
) -> (StatusCode, Json<GetRowResponse>) {
    match store.get(key).await {
        Some(row) => (StatusCode::OK, Json(GetRowResponse { row: Some(row) })),
        None => {
            tracing::debug!("GET: key {} not found", key);
            (StatusCode::NOT_FOUND, Json(GetRowResponse { row: None }))
        }
    }
}

pub async fn handle_seed(
    Extension(store): Extension<Arc<PartitionedRowStore>>,
    Json(req): Json<SeedRequest>,
) -> (StatusCode, Json<SeedResponse>) {
    let seeded = store.seed_many(req.rows).await;
    tracing::info!("Seeded {} row(s)", seeded);
    (StatusCode::OK, Json(SeedResponse { seeded }))
}

pub async fn handle_partition_dump(
    Extension(store): Extension<Arc<PartitionedRowStore>>,
    Path(partition): Path<u32>,
) -> (StatusCode, Json<PartitionDumpResponse>) {
    match store.dump_partition(partition).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(PartitionDumpResponse { partition, rows }),
        ),
        Err(e) => {
            tracing::warn!("Partition dump rejected: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(PartitionDumpResponse {
                    partition,
                    rows: Vec::new(),
                }),
            )
        }
    }
}

pub async fn handle_stats(
    Extension(store): Extension<Arc<PartitionedRowStore>>,
) -> (StatusCode, Json<StatsResponse>) {
    let rows = store.local_row_count().await;
    let mean_version = store.version_average().await.finalize();

    (
        StatusCode::OK,
        Json(StatsResponse {
            partitions: store.partitioner().num_partitions(),
            rows,
            mean_version,
        }),
    )
}
