use super::protocol::{CasResponse, PartitionCasResponse};
use super::router::InvocationRouter;
use crate::error::CasError;
use crate::procedure::CasRequest;

use axum::{Extension, Json, extract::Path, http::StatusCode};
use std::sync::Arc;

fn status_for(error: &CasError) -> StatusCode {
    match error {
        CasError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CasError::Conflict { .. } => StatusCode::CONFLICT,
    }
}

pub async fn handle_cas(
    Extension(router): Extension<Arc<InvocationRouter>>,
    Json(req): Json<CasRequest>,
) -> (StatusCode, Json<CasResponse>) {
    match router.invoke(req).await {
        Ok(result) => {
            let response = CasResponse::from(&result);
            let status = if result.is_fully_applied() {
                StatusCode::OK
            } else {
                StatusCode::CONFLICT
            };
            (status, Json(response))
        }
        Err(e) => {
            tracing::error!("Rejected conditional update: {}", e);
            (status_for(&e), Json(CasResponse::rejected(e)))
        }
    }
}

pub async fn handle_partition_cas(
    Extension(router): Extension<Arc<InvocationRouter>>,
    Path(partition): Path<u32>,
    Json(req): Json<CasRequest>,
) -> (StatusCode, Json<PartitionCasResponse>) {
    match router.invoke_partition(partition, &req).await {
        Ok(updated_count) => {
            tracing::debug!(
                "Partition {} invocation updated {} row(s)",
                partition,
                updated_count
            );
            (
                StatusCode::OK,
                Json(PartitionCasResponse {
                    partition,
                    updated_count,
                    error: None,
                }),
            )
        }
        Err(e) => {
            tracing::warn!("Partition {} invocation failed: {}", partition, e);
            (
                status_for(&e),
                Json(PartitionCasResponse {
                    partition,
                    updated_count: 0,
                    error: Some(e),
                }),
            )
        }
    }
}
