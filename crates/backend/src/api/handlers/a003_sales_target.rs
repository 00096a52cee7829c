use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::dashboards::d410_sales_performance::MonthQuery;
use contracts::domain::a003_sales_target::aggregate::{SalesTarget, SalesTargetDto};

use crate::domain::a003_sales_target;

use super::is_client_error;

/// GET /api/a003/targets?month=2024-03
pub async fn list_by_month(
    Query(q): Query<MonthQuery>,
) -> Result<Json<Vec<SalesTarget>>, StatusCode> {
    match a003_sales_target::service::list_by_month(&q.month).await {
        Ok(v) => Ok(Json(v)),
        Err(e) if is_client_error(&e) => Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            tracing::error!("Failed to list targets for {}: {}", q.month, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/a003/targets (upsert по продавцу и месяцу)
pub async fn upsert(Json(dto): Json<SalesTargetDto>) -> Result<Json<SalesTarget>, StatusCode> {
    match a003_sales_target::service::upsert(dto).await {
        Ok(Some(target)) => Ok(Json(target)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) if is_client_error(&e) => {
            tracing::warn!("Target rejected: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
        Err(e) => {
            tracing::error!("Failed to save target: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/a003/targets/:id
pub async fn delete(Path(id): Path<String>) -> Result<(), StatusCode> {
    match a003_sales_target::service::delete(&id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) if is_client_error(&e) => Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            tracing::error!("Failed to delete target {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
