use axum::{extract::Query, http::StatusCode, Json};
use contracts::domain::a004_sales_disposition::aggregate::{SalesDisposition, SalesDispositionDto};
use serde::Deserialize;
use serde_json::json;

use crate::domain::a004_sales_disposition;

use super::is_client_error;

#[derive(Debug, Deserialize)]
pub struct DispositionQuery {
    pub seller_id: String,
    pub month: String,
}

/// GET /api/a004/dispositions?seller_id=...&month=2024-03
pub async fn list(
    Query(q): Query<DispositionQuery>,
) -> Result<Json<Vec<SalesDisposition>>, StatusCode> {
    match a004_sales_disposition::service::list(&q.seller_id, &q.month).await {
        Ok(v) => Ok(Json(v)),
        Err(e) if is_client_error(&e) => Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            tracing::error!("Failed to list dispositions: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/a004/dispositions
pub async fn create(
    Json(dto): Json<SalesDispositionDto>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match a004_sales_disposition::service::create(dto).await {
        Ok(Some(id)) => Ok(Json(json!({"id": id.to_string()}))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) if is_client_error(&e) => {
            tracing::warn!("Disposition rejected: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
        Err(e) => {
            tracing::error!("Failed to create disposition: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
