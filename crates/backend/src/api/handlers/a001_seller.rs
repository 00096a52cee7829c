use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a001_seller::aggregate::{Seller, SellerDto};
use serde_json::json;

use crate::domain::a001_seller;

use super::is_client_error;

/// GET /api/a001/sellers
pub async fn list_all() -> Result<Json<Vec<Seller>>, StatusCode> {
    match a001_seller::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list sellers: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/a001/sellers/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<Seller>, StatusCode> {
    if uuid::Uuid::parse_str(&id).is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }
    match a001_seller::service::get_by_id(&id).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get seller {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/a001/sellers
pub async fn create(Json(dto): Json<SellerDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    match a001_seller::service::create(dto).await {
        Ok(id) => Ok(Json(json!({"id": id.to_string()}))),
        Err(e) if is_client_error(&e) => {
            tracing::warn!("Seller rejected: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
        Err(e) => {
            tracing::error!("Failed to create seller: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
