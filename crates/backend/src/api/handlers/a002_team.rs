use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a002_team::aggregate::{
    Team, TeamActiveDto, TeamDto, TeamMemberDto, TeamMembership,
};
use serde_json::json;

use crate::domain::a002_team;

use super::is_client_error;

/// GET /api/a002/teams
pub async fn list_all() -> Result<Json<Vec<Team>>, StatusCode> {
    match a002_team::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list teams: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/a002/teams
pub async fn create(Json(dto): Json<TeamDto>) -> Result<Json<serde_json::Value>, StatusCode> {
    match a002_team::service::create(dto).await {
        Ok(id) => Ok(Json(json!({"id": id.to_string()}))),
        Err(e) if is_client_error(&e) => {
            tracing::warn!("Team rejected: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
        Err(e) => {
            tracing::error!("Failed to create team: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/a002/teams/:id/active
pub async fn set_active(
    Path(id): Path<String>,
    Json(dto): Json<TeamActiveDto>,
) -> Result<(), StatusCode> {
    match a002_team::service::set_active(&id, dto.is_active).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(StatusCode::NOT_FOUND),
        Err(e) if is_client_error(&e) => Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            tracing::error!("Failed to update team {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/a002/teams/:id/members
pub async fn list_members(Path(id): Path<String>) -> Result<Json<Vec<TeamMembership>>, StatusCode> {
    match a002_team::service::list_members(&id).await {
        Ok(v) => Ok(Json(v)),
        Err(e) if is_client_error(&e) => Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            tracing::error!("Failed to list members of team {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/a002/teams/:id/members
pub async fn add_member(
    Path(id): Path<String>,
    Json(dto): Json<TeamMemberDto>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match a002_team::service::add_member(&id, dto).await {
        Ok(Some(membership_id)) => Ok(Json(json!({"id": membership_id.to_string()}))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) if is_client_error(&e) => Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            tracing::error!("Failed to add member to team {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// DELETE /api/a002/teams/:id/members/:seller_id
pub async fn remove_member(
    Path((id, seller_id)): Path<(String, String)>,
) -> Result<(), StatusCode> {
    match a002_team::service::remove_member(&id, &seller_id).await {
        Ok(0) => Err(StatusCode::NOT_FOUND),
        Ok(_) => Ok(()),
        Err(e) if is_client_error(&e) => Err(StatusCode::BAD_REQUEST),
        Err(e) => {
            tracing::error!("Failed to remove member {} from team {}: {}", seller_id, id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
