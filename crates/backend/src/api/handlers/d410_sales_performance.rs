use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::dashboards::d410_sales_performance::{
    LeaderboardQuery, MonthQuery, PerformanceSummary, RankingQuery, RankingResponse, SellerRank,
    TeamLeaderboardResponse, TeamPerformanceSummary,
};

use crate::dashboards::d410_sales_performance::error::PerformanceError;
use crate::dashboards::d410_sales_performance::service;

fn status_for(context: &str, e: PerformanceError) -> StatusCode {
    match e {
        PerformanceError::NotFound(what) => {
            tracing::info!("D410 Dashboard: {} - not found: {}", context, what);
            StatusCode::NOT_FOUND
        }
        PerformanceError::InvalidInput(msg) => {
            tracing::warn!("D410 Dashboard: {} - invalid input: {}", context, msg);
            StatusCode::BAD_REQUEST
        }
        PerformanceError::UpstreamFailure(source) => {
            tracing::error!("D410 Dashboard: {} failed: {:#}", context, source);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// GET /api/d410/sellers/:id/summary?month=2024-03
pub async fn get_seller_summary(
    Path(id): Path<String>,
    Query(q): Query<MonthQuery>,
) -> Result<Json<PerformanceSummary>, StatusCode> {
    service::get_seller_summary(&id, &q.month)
        .await
        .map(Json)
        .map_err(|e| status_for("seller summary", e))
}

/// GET /api/d410/teams/:id/summary?month=2024-03
pub async fn get_team_summary(
    Path(id): Path<String>,
    Query(q): Query<MonthQuery>,
) -> Result<Json<TeamPerformanceSummary>, StatusCode> {
    service::get_team_summary(&id, &q.month)
        .await
        .map(Json)
        .map_err(|e| status_for("team summary", e))
}

/// GET /api/d410/ranking?month=2024-03&department=Sales&sort_key=cash_in
pub async fn get_ranking(
    Query(q): Query<RankingQuery>,
) -> Result<Json<RankingResponse>, StatusCode> {
    match service::get_ranking(q).await {
        Ok(response) => {
            tracing::info!(
                "D410 Dashboard: Returning {} ranked sellers for {}",
                response.rows.len(),
                response.month.period()
            );
            Ok(Json(response))
        }
        Err(e) => Err(status_for("ranking", e)),
    }
}

/// GET /api/d410/sellers/:id/rank?month=2024-03&team_id=...
pub async fn get_seller_rank(
    Path(id): Path<String>,
    Query(q): Query<RankingQuery>,
) -> Result<Json<SellerRank>, StatusCode> {
    service::get_seller_rank(&id, q)
        .await
        .map(Json)
        .map_err(|e| status_for("seller rank", e))
}

/// GET /api/d410/teams/leaderboard?month=2024-03
pub async fn get_team_leaderboard(
    Query(q): Query<LeaderboardQuery>,
) -> Result<Json<TeamLeaderboardResponse>, StatusCode> {
    service::get_team_leaderboard(q)
        .await
        .map(Json)
        .map_err(|e| status_for("team leaderboard", e))
}
