use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::api::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D410 SALES PERFORMANCE
        // ========================================
        .route(
            "/api/d410/sellers/:id/summary",
            get(handlers::d410_sales_performance::get_seller_summary),
        )
        .route(
            "/api/d410/sellers/:id/rank",
            get(handlers::d410_sales_performance::get_seller_rank),
        )
        .route(
            "/api/d410/teams/leaderboard",
            get(handlers::d410_sales_performance::get_team_leaderboard),
        )
        .route(
            "/api/d410/teams/:id/summary",
            get(handlers::d410_sales_performance::get_team_summary),
        )
        .route(
            "/api/d410/ranking",
            get(handlers::d410_sales_performance::get_ranking),
        )
        // ========================================
        // ADMIN (write paths)
        // ========================================
        // A001 Seller handlers
        .route(
            "/api/a001/sellers",
            get(handlers::a001_seller::list_all).post(handlers::a001_seller::create),
        )
        .route(
            "/api/a001/sellers/:id",
            get(handlers::a001_seller::get_by_id),
        )
        // A002 Team handlers
        .route(
            "/api/a002/teams",
            get(handlers::a002_team::list_all).post(handlers::a002_team::create),
        )
        .route(
            "/api/a002/teams/:id/active",
            post(handlers::a002_team::set_active),
        )
        .route(
            "/api/a002/teams/:id/members",
            get(handlers::a002_team::list_members).post(handlers::a002_team::add_member),
        )
        .route(
            "/api/a002/teams/:id/members/:seller_id",
            delete(handlers::a002_team::remove_member),
        )
        // A003 Sales target handlers
        .route(
            "/api/a003/targets",
            get(handlers::a003_sales_target::list_by_month)
                .post(handlers::a003_sales_target::upsert),
        )
        .route(
            "/api/a003/targets/:id",
            delete(handlers::a003_sales_target::delete),
        )
        // A004 Sales disposition handlers
        .route(
            "/api/a004/dispositions",
            get(handlers::a004_sales_disposition::list)
                .post(handlers::a004_sales_disposition::create),
        )
        // ========================================
        // SYSTEM LOG
        // ========================================
        .route(
            "/api/logs",
            get(handlers::logs::list_all).delete(handlers::logs::clear_all),
        )
}
