//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer};

use crate::{handlers, middleware::AppState};

/// 请求体大小上限（1 MiB，纯 JSON API 用不到更大的请求）
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let jwt_service = state.jwt_service.clone();

    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由（无需令牌）
    let auth_routes = Router::new().route("/api/v1/auth/login", post(handlers::auth::login));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        // 当前会话
        .route("/api/v1/auth/verify", get(handlers::auth::verify))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))

        // SSH 访问尝试与决策
        .route(
            "/api/v1/ssh/attempts",
            get(handlers::ssh::list_attempts)
        )
        .route(
            "/api/v1/ssh/attempts/simulate",
            post(handlers::ssh::simulate_attempt)
        )
        .route(
            "/api/v1/ssh/attempts/{id}/authorize",
            post(handlers::ssh::authorize_attempt)
        )
        .route(
            "/api/v1/ssh/attempts/{id}/reject",
            post(handlers::ssh::reject_attempt)
        )
        .route(
            "/api/v1/ssh/rules/{id}/revoke",
            post(handlers::ssh::revoke_rule)
        )
        .route("/api/v1/ssh/statistics", get(handlers::ssh::ssh_statistics))

        // 防火墙规则
        .route(
            "/api/v1/firewall/rules",
            get(handlers::firewall::list_rules)
                .post(handlers::firewall::add_rule)
        )
        .route(
            "/api/v1/firewall/rules/{id}/delete",
            post(handlers::firewall::delete_rule)
        )
        .route("/api/v1/firewall/status", get(handlers::firewall::firewall_status))

        // 系统指标
        .route("/api/v1/system/stats", get(handlers::stats::current_stats))
        .route("/api/v1/system/stats/history", get(handlers::stats::stats_history))
        .route("/api/v1/system/stats/sample", post(handlers::stats::record_sample))

        // 用户管理
        .route(
            "/api/v1/users",
            get(handlers::user::list_users)
                .post(handlers::user::create_user)
        )
        .route("/api/v1/users/{id}/status", put(handlers::user::update_status))
        .route("/api/v1/users/{id}/password", put(handlers::user::change_password))
        .layer(axum::middleware::from_fn_with_state(
            jwt_service,
            crate::auth::middleware::jwt_auth_middleware,
        ));

    // 指标端点
    let metrics_routes = Router::new().route("/metrics", get(handlers::metrics::metrics_export));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(authenticated_routes)
        .merge(metrics_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::ip_whitelist_middleware,
        ))
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
