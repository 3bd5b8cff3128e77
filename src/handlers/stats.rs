//! 系统统计的 HTTP 处理器

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState,
    models::stats::HistoryQuery,
};

/// 当前（模拟）系统统计
pub async fn current_stats(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
) -> impl IntoResponse {
    Json(state.stats_service.current())
}

/// 指标历史，最新在前
pub async fn stats_history(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.stats_service.history(query.limit).await?;

    Ok(Json(json!({
        "stats": stats,
        "count": stats.len()
    })))
}

/// 采样：立即持久化一条快照
pub async fn record_sample(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let stat = state.stats_service.sample().await?;

    Ok(Json(json!({
        "message": "Sample recorded",
        "stat": stat
    })))
}
