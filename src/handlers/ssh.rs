//! SSH 访问管理的 HTTP 处理器
//! 访问尝试列表、模拟录入与授权/拒绝/撤销决策

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{auth::middleware::AuthContext, error::AppError, middleware::AppState, models::access::*, models::firewall::RevokeRequest};

/// 列出访问尝试，可按状态过滤
pub async fn list_attempts(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Query(query): Query<AttemptListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = state.access_service.list_attempts(query.status).await?;

    Ok(Json(json!({
        "attempts": attempts,
        "count": attempts.len()
    })))
}

/// 记录一次模拟访问尝试（开发/演示用）
pub async fn simulate_attempt(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Json(req): Json<SimulateAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = state.access_service.record_attempt(&req.ip, &req.user).await?;

    Ok(Json(json!({
        "message": "Access attempt recorded",
        "attempt": attempt
    })))
}

/// 授权访问尝试
pub async fn authorize_attempt(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<DecisionRequest>,
) -> impl IntoResponse {
    let outcome = state
        .access_service
        .authorize(id, &req.ip, &auth_context.username)
        .await;

    Json(outcome)
}

/// 拒绝访问尝试
pub async fn reject_attempt(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<DecisionRequest>,
) -> impl IntoResponse {
    let outcome = state
        .access_service
        .reject(id, &req.ip, &auth_context.username)
        .await;

    Json(outcome)
}

/// 撤销一条由授权产生的规则
/// 不回写对应访问尝试的状态
pub async fn revoke_rule(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<RevokeRequest>,
) -> impl IntoResponse {
    let outcome = state.access_service.revoke(id, &req.ip).await;

    Json(outcome)
}

/// SSH 访问统计
pub async fn ssh_statistics(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.stats_service.ssh_statistics().await?;
    Ok(Json(stats))
}
