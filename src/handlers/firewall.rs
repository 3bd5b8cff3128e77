//! 防火墙规则管理的 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    auth::middleware::AuthContext, error::AppError, middleware::AppState, models::firewall::*,
};

/// 列出防火墙规则
/// 默认只返回活动规则；?active=false 返回全部（含已撤销的审计记录）
pub async fn list_rules(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Query(query): Query<RuleListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let only_active = query.active.unwrap_or(true);
    let rules = state.access_service.list_rules(only_active).await?;

    Ok(Json(json!({
        "rules": rules,
        "count": rules.len()
    })))
}

/// 添加防火墙规则
pub async fn add_rule(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<AddRuleRequest>,
) -> impl IntoResponse {
    let outcome = state.access_service.add_rule(&req, &auth_context.username).await;

    Json(outcome)
}

/// 删除（软删除）防火墙规则
pub async fn delete_rule(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<DeleteRuleRequest>,
) -> impl IntoResponse {
    let outcome = state
        .access_service
        .delete_rule(id, &req.ip, &req.port.as_spec())
        .await;

    Json(outcome)
}

/// 防火墙状态汇总
pub async fn firewall_status(
    State(state): State<Arc<AppState>>,
    _auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let status = state.stats_service.firewall_status().await?;
    Ok(Json(status))
}
