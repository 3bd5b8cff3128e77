//! 认证相关的 HTTP 处理器

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::{
    auth::middleware::AuthContext,
    error::AppError,
    middleware::AppState,
    models::auth::{LoginRequest, VerifyResponse},
};

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.login(req).await?;
    Ok(Json(response))
}

/// 校验当前令牌并返回主体信息
pub async fn verify(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    let user = state.auth_service.current_user(auth_context.user_id).await?;

    Ok(Json(VerifyResponse { authenticated: true, user }))
}

/// 登出
/// 令牌是无状态的；客户端丢弃令牌即可
pub async fn logout(_auth_context: AuthContext) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Logged out"
    }))
}
