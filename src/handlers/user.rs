//! 用户管理的 HTTP 处理器

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::{
    auth::{middleware::AuthContext, PasswordHasher},
    error::AppError,
    middleware::AppState,
    models::user::*,
    repository::UserRepository,
};

/// 仅管理员可管理用户
fn require_admin(auth_context: &AuthContext) -> Result<(), AppError> {
    if auth_context.role != UserRole::Admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&auth_context)?;

    let repo = UserRepository::new(state.db.clone());
    let users = repo.list().await?;

    Ok(Json(json!({
        "users": users,
        "count": users.len()
    })))
}

/// 创建用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&auth_context)?;

    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let hasher = PasswordHasher::new();
    let password_hash = hasher.hash(&req.password)?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create(
            &req.username,
            &password_hash,
            req.email.as_deref(),
            req.role.unwrap_or(UserRole::Admin),
        )
        .await?;

    Ok(Json(json!({
        "message": "User created",
        "user": user
    })))
}

/// 更新用户启用状态
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_admin(&auth_context)?;

    let repo = UserRepository::new(state.db.clone());

    // 禁用前确认目标不是最后一个活动管理员
    if !req.active {
        let target = repo
            .get_info(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if target.role == UserRole::Admin
            && target.active
            && repo.count_active_admins().await? <= 1
        {
            return Err(AppError::validation("Cannot deactivate the last active admin"));
        }
    }

    let updated = repo.set_active(id, req.active).await?;
    if !updated {
        return Err(AppError::not_found("User not found"));
    }

    Ok(Json(json!({
        "message": if req.active { "User activated" } else { "User deactivated" }
    })))
}

/// 修改用户密码
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Path(id): Path<i64>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 管理员可改任何人；普通用户只能改自己
    if auth_context.role != UserRole::Admin && auth_context.user_id != id {
        return Err(AppError::Forbidden);
    }

    req.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let hasher = PasswordHasher::new();
    let password_hash = hasher.hash(&req.password)?;

    let repo = UserRepository::new(state.db.clone());
    let updated = repo.set_password_hash(id, &password_hash).await?;
    if !updated {
        return Err(AppError::not_found("User not found"));
    }

    Ok(Json(json!({
        "message": "Password updated"
    })))
}
