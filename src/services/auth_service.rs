//! Authentication service
//! 登录校验与令牌签发

use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::auth::{JwtService, PasswordHasher};
use crate::error::{AppError, Result};
use crate::models::auth::{LoginRequest, LoginResponse};
use crate::models::user::UserInfo;
use crate::repository::UserRepository;

/// 认证服务
pub struct AuthService {
    db: SqlitePool,
    jwt_service: Arc<JwtService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(db: SqlitePool, jwt_service: Arc<JwtService>) -> Self {
        Self { db, jwt_service, hasher: PasswordHasher::new() }
    }

    /// 登录：校验凭据，更新最后登录时间，签发令牌
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let repo = UserRepository::new(self.db.clone());

        let user = repo
            .get_by_username(&request.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        // 禁用账户不允许登录
        if !user.active {
            warn!(user_id = user.id, "Login refused for inactive user");
            return Err(AppError::Unauthorized);
        }

        self.hasher.verify(&request.password, &user.password_hash)?;

        repo.touch_last_login(user.id).await?;

        let info = UserInfo::from(user);
        let token = self.jwt_service.generate_token(&info)?;

        info!(user_id = info.id, "User logged in");

        Ok(LoginResponse {
            token,
            expires_in: self.jwt_service.token_exp_secs(),
            user: info,
        })
    }

    /// 查询当前主体信息
    pub async fn current_user(&self, user_id: i64) -> Result<UserInfo> {
        let repo = UserRepository::new(self.db.clone());
        repo.get_info(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// 确保存在默认管理员账户（首次启动引导）
    pub async fn ensure_default_admin(&self, password: &str) -> Result<()> {
        let repo = UserRepository::new(self.db.clone());

        if repo.get_by_username("admin").await?.is_some() {
            return Ok(());
        }

        let password_hash = self.hasher.hash(password)?;
        repo.create("admin", &password_hash, None, crate::models::user::UserRole::Admin)
            .await?;

        warn!("Default admin account created; change its password after first login");
        Ok(())
    }
}
