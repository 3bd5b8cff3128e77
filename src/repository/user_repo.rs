//! User repository (面板用户数据访问)

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::user::{User, UserInfo, UserRole},
};

pub struct UserRepository {
    db: SqlitePool,
}

impl UserRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// 创建用户（password_hash 由调用方生成）
    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        role: UserRole,
    ) -> Result<UserInfo, AppError> {
        let user = sqlx::query_as::<_, UserInfo>(
            r#"
            INSERT INTO users (username, password_hash, email, role, created_at, active)
            VALUES ($1, $2, $3, $4, $5, 1)
            RETURNING id, username, email, role, created_at, last_login, active
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::validation("Username already exists")
            }
            _ => AppError::Database(e),
        })?;

        Ok(user)
    }

    /// 按用户名查找（含密码哈希，仅认证路径使用）
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.db)
            .await?;

        Ok(user)
    }

    /// 按 ID 查找对外信息
    pub async fn get_info(&self, id: i64) -> Result<Option<UserInfo>, AppError> {
        let user = sqlx::query_as::<_, UserInfo>(
            "SELECT id, username, email, role, created_at, last_login, active FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 列出所有用户（不含密码哈希）
    pub async fn list(&self) -> Result<Vec<UserInfo>, AppError> {
        let users = sqlx::query_as::<_, UserInfo>(
            "SELECT id, username, email, role, created_at, last_login, active FROM users ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    /// 更新启用状态，返回是否命中记录
    pub async fn set_active(&self, id: i64, active: bool) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 更新密码哈希，返回是否命中记录
    pub async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 更新最后登录时间
    pub async fn touch_last_login(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// 统计活动的管理员数量（用于禁用最后一个管理员的保护）
    pub async fn count_active_admins(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role = 'admin' AND active = 1",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }
}
