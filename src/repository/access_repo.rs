//! Access attempt repository (SSH 访问尝试数据访问)

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{error::AppError, models::access::*};

pub struct AccessAttemptRepository {
    db: SqlitePool,
}

impl AccessAttemptRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// 记录一次访问尝试
    /// 记录时不做 IP 校验，校验发生在决策时
    pub async fn create(
        &self,
        ip: &str,
        username: &str,
        port: i64,
        timestamp: DateTime<Utc>,
        details: Option<&str>,
    ) -> Result<AccessAttempt, AppError> {
        let attempt = sqlx::query_as::<_, AccessAttempt>(
            r#"
            INSERT INTO access_attempts (ip, username, port, timestamp, status, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(ip)
        .bind(username)
        .bind(port)
        .bind(timestamp)
        .bind(AttemptStatus::Pending)
        .bind(details)
        .fetch_one(&self.db)
        .await?;

        Ok(attempt)
    }

    /// 获取单个访问尝试
    pub async fn get(&self, id: i64) -> Result<Option<AccessAttempt>, AppError> {
        let attempt =
            sqlx::query_as::<_, AccessAttempt>("SELECT * FROM access_attempts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;

        Ok(attempt)
    }

    /// 列出访问尝试，可按状态过滤，最新在前
    pub async fn list(&self, status: Option<AttemptStatus>) -> Result<Vec<AccessAttempt>, AppError> {
        let attempts = if let Some(status) = status {
            sqlx::query_as::<_, AccessAttempt>(
                "SELECT * FROM access_attempts WHERE status = $1 ORDER BY timestamp DESC, id DESC",
            )
            .bind(status)
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, AccessAttempt>(
                "SELECT * FROM access_attempts ORDER BY timestamp DESC, id DESC",
            )
            .fetch_all(&self.db)
            .await?
        };

        Ok(attempts)
    }

    /// 更新尝试状态与备注，返回是否命中记录
    pub async fn update_status(
        &self,
        id: i64,
        status: AttemptStatus,
        details: &str,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE access_attempts SET status = $1, details = $2 WHERE id = $3")
                .bind(status)
                .bind(details)
                .bind(id)
                .execute(&self.db)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
