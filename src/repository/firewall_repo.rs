//! Firewall rule repository (防火墙规则数据访问)

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{error::AppError, models::firewall::*};

/// 插入规则的参数
#[derive(Debug, Clone)]
pub struct NewRule<'a> {
    pub ip: &'a str,
    pub port: &'a str,
    pub action: RuleAction,
    pub direction: RuleDirection,
    pub protocol: RuleProtocol,
    pub created_at: DateTime<Utc>,
    pub created_by: &'a str,
    pub description: Option<&'a str>,
    pub source_attempt_id: Option<i64>,
}

pub struct FirewallRuleRepository {
    db: SqlitePool,
}

impl FirewallRuleRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// 插入一条新规则（创建即生效，active = true）
    pub async fn create(&self, rule: &NewRule<'_>) -> Result<FirewallRule, AppError> {
        let rule = sqlx::query_as::<_, FirewallRule>(
            r#"
            INSERT INTO firewall_rules (
                ip, port, action, direction, protocol,
                created_at, created_by, active, description, source_attempt_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $8, $9)
            RETURNING *
            "#,
        )
        .bind(rule.ip)
        .bind(rule.port)
        .bind(rule.action)
        .bind(rule.direction)
        .bind(rule.protocol)
        .bind(rule.created_at)
        .bind(rule.created_by)
        .bind(rule.description)
        .bind(rule.source_attempt_id)
        .fetch_one(&self.db)
        .await?;

        Ok(rule)
    }

    /// 获取单条规则
    pub async fn get(&self, id: i64) -> Result<Option<FirewallRule>, AppError> {
        let rule = sqlx::query_as::<_, FirewallRule>("SELECT * FROM firewall_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(rule)
    }

    /// 列出所有规则，最新在前
    pub async fn list(&self) -> Result<Vec<FirewallRule>, AppError> {
        let rules = sqlx::query_as::<_, FirewallRule>(
            "SELECT * FROM firewall_rules ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rules)
    }

    /// 列出活动规则，最新在前
    pub async fn list_active(&self) -> Result<Vec<FirewallRule>, AppError> {
        let rules = sqlx::query_as::<_, FirewallRule>(
            "SELECT * FROM firewall_rules WHERE active = 1 ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rules)
    }

    /// 软删除：标记规则为不活动，记录保留作审计历史
    /// 返回是否命中记录
    pub async fn deactivate(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE firewall_rules SET active = 0 WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
