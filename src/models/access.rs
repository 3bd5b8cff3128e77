//! SSH access attempt domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 访问尝试状态
/// 状态机：pending --authorize--> authorized，pending --reject--> rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttemptStatus {
    Pending,
    Authorized,
    Rejected,
}

/// SSH access attempt
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessAttempt {
    pub id: i64,
    pub ip: String,
    /// 声称的用户名（列名 username，序列化为 user 保持对外字段兼容）
    #[serde(rename = "user")]
    pub username: String,
    pub port: i64,
    pub timestamp: DateTime<Utc>,
    pub status: AttemptStatus,
    pub details: Option<String>,
}

/// 带 time_ago 的访问尝试视图（读取时计算，不落库）
#[derive(Debug, Serialize)]
pub struct AccessAttemptView {
    #[serde(flatten)]
    pub attempt: AccessAttempt,
    pub time_ago: String,
}

impl AccessAttemptView {
    pub fn at(attempt: AccessAttempt, now: DateTime<Utc>) -> Self {
        let time_ago = time_ago(attempt.timestamp, now);
        Self { attempt, time_ago }
    }
}

/// Simulated attempt request
#[derive(Debug, Deserialize)]
pub struct SimulateAttemptRequest {
    pub ip: String,
    pub user: String,
}

/// Authorize/reject request body
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub ip: String,
}

/// Attempt list filters
#[derive(Debug, Deserialize)]
pub struct AttemptListQuery {
    pub status: Option<AttemptStatus>,
}

/// 计算人类可读的时间差
pub fn time_ago(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - from).num_seconds().max(0);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if secs < 60 {
        format!("{} seconds", secs)
    } else if mins < 60 {
        format!("{} minutes", mins)
    } else if hours < 24 {
        format!("{} hours", hours)
    } else {
        format!("{} days", days)
    }
}
