//! System statistics domain models
//! 指标为模拟数据，持久化为追加式时间序列

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 已持久化的系统指标快照
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SystemStat {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub network_rx: i64,
    pub network_tx: i64,
    pub connections: i64,
}

/// 实时（模拟）系统统计
#[derive(Debug, Clone, Serialize)]
pub struct SystemStatistics {
    pub cpu: CpuStats,
    pub memory: UsageStats,
    pub disk: UsageStats,
    pub network: NetworkStats,
    pub uptime: UptimeStats,
    pub load_average: [f64; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct CpuStats {
    pub usage: f64,
    pub cores: u32,
    pub model: String,
    pub speed_mhz: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStats {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub usage_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkStats {
    pub rx: u64,
    pub tx: u64,
    pub connections: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UptimeStats {
    pub secs: u64,
    pub formatted: String,
}

/// SSH 访问统计（由访问尝试表聚合）
#[derive(Debug, Serialize)]
pub struct SshStatistics {
    pub total_attempts: i64,
    pub pending_attempts: i64,
    pub authorized_attempts: i64,
    pub rejected_attempts: i64,
    pub last_attempt: Option<DateTime<Utc>>,
    pub top_usernames: Vec<UsernameCount>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UsernameCount {
    pub username: String,
    pub count: i64,
}

/// 防火墙状态（由规则表聚合）
#[derive(Debug, Serialize)]
pub struct FirewallStatus {
    pub active: bool,
    pub total_rules: i64,
    pub active_rules: i64,
    pub allow_rules: i64,
    pub deny_rules: i64,
}

/// Stats history filters
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    60
}
