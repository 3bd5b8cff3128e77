//! System stats repository (系统指标数据访问)

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{error::AppError, models::stats::SystemStat};

pub struct StatsRepository {
    db: SqlitePool,
}

impl StatsRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// 追加一条指标快照
    pub async fn insert(
        &self,
        timestamp: DateTime<Utc>,
        cpu_usage: f64,
        memory_usage: f64,
        disk_usage: f64,
        network_rx: i64,
        network_tx: i64,
        connections: i64,
    ) -> Result<SystemStat, AppError> {
        let stat = sqlx::query_as::<_, SystemStat>(
            r#"
            INSERT INTO system_stats (
                timestamp, cpu_usage, memory_usage, disk_usage,
                network_rx, network_tx, connections
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(timestamp)
        .bind(cpu_usage)
        .bind(memory_usage)
        .bind(disk_usage)
        .bind(network_rx)
        .bind(network_tx)
        .bind(connections)
        .fetch_one(&self.db)
        .await?;

        Ok(stat)
    }

    /// 最近 limit 条快照，最新在前
    pub async fn history(&self, limit: i64) -> Result<Vec<SystemStat>, AppError> {
        let stats = sqlx::query_as::<_, SystemStat>(
            "SELECT * FROM system_stats ORDER BY timestamp DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(stats)
    }
}
