//! System statistics service
//! 资源指标为模拟数据（本系统不做真实指标采集）；
//! SSH/防火墙统计由两个存储聚合而来

use chrono::Utc;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::instrument;

use crate::error::Result;
use crate::models::stats::*;
use crate::repository::StatsRepository;

const GIB: u64 = 1024 * 1024 * 1024;

/// 系统统计服务
pub struct StatsService {
    db: SqlitePool,
}

impl StatsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// 当前（模拟）系统统计快照
    pub fn current(&self) -> SystemStatistics {
        let mut rng = rand::thread_rng();

        let memory_total = 16 * GIB;
        let memory_used = rng.gen_range(0..8 * GIB);
        let disk_total = 500 * GIB;
        let disk_used = rng.gen_range(0..250 * GIB);
        let uptime_secs = rng.gen_range(0..30) * 86400 + rng.gen_range(0..86400);

        SystemStatistics {
            cpu: CpuStats {
                usage: rng.gen_range(0.0..100.0),
                cores: 4,
                model: "Intel(R) Core(TM) i7".to_string(),
                speed_mhz: 2800,
            },
            memory: UsageStats {
                total: memory_total,
                used: memory_used,
                free: memory_total - memory_used,
                usage_percentage: memory_used as f64 / memory_total as f64 * 100.0,
            },
            disk: UsageStats {
                total: disk_total,
                used: disk_used,
                free: disk_total - disk_used,
                usage_percentage: disk_used as f64 / disk_total as f64 * 100.0,
            },
            network: NetworkStats {
                rx: rng.gen_range(0..10 * 1024 * 1024),
                tx: rng.gen_range(0..5 * 1024 * 1024),
                connections: rng.gen_range(0..20),
            },
            uptime: UptimeStats {
                secs: uptime_secs,
                formatted: format_uptime(uptime_secs),
            },
            load_average: [
                rng.gen_range(0.0..2.0),
                rng.gen_range(0.0..1.5),
                rng.gen_range(0.0..1.0),
            ],
        }
    }

    /// 采样：把当前快照追加进时间序列
    #[instrument(skip(self))]
    pub async fn sample(&self) -> Result<SystemStat> {
        let snapshot = self.current();
        let repo = StatsRepository::new(self.db.clone());

        repo.insert(
            Utc::now(),
            snapshot.cpu.usage,
            snapshot.memory.usage_percentage,
            snapshot.disk.usage_percentage,
            snapshot.network.rx as i64,
            snapshot.network.tx as i64,
            snapshot.network.connections as i64,
        )
        .await
    }

    /// 历史快照，最新在前
    pub async fn history(&self, limit: i64) -> Result<Vec<SystemStat>> {
        let repo = StatsRepository::new(self.db.clone());
        repo.history(limit.clamp(1, 1000)).await
    }

    /// SSH 访问统计（真实聚合，不模拟）
    pub async fn ssh_statistics(&self) -> Result<SshStatistics> {
        let total_attempts =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM access_attempts")
                .fetch_one(&self.db)
                .await?;

        let pending_attempts = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM access_attempts WHERE status = 'pending'",
        )
        .fetch_one(&self.db)
        .await?;

        let authorized_attempts = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM access_attempts WHERE status = 'authorized'",
        )
        .fetch_one(&self.db)
        .await?;

        let rejected_attempts = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM access_attempts WHERE status = 'rejected'",
        )
        .fetch_one(&self.db)
        .await?;

        let last_attempt = sqlx::query_scalar::<_, Option<chrono::DateTime<Utc>>>(
            "SELECT MAX(timestamp) FROM access_attempts",
        )
        .fetch_one(&self.db)
        .await?;

        let top_usernames = sqlx::query_as::<_, UsernameCount>(
            r#"
            SELECT username, COUNT(*) AS count
            FROM access_attempts
            GROUP BY username
            ORDER BY count DESC, username ASC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(SshStatistics {
            total_attempts,
            pending_attempts,
            authorized_attempts,
            rejected_attempts,
            last_attempt,
            top_usernames,
        })
    }

    /// 防火墙状态（按规则表聚合）
    pub async fn firewall_status(&self) -> Result<FirewallStatus> {
        let total_rules = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM firewall_rules")
            .fetch_one(&self.db)
            .await?;

        let active_rules = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM firewall_rules WHERE active = 1",
        )
        .fetch_one(&self.db)
        .await?;

        let allow_rules = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM firewall_rules WHERE active = 1 AND action = 'allow'",
        )
        .fetch_one(&self.db)
        .await?;

        let deny_rules = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM firewall_rules WHERE active = 1 AND action = 'deny'",
        )
        .fetch_one(&self.db)
        .await?;

        Ok(FirewallStatus {
            active: true,
            total_rules,
            active_rules,
            allow_rules,
            deny_rules,
        })
    }
}

/// 格式化运行时长，例如 "10d 5h 30m"
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let mins = (secs % 3600) / 60;
    format!("{}d {}h {}m", days, hours, mins)
}
