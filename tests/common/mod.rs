//! 测试公共模块
//! 提供测试辅助函数和测试工具

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use secrecy::Secret;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use vps_admin::{
    auth::jwt::JwtService,
    config::{
        AppConfig, DatabaseConfig, FirewallConfig, LoggingConfig, SecurityConfig, ServerConfig,
    },
    db,
    firewall::{driver::UfwDriver, FirewallDriver},
    middleware::AppState,
    services::{AccessService, AuthService, StatsService},
};

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            // 内存数据库；单连接保证所有查询命中同一个库
            url: Secret::new("sqlite::memory:".to_string()),
            max_connections: 1,
            acquire_timeout_secs: 5,
            busy_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new("test-secret-key-for-testing-only-min-32-chars".to_string()),
            token_exp_secs: 3600,
            password_min_length: 8,
            trust_proxy: false,
            allowed_ips: None,
        },
        firewall: FirewallConfig {
            mode: "simulate".to_string(),
            command: "ufw".to_string(),
            ssh_port: 2222,
            command_timeout_secs: 5,
        },
    }
}

/// 初始化测试数据库
pub async fn setup_test_db(config: &AppConfig) -> SqlitePool {
    let pool = db::create_pool(&config.database)
        .await
        .expect("Failed to create test database pool");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// 模拟驱动：从不失败
pub fn simulated_driver() -> FirewallDriver {
    FirewallDriver::Simulated
}

/// 必然失败的驱动：命令路径不存在，用于验证 best-effort 语义
pub fn failing_driver() -> FirewallDriver {
    FirewallDriver::Ufw(UfwDriver {
        command: "/nonexistent/ufw-for-tests".to_string(),
        timeout: Duration::from_secs(1),
    })
}

/// 创建访问决策服务
pub fn access_service(pool: &SqlitePool, driver: FirewallDriver) -> AccessService {
    AccessService::new(pool.clone(), driver, 2222)
}

/// 创建测试应用状态
pub async fn create_test_app_state(pool: SqlitePool) -> Arc<AppState> {
    let config = create_test_config();
    let jwt_service =
        Arc::new(JwtService::from_config(&config).expect("Failed to create JWT service"));

    let access_service =
        Arc::new(AccessService::new(pool.clone(), FirewallDriver::Simulated, 2222));
    let auth_service = Arc::new(AuthService::new(pool.clone(), jwt_service.clone()));
    let stats_service = Arc::new(StatsService::new(pool.clone()));

    Arc::new(AppState {
        config,
        db: pool,
        access_service,
        auth_service,
        stats_service,
        jwt_service,
    })
}

/// 插入一条访问尝试，返回 ID
/// 显式时间戳，便于断言排序
pub async fn insert_attempt(
    pool: &SqlitePool,
    ip: &str,
    username: &str,
    timestamp: DateTime<Utc>,
) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO access_attempts (ip, username, port, timestamp, status, details)
        VALUES ($1, $2, 2222, $3, 'pending', 'Simulated access attempt')
        RETURNING id
        "#,
    )
    .bind(ip)
    .bind(username)
    .bind(timestamp)
    .fetch_one(pool)
    .await
    .expect("Failed to insert test attempt")
}

/// 插入一条防火墙规则，返回 ID
pub async fn insert_rule(pool: &SqlitePool, ip: &str, action: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO firewall_rules (ip, port, action, direction, protocol, created_at, created_by, active)
        VALUES ($1, '2222', $2, 'in', 'tcp', $3, 'test', 1)
        RETURNING id
        "#,
    )
    .bind(ip)
    .bind(action)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .expect("Failed to insert test rule")
}

/// 规则总数
pub async fn count_rules(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM firewall_rules")
        .fetch_one(pool)
        .await
        .expect("Failed to count rules")
}

/// 读取尝试状态
pub async fn attempt_status(pool: &SqlitePool, id: i64) -> String {
    sqlx::query_scalar::<_, String>("SELECT status FROM access_attempts WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Failed to read attempt status")
}

/// 读取规则 active 标志
pub async fn rule_active(pool: &SqlitePool, id: i64) -> bool {
    sqlx::query_scalar::<_, bool>("SELECT active FROM firewall_rules WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("Failed to read rule active flag")
}
