//! VPS 管理面板服务主入口

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use vps_admin::{
    config::AppConfig,
    db,
    firewall::FirewallDriver,
    handlers::health,
    middleware::AppState,
    routes,
    services::{AccessService, AuthService, StatsService},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("vps-admin {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 生产环境应该直接设置环境变量，不依赖 .env 文件
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    // 设置应用启动时间
    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志与指标
    telemetry::init_telemetry(&config);
    telemetry::init_metrics();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "VPS admin service starting...");

    // 3. 数据库连接池 + 迁移
    let db_pool = db::create_pool(&config.database).await?;
    db::run_migrations(&db_pool).await?;

    tracing::info!("Database initialized");

    // 4. 构建服务与应用状态
    let jwt_service = Arc::new(vps_admin::auth::jwt::JwtService::from_config(&config)?);

    let driver = FirewallDriver::from_config(&config.firewall);
    tracing::info!(mode = %config.firewall.mode, "Firewall driver selected");

    let access_service = Arc::new(AccessService::new(
        db_pool.clone(),
        driver,
        config.firewall.ssh_port,
    ));
    let auth_service = Arc::new(AuthService::new(db_pool.clone(), jwt_service.clone()));
    let stats_service = Arc::new(StatsService::new(db_pool.clone()));

    // 首次启动引导默认管理员
    let admin_password =
        std::env::var("VPS_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    auth_service.ensure_default_admin(&admin_password).await?;

    let app_state = Arc::new(AppState {
        config: config.clone(),
        db: db_pool.clone(),
        access_service,
        auth_service,
        stats_service,
        jwt_service,
    });

    // 5. 构建路由
    let app = routes::create_router(app_state);

    // 6. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        "Server listening"
    );

    // 7. 优雅关闭
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.graceful_shutdown_timeout_secs))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    // 超时后强制关闭
    tokio::time::sleep(tokio::time::Duration::from_secs(timeout_secs)).await;
    tracing::warn!("Graceful shutdown timeout reached, forcing exit");
}

/// 打印帮助信息
fn print_help() {
    println!("vps-admin {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: vps-admin [options]");
    println!();
    println!("Options:");
    println!("  --version     Print version and exit");
    println!("  --help        Print this help and exit");
    println!();
    println!("Environment:");
    println!("  All configuration is read from VPS_-prefixed environment variables");
    println!("  VPS_ADMIN_PASSWORD sets the bootstrap admin password");
}
