//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    /// 最大连接数
    pub max_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    /// SQLite busy 等待时间（秒）
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 密钥（使用 Secret 包装，防止日志泄露）
    pub jwt_secret: Secret<String>,
    /// 令牌过期时间（秒）
    pub token_exp_secs: u64,
    /// 密码最小长度
    pub password_min_length: usize,
    /// 是否信任 X-Forwarded-For 头
    pub trust_proxy: bool,
    /// IP 白名单（可选）
    pub allowed_ips: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirewallConfig {
    /// 驱动模式: "ufw"（执行真实命令）或 "simulate"（只记录数据库）
    pub mode: String,
    /// 防火墙命令路径
    pub command: String,
    /// 受管 SSH 端口
    pub ssh_port: u16,
    /// 单条防火墙命令的超时时间（秒）
    pub command_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub firewall: FirewallConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("database.url", "sqlite://data/vps-admin.db")?
            .set_default("database.max_connections", 5)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.busy_timeout_secs", 5)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.jwt_secret", "change-this-secret-in-production-min-32-chars!")?
            .set_default("security.token_exp_secs", 3600)?
            .set_default("security.password_min_length", 8)?
            .set_default("security.trust_proxy", true)?
            .set_default("firewall.mode", "simulate")?
            .set_default("firewall.command", "ufw")?
            .set_default("firewall.ssh_port", 2222)?
            .set_default("firewall.command_timeout_secs", 5)?;

        // 从环境变量加载配置（前缀为 VPS_）
        settings = settings.add_source(
            Environment::with_prefix("VPS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    fn validate(&self) -> Result<(), ConfigError> {
        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 验证 JWT 密钥长度（至少 32 字符）
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        // 验证令牌过期时间
        if self.security.token_exp_secs < 60 || self.security.token_exp_secs > 86400 {
            return Err(ConfigError::Message(
                "token_exp_secs must be between 60 and 86400 (1 minute to 24 hours)".to_string(),
            ));
        }

        // 验证密码策略
        if self.security.password_min_length < 6 || self.security.password_min_length > 128 {
            return Err(ConfigError::Message(
                "password_min_length must be between 6 and 128".to_string(),
            ));
        }

        // 验证防火墙驱动模式
        match self.firewall.mode.to_lowercase().as_str() {
            "ufw" | "simulate" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid firewall mode: {}. Must be one of: ufw, simulate",
                    self.firewall.mode
                )))
            }
        }

        if self.firewall.ssh_port == 0 {
            return Err(ConfigError::Message("firewall.ssh_port must be >= 1".to_string()));
        }

        if self.firewall.command_timeout_secs == 0 || self.firewall.command_timeout_secs > 60 {
            return Err(ConfigError::Message(
                "firewall.command_timeout_secs must be between 1 and 60".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_defaults() {
        // 清理所有可能的环境变量
        std::env::remove_var("VPS_DATABASE__URL");
        std::env::remove_var("VPS_SERVER__ADDR");
        std::env::remove_var("VPS_LOGGING__LEVEL");
        std::env::remove_var("VPS_FIREWALL__MODE");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.server.addr, "0.0.0.0:3000");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.firewall.mode, "simulate");
        assert_eq!(config.firewall.ssh_port, 2222);
    }

    #[test]
    #[serial]
    fn test_config_validation_invalid_log_level() {
        std::env::remove_var("VPS_DATABASE__URL");
        std::env::set_var("VPS_LOGGING__LEVEL", "invalid");

        let result = AppConfig::from_env();
        assert!(result.is_err());

        std::env::remove_var("VPS_LOGGING__LEVEL");
    }

    #[test]
    #[serial]
    fn test_config_validation_invalid_firewall_mode() {
        std::env::remove_var("VPS_LOGGING__LEVEL");
        std::env::set_var("VPS_FIREWALL__MODE", "iptables");

        let result = AppConfig::from_env();
        assert!(result.is_err());

        std::env::remove_var("VPS_FIREWALL__MODE");
    }
}
