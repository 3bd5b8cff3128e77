//! 防火墙驱动
//! 向底层包过滤器下发 allow/deny/delete 规则
//!
//! 两种实现：ufw（执行真实命令）与 simulate（只打日志，用于开发/测试环境）。
//! 启动时根据配置构造并注入，服务层不感知部署环境。
//! 所有调用都是 best-effort：失败由调用方记录日志后继续

use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::FirewallConfig;
use crate::error::AppError;
use crate::models::firewall::{RuleDirection, RuleProtocol};

/// 防火墙驱动
#[derive(Debug, Clone)]
pub enum FirewallDriver {
    /// 执行真实 ufw 命令
    Ufw(UfwDriver),
    /// 模拟模式：不执行任何命令
    Simulated,
}

impl FirewallDriver {
    /// 根据配置构造驱动
    pub fn from_config(config: &FirewallConfig) -> Self {
        match config.mode.to_lowercase().as_str() {
            "ufw" => FirewallDriver::Ufw(UfwDriver {
                command: config.command.clone(),
                timeout: Duration::from_secs(config.command_timeout_secs),
            }),
            _ => FirewallDriver::Simulated,
        }
    }

    /// 放行 ip -> port 的入站（或指定方向）流量
    pub async fn allow(
        &self,
        ip: &str,
        port: &str,
        protocol: RuleProtocol,
        direction: RuleDirection,
    ) -> Result<(), AppError> {
        match self {
            FirewallDriver::Ufw(ufw) => {
                ufw.run(rule_args("allow", ip, port, protocol, direction)).await
            }
            FirewallDriver::Simulated => {
                info!(ip = %ip, port = %port, "Simulating ufw allow rule");
                Ok(())
            }
        }
    }

    /// 拒绝 ip -> port 的流量
    pub async fn deny(
        &self,
        ip: &str,
        port: &str,
        protocol: RuleProtocol,
        direction: RuleDirection,
    ) -> Result<(), AppError> {
        match self {
            FirewallDriver::Ufw(ufw) => {
                ufw.run(rule_args("deny", ip, port, protocol, direction)).await
            }
            FirewallDriver::Simulated => {
                info!(ip = %ip, port = %port, "Simulating ufw deny rule");
                Ok(())
            }
        }
    }

    /// 删除 ip/port 的已有规则
    pub async fn delete(&self, ip: &str, port: &str) -> Result<(), AppError> {
        match self {
            FirewallDriver::Ufw(ufw) => {
                let mut args = vec!["--force".to_string(), "delete".to_string(), "allow".to_string()];
                args.extend(endpoint_args(ip, port));
                ufw.run(args).await
            }
            FirewallDriver::Simulated => {
                info!(ip = %ip, port = %port, "Simulating ufw rule deletion");
                Ok(())
            }
        }
    }
}

/// 真实 ufw 命令驱动
#[derive(Debug, Clone)]
pub struct UfwDriver {
    /// 命令路径
    pub command: String,
    /// 单条命令超时，防止挂起的外部命令拖住整个决策操作
    pub timeout: Duration,
}

impl UfwDriver {
    /// 执行一条 ufw 命令
    ///
    /// 参数已经过 validation 模块校验，不存在未经检查的用户输入
    async fn run(&self, args: Vec<String>) -> Result<(), AppError> {
        debug!(command = %self.command, args = ?args, "Executing firewall command");

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.command).args(&args).output(),
        )
        .await
        .map_err(|_| {
            AppError::firewall(&format!(
                "firewall command timed out after {}s",
                self.timeout.as_secs()
            ))
        })?
        .map_err(|e| AppError::Firewall(format!("failed to spawn {}: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Firewall(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        info!(command = %self.command, args = ?args, "Firewall command applied");
        Ok(())
    }
}

/// 组装 `ufw <action> [out] from <ip> to any port <port> [proto <p>]` 参数
fn rule_args(
    action: &str,
    ip: &str,
    port: &str,
    protocol: RuleProtocol,
    direction: RuleDirection,
) -> Vec<String> {
    let mut args = vec![action.to_string()];

    // ufw 默认按入站匹配；仅出站需要显式关键字
    if direction == RuleDirection::Out {
        args.push("out".to_string());
    }

    args.extend(endpoint_args(ip, port));

    if protocol != RuleProtocol::Any {
        args.push("proto".to_string());
        args.push(protocol.as_str().to_string());
    }

    args
}

fn endpoint_args(ip: &str, port: &str) -> Vec<String> {
    let mut args = vec![
        "from".to_string(),
        ip.to_string(),
        "to".to_string(),
        "any".to_string(),
    ];

    if port != "any" {
        args.push("port".to_string());
        args.push(port.to_string());
    }

    args
}
