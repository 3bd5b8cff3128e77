//! Access decision service
//! SSH 访问决策与防火墙规则对账：
//! 尝试状态机 pending -> authorized / rejected，决策落为防火墙规则记录，
//! 撤销将规则软删除
//!
//! 所有变更操作统一返回 ActionOutcome 信封；内部错误在这里消化，
//! 不以未处理错误的形式抛给展示层

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info, instrument, warn};

use crate::error::{AppError, Result};
use crate::firewall::FirewallDriver;
use crate::models::access::*;
use crate::models::firewall::*;
use crate::repository::firewall_repo::NewRule;
use crate::repository::{AccessAttemptRepository, FirewallRuleRepository};
use crate::validation;

/// 访问决策服务
pub struct AccessService {
    db: SqlitePool,
    driver: FirewallDriver,
    /// 受管 SSH 端口（本部署固定 2222）
    ssh_port: u16,
}

impl AccessService {
    pub fn new(db: SqlitePool, driver: FirewallDriver, ssh_port: u16) -> Self {
        Self { db, driver, ssh_port }
    }

    /// 记录一次访问尝试（监控/模拟路径）
    /// 记录时不校验 IP，校验推迟到决策时
    #[instrument(skip(self))]
    pub async fn record_attempt(&self, ip: &str, username: &str) -> Result<AccessAttempt> {
        let repo = AccessAttemptRepository::new(self.db.clone());
        let attempt = repo
            .create(ip, username, self.ssh_port as i64, Utc::now(), Some("Simulated access attempt"))
            .await?;

        info!(attempt_id = attempt.id, ip = %ip, user = %username, "Access attempt recorded");
        Ok(attempt)
    }

    /// 授权访问：放行该 IP 并把决策落为 allow 规则
    #[instrument(skip(self))]
    pub async fn authorize(&self, attempt_id: i64, ip: &str, decided_by: &str) -> ActionOutcome {
        self.decide(attempt_id, ip, decided_by, RuleAction::Allow).await
    }

    /// 拒绝访问：封禁该 IP 并把决策落为 deny 规则
    #[instrument(skip(self))]
    pub async fn reject(&self, attempt_id: i64, ip: &str, decided_by: &str) -> ActionOutcome {
        self.decide(attempt_id, ip, decided_by, RuleAction::Deny).await
    }

    /// 决策主流程：校验 -> best-effort 下发 -> 事务内落库
    async fn decide(
        &self,
        attempt_id: i64,
        ip: &str,
        decided_by: &str,
        action: RuleAction,
    ) -> ActionOutcome {
        // 校验失败则整个操作中止，不产生任何副作用
        if !validation::is_valid_ip_address(ip) {
            return ActionOutcome::fail(format!("Invalid IP address: {}", ip));
        }

        let port = self.ssh_port.to_string();

        // best-effort 下发：失败（例如无权限的开发环境）记日志后继续，
        // 界面反馈不依赖底层命令是否成功
        let enforcement = match action {
            RuleAction::Allow => {
                self.driver.allow(ip, &port, RuleProtocol::Tcp, RuleDirection::In).await
            }
            RuleAction::Deny => {
                self.driver.deny(ip, &port, RuleProtocol::Tcp, RuleDirection::In).await
            }
        };
        if let Err(e) = enforcement {
            warn!(error = %e, ip = %ip, "Firewall command failed, continuing without enforcement");
        }

        // 规则插入与状态更新在同一事务内，保证二者同生同灭
        match self.persist_decision(attempt_id, ip, decided_by, action).await {
            Ok(()) => {
                info!(attempt_id, ip = %ip, action = action.as_str(), "Access decision applied");
                match action {
                    RuleAction::Allow => ActionOutcome::ok(format!("Access authorized for {}", ip)),
                    RuleAction::Deny => ActionOutcome::ok(format!("Access rejected for {}", ip)),
                }
            }
            Err(e) => {
                error!(error = %e, attempt_id, ip = %ip, "Failed to persist access decision");
                ActionOutcome::fail(format!(
                    "Failed to update access attempt: {}",
                    e.user_message()
                ))
            }
        }
    }

    async fn persist_decision(
        &self,
        attempt_id: i64,
        ip: &str,
        decided_by: &str,
        action: RuleAction,
    ) -> Result<()> {
        let (description, status, details) = match action {
            RuleAction::Allow => {
                ("SSH access authorized", AttemptStatus::Authorized, "Access authorized manually")
            }
            RuleAction::Deny => {
                ("SSH access rejected", AttemptStatus::Rejected, "Access rejected manually")
            }
        };

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO firewall_rules (
                ip, port, action, direction, protocol,
                created_at, created_by, active, description, source_attempt_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $8, $9)
            "#,
        )
        .bind(ip)
        .bind(self.ssh_port.to_string())
        .bind(action)
        .bind(RuleDirection::In)
        .bind(RuleProtocol::Tcp)
        .bind(Utc::now())
        .bind(decided_by)
        .bind(description)
        .bind(attempt_id)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query("UPDATE access_attempts SET status = $1, details = $2 WHERE id = $3")
            .bind(status)
            .bind(details)
            .bind(attempt_id)
            .execute(&mut *tx)
            .await?;

        // 未命中则回滚，规则不会留下孤儿记录
        if updated.rows_affected() == 0 {
            return Err(AppError::not_found("Access attempt not found"));
        }

        tx.commit().await?;
        Ok(())
    }

    /// 撤销规则：删除底层规则（best-effort）并将记录标记为不活动
    ///
    /// 不查找也不回写对应的访问尝试——尝试的 authorized 状态是历史审计字段，
    /// 当前是否放行由活动规则决定
    #[instrument(skip(self))]
    pub async fn revoke(&self, rule_id: i64, ip: &str) -> ActionOutcome {
        if !validation::is_valid_ip_address(ip) {
            return ActionOutcome::fail(format!("Invalid IP address: {}", ip));
        }

        if let Err(e) = self.driver.delete(ip, &self.ssh_port.to_string()).await {
            warn!(error = %e, ip = %ip, "Firewall command failed, continuing without enforcement");
        }

        let repo = FirewallRuleRepository::new(self.db.clone());
        match repo.deactivate(rule_id).await {
            Ok(true) => {
                info!(rule_id, ip = %ip, "Firewall rule revoked");
                ActionOutcome::ok(format!("Access revoked for {}", ip))
            }
            Ok(false) => ActionOutcome::fail("Firewall rule not found"),
            Err(e) => {
                error!(error = %e, rule_id, "Failed to revoke firewall rule");
                ActionOutcome::fail(format!("Failed to revoke rule: {}", e.user_message()))
            }
        }
    }

    /// 添加通用防火墙规则（不与访问尝试关联）
    #[instrument(skip(self, req))]
    pub async fn add_rule(&self, req: &AddRuleRequest, created_by: &str) -> ActionOutcome {
        if !validation::is_valid_ip_address(&req.ip) {
            return ActionOutcome::fail(format!("Invalid IP address: {}", req.ip));
        }

        let port = req.port.as_spec();
        if !validation::is_valid_port(&port) {
            return ActionOutcome::fail(format!("Invalid port: {}", port));
        }

        let direction = req.direction.unwrap_or(RuleDirection::In);
        let protocol = req.protocol.unwrap_or(RuleProtocol::Tcp);

        let enforcement = match req.action {
            RuleAction::Allow => self.driver.allow(&req.ip, &port, protocol, direction).await,
            RuleAction::Deny => self.driver.deny(&req.ip, &port, protocol, direction).await,
        };
        if let Err(e) = enforcement {
            warn!(error = %e, ip = %req.ip, "Firewall command failed, continuing without enforcement");
        }

        let repo = FirewallRuleRepository::new(self.db.clone());
        let new_rule = NewRule {
            ip: &req.ip,
            port: &port,
            action: req.action,
            direction,
            protocol,
            created_at: Utc::now(),
            created_by,
            description: req.description.as_deref(),
            source_attempt_id: None,
        };

        match repo.create(&new_rule).await {
            Ok(rule) => {
                info!(rule_id = rule.id, ip = %req.ip, action = req.action.as_str(), "Firewall rule added");
                ActionOutcome::ok_with_rule(format!("Rule added for {}", req.ip), rule.id)
            }
            Err(e) => {
                error!(error = %e, ip = %req.ip, "Failed to add firewall rule");
                ActionOutcome::fail(format!("Failed to add rule: {}", e.user_message()))
            }
        }
    }

    /// 删除通用防火墙规则（软删除）
    #[instrument(skip(self))]
    pub async fn delete_rule(&self, rule_id: i64, ip: &str, port: &str) -> ActionOutcome {
        if !validation::is_valid_ip_address(ip) {
            return ActionOutcome::fail(format!("Invalid IP address: {}", ip));
        }

        if let Err(e) = self.driver.delete(ip, port).await {
            warn!(error = %e, ip = %ip, "Firewall command failed, continuing without enforcement");
        }

        let repo = FirewallRuleRepository::new(self.db.clone());
        match repo.deactivate(rule_id).await {
            Ok(true) => {
                info!(rule_id, ip = %ip, "Firewall rule deleted");
                ActionOutcome::ok(format!("Rule deleted for {}", ip))
            }
            Ok(false) => ActionOutcome::fail("Firewall rule not found"),
            Err(e) => {
                error!(error = %e, rule_id, "Failed to delete firewall rule");
                ActionOutcome::fail(format!("Failed to delete rule: {}", e.user_message()))
            }
        }
    }

    /// 列出访问尝试（最新在前），读取时计算 time_ago
    pub async fn list_attempts(
        &self,
        status: Option<AttemptStatus>,
    ) -> Result<Vec<AccessAttemptView>> {
        let repo = AccessAttemptRepository::new(self.db.clone());
        let now = Utc::now();

        let attempts = repo.list(status).await?;
        Ok(attempts.into_iter().map(|a| AccessAttemptView::at(a, now)).collect())
    }

    /// 列出防火墙规则（最新在前）
    pub async fn list_rules(&self, only_active: bool) -> Result<Vec<FirewallRule>> {
        let repo = FirewallRuleRepository::new(self.db.clone());
        if only_active {
            repo.list_active().await
        } else {
            repo.list().await
        }
    }
}
