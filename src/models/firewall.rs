//! Firewall rule domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 规则动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Deny,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Allow => "allow",
            RuleAction::Deny => "deny",
        }
    }
}

/// 流量方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RuleDirection {
    In,
    Out,
    Both,
}

/// 协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RuleProtocol {
    Tcp,
    Udp,
    Any,
}

impl RuleProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleProtocol::Tcp => "tcp",
            RuleProtocol::Udp => "udp",
            RuleProtocol::Any => "any",
        }
    }
}

/// Firewall rule
/// 规则从不物理删除；撤销是软删除（active = false），保留审计历史
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FirewallRule {
    pub id: i64,
    pub ip: String,
    /// 端口号或字面量 "any"
    pub port: String,
    pub action: RuleAction,
    pub direction: RuleDirection,
    pub protocol: RuleProtocol,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub active: bool,
    pub description: Option<String>,
    /// 产生该规则的访问尝试（手工添加的规则为空）
    pub source_attempt_id: Option<i64>,
}

/// 端口字段同时接受数字与字符串（"any" 或 "2222"）
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(i64),
    Text(String),
}

impl PortValue {
    pub fn as_spec(&self) -> String {
        match self {
            PortValue::Number(n) => n.to_string(),
            PortValue::Text(s) => s.clone(),
        }
    }
}

/// Add rule request
#[derive(Debug, Deserialize)]
pub struct AddRuleRequest {
    pub ip: String,
    pub port: PortValue,
    pub action: RuleAction,
    pub direction: Option<RuleDirection>,
    pub protocol: Option<RuleProtocol>,
    pub description: Option<String>,
}

/// Delete rule request
#[derive(Debug, Deserialize)]
pub struct DeleteRuleRequest {
    pub ip: String,
    pub port: PortValue,
}

/// Revoke request body
#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub ip: String,
}

/// Rule list filters
#[derive(Debug, Deserialize)]
pub struct RuleListQuery {
    pub active: Option<bool>,
}

/// 统一操作结果信封
/// 所有变更操作（authorize/reject/revoke/add/delete）都以该信封返回，
/// 展示层直接渲染 message，不解释错误种类
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<i64>,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), rule_id: None }
    }

    pub fn ok_with_rule(message: impl Into<String>, rule_id: i64) -> Self {
        Self { success: true, message: message.into(), rule_id: Some(rule_id) }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into(), rule_id: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_value_accepts_number_and_text() {
        let n: PortValue = serde_json::from_str("2222").unwrap();
        assert_eq!(n.as_spec(), "2222");

        let s: PortValue = serde_json::from_str("\"any\"").unwrap();
        assert_eq!(s.as_spec(), "any");
    }

    #[test]
    fn test_rule_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&RuleAction::Allow).unwrap(), "\"allow\"");
        assert_eq!(serde_json::to_string(&RuleDirection::In).unwrap(), "\"in\"");
        assert_eq!(serde_json::to_string(&RuleProtocol::Tcp).unwrap(), "\"tcp\"");
    }

    #[test]
    fn test_outcome_envelope_omits_missing_rule_id() {
        let json = serde_json::to_value(ActionOutcome::ok("done")).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("rule_id").is_none());

        let json = serde_json::to_value(ActionOutcome::ok_with_rule("done", 7)).unwrap();
        assert_eq!(json["rule_id"], 7);
    }
}
