//! 防火墙规则服务测试
//! 覆盖通用规则的添加/删除与活动规则查询

use vps_admin::models::firewall::{
    AddRuleRequest, PortValue, RuleAction, RuleDirection, RuleProtocol,
};

mod common;
use common::*;

fn add_request(ip: &str, port: PortValue, action: RuleAction) -> AddRuleRequest {
    AddRuleRequest {
        ip: ip.to_string(),
        port,
        action,
        direction: None,
        protocol: None,
        description: Some("manual rule".to_string()),
    }
}

#[tokio::test]
async fn test_add_rule_persists_and_returns_rule_id() {
    let config = create_test_config();
    let pool = setup_test_db(&config).await;
    let service = access_service(&pool, simulated_driver());

    let req = add_request("10.0.0.5", PortValue::Number(8080), RuleAction::Allow);
    let outcome = service.add_rule(&req, "admin").await;

    assert!(outcome.success);
    assert!(outcome.message.contains("10.0.0.5"));
    let rule_id = outcome.rule_id.expect("rule_id missing from envelope");

    let rules = service.list_rules(true).await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].id, rule_id);
    assert_eq!(rules[0].port, "8080");
    // 未指定方向/协议时使用默认值
    assert_eq!(rules[0].direction, RuleDirection::In);
    assert_eq!(rules[0].protocol, RuleProtocol::Tcp);
    assert_eq!(rules[0].source_attempt_id, None);
}

#[tokio::test]
async fn test_add_rule_accepts_any_port_and_cidr() {
    let config = create_test_config();
    let pool = setup_test_db(&config).await;
    let service = access_service(&pool, simulated_driver());

    let req = add_request(
        "192.168.1.0/24",
        PortValue::Text("any".to_string()),
        RuleAction::Deny,
    );
    let outcome = service.add_rule(&req, "admin").await;

    assert!(outcome.success);
    let rules = service.list_rules(true).await.unwrap();
    assert_eq!(rules[0].ip, "192.168.1.0/24");
    assert_eq!(rules[0].port, "any");
    assert_eq!(rules[0].action, RuleAction::Deny);
}

#[tokio::test]
async fn test_add_rule_invalid_port_writes_nothing() {
    let config = create_test_config();
    let pool = setup_test_db(&config).await;
    let service = access_service(&pool, simulated_driver());

    let req = add_request(
        "10.0.0.5",
        PortValue::Text("not-a-port".to_string()),
        RuleAction::Allow,
    );
    let outcome = service.add_rule(&req, "admin").await;

    assert!(!outcome.success);
    assert!(outcome.message.contains("Invalid port"));
    assert_eq!(count_rules(&pool).await, 0);
}

#[tokio::test]
async fn test_add_rule_invalid_ip_writes_nothing() {
    let config = create_test_config();
    let pool = setup_test_db(&config).await;
    let service = access_service(&pool, simulated_driver());

    let req = add_request("999.0.0.1", PortValue::Number(80), RuleAction::Allow);
    let outcome = service.add_rule(&req, "admin").await;

    assert!(!outcome.success);
    assert!(outcome.message.contains("Invalid IP address"));
    assert_eq!(count_rules(&pool).await, 0);
}

#[tokio::test]
async fn test_add_rule_out_of_range_port_rejected() {
    let config = create_test_config();
    let pool = setup_test_db(&config).await;
    let service = access_service(&pool, simulated_driver());

    for port in [0, 65536] {
        let req = add_request("10.0.0.5", PortValue::Number(port), RuleAction::Allow);
        let outcome = service.add_rule(&req, "admin").await;
        assert!(!outcome.success, "port {} should be rejected", port);
    }

    assert_eq!(count_rules(&pool).await, 0);
}

#[tokio::test]
async fn test_delete_rule_soft_deletes() {
    let config = create_test_config();
    let pool = setup_test_db(&config).await;
    let service = access_service(&pool, simulated_driver());

    let rule_id = insert_rule(&pool, "10.0.0.5", "allow").await;

    let outcome = service.delete_rule(rule_id, "10.0.0.5", "2222").await;

    assert!(outcome.success);
    // 软删除：记录仍在，仅 active 翻转
    assert_eq!(count_rules(&pool).await, 1);
    assert!(!rule_active(&pool, rule_id).await);
}

#[tokio::test]
async fn test_delete_rule_survives_failing_driver() {
    let config = create_test_config();
    let pool = setup_test_db(&config).await;
    let service = access_service(&pool, failing_driver());

    let rule_id = insert_rule(&pool, "10.0.0.5", "allow").await;

    let outcome = service.delete_rule(rule_id, "10.0.0.5", "2222").await;

    assert!(outcome.success);
    assert!(!rule_active(&pool, rule_id).await);
}

#[tokio::test]
async fn test_list_active_rules_excludes_revoked() {
    let config = create_test_config();
    let pool = setup_test_db(&config).await;
    let service = access_service(&pool, simulated_driver());

    let kept = insert_rule(&pool, "10.0.0.1", "allow").await;
    let revoked = insert_rule(&pool, "10.0.0.2", "deny").await;
    assert!(service.revoke(revoked, "10.0.0.2").await.success);

    let active = service.list_rules(true).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, kept);
    assert!(active.iter().all(|r| r.active));

    // 全量查询仍能看到审计记录
    let all = service.list_rules(false).await.unwrap();
    assert_eq!(all.len(), 2);
}
