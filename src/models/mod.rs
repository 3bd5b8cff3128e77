//! 数据模型模块
//! SSH 访问尝试、防火墙规则、系统指标与面板用户

pub mod access;
pub mod auth;
pub mod firewall;
pub mod stats;
pub mod user;
