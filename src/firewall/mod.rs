//! 防火墙驱动模块

pub mod driver;

pub use driver::{FirewallDriver, UfwDriver};
