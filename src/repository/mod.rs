//! Database repository layer

pub mod access_repo;
pub mod firewall_repo;
pub mod stats_repo;
pub mod user_repo;

pub use access_repo::AccessAttemptRepository;
pub use firewall_repo::FirewallRuleRepository;
pub use stats_repo::StatsRepository;
pub use user_repo::UserRepository;
