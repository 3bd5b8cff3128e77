//! Business logic services layer

pub mod access_service;
pub mod auth_service;
pub mod stats_service;

pub use access_service::AccessService;
pub use auth_service::AuthService;
pub use stats_service::StatsService;
