pub mod aggregator;
pub mod config;
pub mod models;
pub mod selection;
pub mod service;


pub use aggregator::*;
pub use config::DashboardConfig;
pub use models::*;
pub use selection::*;
pub use service::DashboardService;
