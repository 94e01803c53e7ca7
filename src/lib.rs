pub mod aggregate;
pub mod args;
mod backup;
mod config;
pub mod dashboard;
mod error;
mod fs;
pub mod model;
pub mod store;

pub use backup::Backup;
pub use config::Config;
pub use error::DashboardError;
pub use error::Error;
pub use error::Result;
