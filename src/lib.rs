pub mod models;
pub mod error;
pub mod config;
pub mod detection;  // classifier, dedup, host listener
pub mod annotation;
pub mod menu;
pub mod forwarder;
pub mod request_logger;
pub mod parsers;
pub mod reporting;

// Re-export commonly used items
pub use models::*;
pub use error::{Error, Result};
pub use config::*;
pub use detection::*;
pub use annotation::*;
pub use menu::*;
pub use forwarder::*;
pub use request_logger::*;
pub use parsers::*;
pub use reporting::*;
