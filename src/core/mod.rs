pub mod config;
pub mod error;
pub mod types;

pub use config::TacticalMapConfig;
pub use error::{Result, TacticalError};
