pub mod config;
pub mod error;
pub mod types;

pub use config::RaidlineConfig;
pub use error::{RaidError, Result};
pub use types::*;
