pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod relay;
pub mod slack;

pub use error::{RelayError, Result};
