pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod scoring;
pub mod service;
pub mod store;
pub mod test_utils;

pub use error::{RapportError, Result};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
