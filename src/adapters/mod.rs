//! Concrete adapter implementations for ports.

pub mod csv_export;
pub mod fetch_worker;
pub mod file_config_adapter;
pub mod json_store;
#[cfg(feature = "fetch")]
pub mod ninja_feed;
