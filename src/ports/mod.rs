//! Port traits the ledger engine talks through.

pub mod config_port;
pub mod price_port;
pub mod store_port;
