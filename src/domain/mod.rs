//! Core domain types and logic.

pub mod amount;
pub mod config_validation;
pub mod error;
pub mod export;
pub mod ledger;
pub mod record;
pub mod reference;
pub mod sort;
pub mod valuation;
