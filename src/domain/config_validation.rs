//! Configuration validation.
//!
//! Checks every config value the CLI reads before any ledger is opened.

use crate::domain::error::LedgerError;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    validate_non_negative(config, "ledger", "auxiliary_unit_cost")?;
    validate_non_negative(config, "ledger", "conversion_fee_per_unit")?;
    validate_highlight_thresholds(config)?;
    validate_feed(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> LedgerError {
    LedgerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// A numeric value, distinguishing "absent" from "present but not a number".
fn read_number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, LedgerError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(section, key, "must be a number")),
    }
}

fn validate_non_negative(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), LedgerError> {
    if let Some(value) = read_number(config, section, key)? {
        if value < 0.0 {
            return Err(invalid(section, key, &format!("{key} must be non-negative")));
        }
    }
    Ok(())
}

fn validate_highlight_thresholds(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    let low = read_number(config, "display", "highlight_low")?.unwrap_or(1000.0);
    let high = read_number(config, "display", "highlight_high")?.unwrap_or(2000.0);
    if low < 0.0 {
        return Err(invalid("display", "highlight_low", "highlight_low must be non-negative"));
    }
    if high < low {
        return Err(invalid(
            "display",
            "highlight_high",
            "highlight_high must not be below highlight_low",
        ));
    }
    Ok(())
}

fn validate_feed(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    if let Some(league) = config.get_string("feed", "league") {
        if league.trim().is_empty() {
            return Err(invalid("feed", "league", "league must not be empty"));
        }
    }
    if let Some(url) = config.get_string("feed", "base_url") {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(invalid("feed", "base_url", "base_url must be an http(s) URL"));
        }
    }
    if let Some(alt) = config.get_string("feed", "alt_currency") {
        if alt.trim().is_empty() {
            return Err(invalid("feed", "alt_currency", "alt_currency must not be empty"));
        }
    }
    Ok(())
}
