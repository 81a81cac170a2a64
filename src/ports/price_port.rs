//! Reference price feed port.

use crate::domain::error::LedgerError;
use crate::domain::reference::ReferencePrices;

pub trait PriceFeed {
    /// Fetch the current reference prices. Blocking; run it off the main
    /// thread when responsiveness matters.
    fn fetch(&self) -> Result<ReferencePrices, LedgerError>;
}
