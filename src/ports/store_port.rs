//! Ledger persistence port.

use crate::domain::error::LedgerError;
use crate::domain::ledger::LedgerState;

pub trait LedgerStore {
    /// Load the persisted ledger. `Ok(None)` means nothing has been saved yet.
    fn load(&self) -> Result<Option<LedgerState>, LedgerError>;

    /// Replace the persisted ledger with `state` in full.
    fn save(&self, state: &LedgerState) -> Result<(), LedgerError>;

    /// Move an unreadable document out of the way so the next save does not
    /// overwrite it. Returns where it went, if anywhere.
    fn quarantine(&self) -> Result<Option<String>, LedgerError> {
        Ok(None)
    }
}
