//! Domain error types.

/// A parse error with position information for amount input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for flipledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid {field}: {reason}")]
    Input { field: String, reason: String },

    #[error("no record at index {index} (ledger has {len})")]
    Index { index: usize, len: usize },

    #[error("field {field} cannot be edited")]
    UnsupportedField { field: String },

    #[error("persistence error for {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error("reference price fetch failed: {reason}")]
    ExternalFetch { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        LedgerError::Input {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn fetch(reason: impl Into<String>) -> Self {
        LedgerError::ExternalFetch {
            reason: reason.into(),
        }
    }

    /// Errors that reject a single user action and leave the ledger untouched.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            LedgerError::Input { .. } | LedgerError::Index { .. } | LedgerError::UnsupportedField { .. }
        )
    }
}

impl From<&LedgerError> for std::process::ExitCode {
    fn from(err: &LedgerError) -> Self {
        let code: u8 = match err {
            LedgerError::Io(_) => 1,
            LedgerError::Input { .. } => 2,
            LedgerError::Index { .. } => 3,
            LedgerError::UnsupportedField { .. } => 4,
            LedgerError::Persistence { .. } => 5,
            LedgerError::ExternalFetch { .. } => 6,
            LedgerError::ConfigParse { .. } | LedgerError::ConfigInvalid { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_context_points_at_position() {
        let err = ParseError {
            message: "unexpected character '*'".into(),
            position: 1,
        };
        let rendered = err.display_with_context("2*3");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "2*3");
        assert_eq!(lines[1], " ^");
        assert!(lines[2].contains("position 1"));
    }

    #[test]
    fn input_error_names_field() {
        let err = LedgerError::input("receive_price", "must be non-negative");
        assert_eq!(err.to_string(), "invalid receive_price: must be non-negative");
        assert!(err.is_user_error());
    }

    #[test]
    fn persistence_is_not_user_error() {
        let err = LedgerError::Persistence {
            path: "items_data.json".into(),
            reason: "disk full".into(),
        };
        assert!(!err.is_user_error());
    }
}
