//! Amount input parser.
//!
//! Accepts a plain decimal (`12`, `0.5`, `.5`, `3.`) or a fraction of two
//! decimals (`1/1.16`). Nothing else is evaluated.

use crate::domain::error::{LedgerError, ParseError};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn parse_decimal(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            let message = match self.peek() {
                Some('-') => "negative amounts are not allowed".to_string(),
                Some(ch) => format!("expected number, found '{}'", ch),
                None => "expected number, found end of input".to_string(),
            };
            return Err(ParseError {
                message,
                position: self.pos,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse(&mut self) -> Result<f64, ParseError> {
        let numerator = self.parse_decimal()?;
        self.skip_whitespace();

        let value = if self.peek() == Some('/') {
            self.advance();
            let denom_pos = self.pos;
            let denominator = self.parse_decimal()?;
            if denominator == 0.0 {
                return Err(ParseError {
                    message: "division by zero".to_string(),
                    position: denom_pos,
                });
            }
            numerator / denominator
        } else {
            numerator
        };

        self.skip_whitespace();
        if let Some(ch) = self.peek() {
            return Err(ParseError {
                message: format!("unexpected character '{}'", ch),
                position: self.pos,
            });
        }

        if !value.is_finite() {
            return Err(ParseError {
                message: "amount is not finite".to_string(),
                position: 0,
            });
        }
        Ok(value)
    }
}

/// Parse a non-negative amount.
pub fn parse(input: &str) -> Result<f64, ParseError> {
    Parser::new(input).parse()
}

/// Parse an amount for a named field, mapping failures to an input error.
pub fn parse_field(field: &str, input: &str) -> Result<f64, LedgerError> {
    parse(input).map_err(|e| LedgerError::input(field, e.display_with_context(input)))
}

/// Check a numeric amount supplied directly rather than as text.
pub fn validate_non_negative(field: &str, value: f64) -> Result<f64, LedgerError> {
    if !value.is_finite() {
        return Err(LedgerError::input(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(LedgerError::input(field, "must be non-negative"));
    }
    Ok(value)
}
