//! Amount string parsing
//!
//! Posting amounts are free text in the form: either empty (the
//! implicitly balanced posting), a bare number, or a number followed by
//! a commodity after the first space. Parsing reports failures
//! explicitly instead of silently passing bad input downstream.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A parsed amount: number and optional commodity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub number: Decimal,
    pub commodity: Option<String>,
}

/// Amount parsing error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmountError {
    #[error("Invalid number in amount '{raw}'")]
    InvalidNumber { raw: String },
}

/// Parse an amount string into an optional [`Unit`]
///
/// A blank string is `Ok(None)`: the posting's amount is left to be
/// inferred by the ledger's balancing rule. Everything else is split on
/// the first space into a decimal number and a commodity.
pub fn parse_unit(raw: &str) -> Result<Option<Unit>, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (number_part, commodity_part) = match trimmed.split_once(' ') {
        Some((number, rest)) => (number, Some(rest.trim())),
        None => (trimmed, None),
    };

    let number = number_part
        .parse::<Decimal>()
        .map_err(|_| AmountError::InvalidNumber {
            raw: raw.to_string(),
        })?;

    let commodity = commodity_part
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string());

    Ok(Some(Unit { number, commodity }))
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_amount_is_none() {
        assert_eq!(parse_unit("").unwrap(), None);
        assert_eq!(parse_unit("   ").unwrap(), None);
    }

    #[test]
    fn test_number_with_commodity() {
        let unit = parse_unit("-10 USD").unwrap().unwrap();
        assert_eq!(unit.number, Decimal::from(-10));
        assert_eq!(unit.commodity.as_deref(), Some("USD"));
    }

    #[test]
    fn test_bare_number() {
        let unit = parse_unit("42.50").unwrap().unwrap();
        assert_eq!(unit.number.to_string(), "42.50");
        assert_eq!(unit.commodity, None);
    }

    #[test]
    fn test_split_on_first_space_only() {
        // Everything after the first space belongs to the commodity.
        let unit = parse_unit("1 STOCK A").unwrap().unwrap();
        assert_eq!(unit.commodity.as_deref(), Some("STOCK A"));
    }

    #[test]
    fn test_invalid_number_is_explicit_error() {
        let err = parse_unit("ten USD").unwrap_err();
        assert_eq!(
            err,
            AmountError::InvalidNumber {
                raw: "ten USD".to_string()
            }
        );
    }
}
