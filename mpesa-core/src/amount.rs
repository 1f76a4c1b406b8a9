//! Monetary amounts after best-effort coercion.
//!
//! Statement amounts arrive as text with thousands separators ("1,234.50"),
//! as bare numbers, or as junk the extractor picked up from a neighbouring
//! cell. Coercion never fails: whatever cannot be read as a number is kept
//! verbatim as [`Amount::Unparsed`] and counts as zero in every sum.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cell::Cell;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Amount {
    Number(f64),
    /// Original token that failed numeric coercion
    Unparsed(String),
    /// Null cell kept as missing (strict null policy only)
    Missing,
}

impl Amount {
    pub const ZERO: Amount = Amount::Number(0.0);

    /// Coerce a raw cell. Text has commas stripped before parsing; numbers
    /// pass through unchanged; nulls become [`Amount::Missing`].
    pub fn coerce(cell: &Cell) -> Amount {
        match cell {
            Cell::Number(n) => Amount::Number(*n),
            Cell::Text(s) => parse_amount_text(s),
            Cell::Null => Amount::Missing,
        }
    }

    /// Numeric contribution to aggregates. Unparsed and missing are zero.
    pub fn value(&self) -> f64 {
        match self {
            Amount::Number(n) => *n,
            Amount::Unparsed(_) | Amount::Missing => 0.0,
        }
    }

    /// True unless the amount is known to be zero or absent.
    /// An unparsed token is not known to be zero.
    pub fn is_nonzero(&self) -> bool {
        match self {
            Amount::Number(n) => *n != 0.0,
            Amount::Unparsed(_) => true,
            Amount::Missing => false,
        }
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self, Amount::Unparsed(_))
    }

    pub fn abs(&self) -> Amount {
        match self {
            Amount::Number(n) => Amount::Number(n.abs()),
            other => other.clone(),
        }
    }

    /// Negated magnitude, used for the outflow sign convention.
    pub fn as_debit(&self) -> Amount {
        match self {
            Amount::Number(n) => Amount::Number(-n.abs()),
            other => other.clone(),
        }
    }
}

fn parse_amount_text(s: &str) -> Amount {
    let cleaned = s.replace(',', "");
    match cleaned.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Amount::Number(n),
        _ => Amount::Unparsed(s.to_string()),
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{n:.2}"),
            Amount::Unparsed(s) => f.write_str(s),
            Amount::Missing => f.write_str("-"),
        }
    }
}

/// Sum amounts, treating non-numeric residue as zero.
pub fn sum_amounts<'a>(amounts: impl IntoIterator<Item = &'a Amount>) -> f64 {
    amounts.into_iter().map(Amount::value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_passes_through() {
        assert_eq!(Amount::coerce(&Cell::Number(42.5)), Amount::Number(42.5));
    }

    #[test]
    fn test_thousands_separator_stripped() {
        assert_eq!(
            Amount::coerce(&Cell::text("1,234.50")),
            Amount::Number(1234.50)
        );
        assert_eq!(
            Amount::coerce(&Cell::text(" 12,000 ")),
            Amount::Number(12000.0)
        );
    }

    #[test]
    fn test_negative_text() {
        assert_eq!(
            Amount::coerce(&Cell::text("-1,000.00")),
            Amount::Number(-1000.0)
        );
    }

    #[test]
    fn test_non_numeric_kept_verbatim() {
        let a = Amount::coerce(&Cell::text("N/A"));
        assert_eq!(a, Amount::Unparsed("N/A".to_string()));
        assert_eq!(a.value(), 0.0);
        assert!(a.is_nonzero());
    }

    #[test]
    fn test_nan_text_is_unparsed() {
        assert!(Amount::coerce(&Cell::text("NaN")).is_unparsed());
    }

    #[test]
    fn test_null_is_missing() {
        let a = Amount::coerce(&Cell::Null);
        assert_eq!(a, Amount::Missing);
        assert!(!a.is_nonzero());
    }

    #[test]
    fn test_sum_ignores_residue() {
        let xs = vec![
            Amount::Number(10.0),
            Amount::Unparsed("N/A".to_string()),
            Amount::Missing,
            Amount::Number(5.5),
        ];
        assert_eq!(sum_amounts(&xs), 15.5);
    }

    #[test]
    fn test_debit_sign() {
        assert_eq!(Amount::Number(1000.0).as_debit(), Amount::Number(-1000.0));
        assert_eq!(Amount::Number(-20.0).as_debit(), Amount::Number(-20.0));
        assert_eq!(
            Amount::Unparsed("x".into()).as_debit(),
            Amount::Unparsed("x".into())
        );
    }
}
