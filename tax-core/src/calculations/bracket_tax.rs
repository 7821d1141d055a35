//! Progressive bracket evaluation.
//!
//! Each table is piecewise linear: income inside `(min_income, max_income]`
//! owes `base_tax + (income - min_income) * tax_rate`. Incomes of zero or
//! below match no bracket and owe nothing.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::bracket_tax;
//! use tax_core::{BracketTable, TableKind, TaxBracket};
//!
//! let table = BracketTable::new(
//!     TableKind::Cantonal,
//!     vec![
//!         TaxBracket {
//!             min_income: dec!(0),
//!             max_income: Some(dec!(6900)),
//!             base_tax: dec!(0),
//!             tax_rate: dec!(0),
//!         },
//!         TaxBracket {
//!             min_income: dec!(6900),
//!             max_income: None,
//!             base_tax: dec!(0),
//!             tax_rate: dec!(0.02),
//!         },
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(bracket_tax::evaluate(&table, dec!(10000)), dec!(62));
//! assert_eq!(bracket_tax::evaluate(&table, dec!(0)), dec!(0));
//! ```

use rust_decimal::Decimal;

use crate::calculations::common::non_negative;
use crate::models::BracketTable;

/// Tax owed on `income` under `table`.
///
/// Negative incomes are clamped to zero. Pure and deterministic.
pub fn evaluate(
    table: &BracketTable,
    income: Decimal,
) -> Decimal {
    let income = non_negative(income);

    table
        .find_bracket(income)
        .map(|bracket| bracket.base_tax + (income - bracket.min_income) * bracket.tax_rate)
        .unwrap_or(Decimal::ZERO)
}
