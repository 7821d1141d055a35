use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The tax layer a bracket table is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Basic cantonal tax, before the canton factor and commune multiplier.
    Cantonal,
    /// Direct federal tax.
    Federal,
}

impl TableKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cantonal => "cantonal",
            Self::Federal => "federal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cantonal" => Some(Self::Cantonal),
            "federal" => Some(Self::Federal),
            _ => None,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a progressive bracket table.
///
/// Income inside `(min_income, max_income]` is taxed as
/// `base_tax + (income - min_income) * tax_rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_income: Decimal,
    /// `None` for the open-ended top bracket.
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub tax_rate: Decimal,
}

impl TaxBracket {
    /// Returns `true` when `income` lies in `(min_income, max_income]`.
    pub fn contains(
        &self,
        income: Decimal,
    ) -> bool {
        income > self.min_income && self.max_income.is_none_or(|max| income <= max)
    }

    /// Tax owed at the bracket's upper bound, `None` for the top bracket.
    pub fn tax_at_upper_bound(&self) -> Option<Decimal> {
        self.max_income
            .map(|max| self.base_tax + (max - self.min_income) * self.tax_rate)
    }
}

/// Errors raised when a bracket table does not cover `[0, ∞)` cleanly.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketTableError {
    #[error("{0} bracket table has no brackets")]
    Empty(TableKind),

    #[error("{kind} bracket table must start at 0, first bracket starts at {min_income}")]
    DoesNotStartAtZero { kind: TableKind, min_income: Decimal },

    #[error(
        "{kind} bracket {index} starts at {min_income} but the previous bracket ends at {previous_max}"
    )]
    NotContiguous {
        kind: TableKind,
        index: usize,
        previous_max: Decimal,
        min_income: Decimal,
    },

    #[error("{kind} bracket {index} has an empty income range")]
    EmptyRange { kind: TableKind, index: usize },

    #[error("{kind} bracket {index} is unbounded but is not the last bracket")]
    UnboundedBeforeEnd { kind: TableKind, index: usize },

    #[error("{kind} top bracket must be unbounded, it ends at {max_income}")]
    BoundedTop { kind: TableKind, max_income: Decimal },

    #[error("{kind} bracket {index} has a negative rate or base tax")]
    Negative { kind: TableKind, index: usize },
}

/// A boundary where the next bracket's base tax does not continue the
/// previous bracket's formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discontinuity {
    pub boundary: Decimal,
    pub tax_below: Decimal,
    pub base_above: Decimal,
}

/// Validated, immutable progressive bracket table.
///
/// Brackets are sorted ascending, the first starts at 0, every bracket starts
/// where the previous one ends and only the last bracket is unbounded. For any
/// positive income exactly one bracket matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketTable {
    kind: TableKind,
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Builds a table after checking that `brackets` tile `[0, ∞)`.
    ///
    /// # Errors
    ///
    /// Returns [`BracketTableError`] describing the first gap, overlap or
    /// malformed bracket found.
    pub fn new(
        kind: TableKind,
        brackets: Vec<TaxBracket>,
    ) -> Result<Self, BracketTableError> {
        let first = brackets.first().ok_or(BracketTableError::Empty(kind))?;
        if first.min_income != Decimal::ZERO {
            return Err(BracketTableError::DoesNotStartAtZero {
                kind,
                min_income: first.min_income,
            });
        }

        let last_index = brackets.len() - 1;
        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.tax_rate < Decimal::ZERO || bracket.base_tax < Decimal::ZERO {
                return Err(BracketTableError::Negative { kind, index });
            }

            match bracket.max_income {
                Some(max) if max <= bracket.min_income => {
                    return Err(BracketTableError::EmptyRange { kind, index });
                }
                Some(max) if index == last_index => {
                    return Err(BracketTableError::BoundedTop {
                        kind,
                        max_income: max,
                    });
                }
                None if index != last_index => {
                    return Err(BracketTableError::UnboundedBeforeEnd { kind, index });
                }
                _ => {}
            }

            if index > 0 {
                // Only the last bracket may be unbounded, so the previous one has a bound.
                let previous_max = brackets[index - 1].max_income.unwrap_or(Decimal::MAX);
                if bracket.min_income != previous_max {
                    return Err(BracketTableError::NotContiguous {
                        kind,
                        index,
                        previous_max,
                        min_income: bracket.min_income,
                    });
                }
            }
        }

        Ok(Self { kind, brackets })
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// The bracket whose range contains `income`, if any.
    ///
    /// Zero and negative incomes match no bracket.
    pub fn find_bracket(
        &self,
        income: Decimal,
    ) -> Option<&TaxBracket> {
        self.brackets.iter().find(|b| b.contains(income))
    }

    /// Boundaries where the tax formula jumps between adjacent brackets.
    pub fn discontinuities(&self) -> Vec<Discontinuity> {
        self.brackets
            .windows(2)
            .filter_map(|pair| {
                let (lower, upper) = (&pair[0], &pair[1]);
                let tax_below = lower.tax_at_upper_bound()?;
                (tax_below != upper.base_tax).then(|| Discontinuity {
                    boundary: upper.min_income,
                    tax_below,
                    base_above: upper.base_tax,
                })
            })
            .collect()
    }
}
