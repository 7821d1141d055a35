use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::municipality::MunicipalityCatalog;
use super::tax_bracket::{BracketTable, TableKind};

/// Per-kilometre commute allowance for one commute mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuteRate {
    pub rate_per_km: Decimal,
    pub cap: Decimal,
}

/// Scalar constants for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,
    /// Scaling applied to the basic cantonal tax before the commune multiplier.
    pub canton_factor: Decimal,
    /// Pillar 3a cap for employees affiliated with a pension fund.
    pub pillar3a_cap_employed: Decimal,
    /// Pillar 3a cap for everyone else, as a share of gross income.
    pub pillar3a_self_employed_rate: Decimal,
    pub health_insurance_cap_adult: Decimal,
    pub health_insurance_cap_child: Decimal,
    pub child_deduction_per_child: Decimal,
    pub berufskosten_rate: Decimal,
    pub berufskosten_min: Decimal,
    pub berufskosten_max: Decimal,
    pub asset_management_rate: Decimal,
    /// Share of the pro-rata rent deductible for a home office.
    pub home_office_rent_share: Decimal,
    pub commute_car: CommuteRate,
    pub commute_bike: CommuteRate,
    pub commute_mixed: CommuteRate,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxYearDataError {
    #[error("expected a {expected} bracket table, got a {found} table")]
    WrongTableKind { expected: TableKind, found: TableKind },
}

/// Everything the estimator and optimizer read for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxYearData {
    pub config: TaxYearConfig,
    pub cantonal: BracketTable,
    pub federal: BracketTable,
    pub municipalities: MunicipalityCatalog,
}

impl TaxYearData {
    pub fn new(
        config: TaxYearConfig,
        cantonal: BracketTable,
        federal: BracketTable,
        municipalities: MunicipalityCatalog,
    ) -> Result<Self, TaxYearDataError> {
        for (expected, table) in [(TableKind::Cantonal, &cantonal), (TableKind::Federal, &federal)] {
            if table.kind() != expected {
                return Err(TaxYearDataError::WrongTableKind {
                    expected,
                    found: table.kind(),
                });
            }
        }

        Ok(Self {
            config,
            cantonal,
            federal,
            municipalities,
        })
    }

    pub fn tax_year(&self) -> i32 {
        self.config.tax_year
    }
}
