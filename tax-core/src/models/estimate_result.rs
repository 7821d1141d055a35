use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::municipality::MunicipalityProfile;

/// Outcome of one estimate, handed to the optimizer as its baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub municipality: String,
    pub taxable_income: Decimal,
    pub total_tax: Decimal,
    pub basic_cantonal_tax: Decimal,
    /// Basic cantonal tax after the canton factor and commune multiplier.
    pub cantonal_tax: Decimal,
    pub church_tax: Decimal,
    pub federal_tax: Decimal,
    pub commune_multiplier: Decimal,
    pub church_tax_percent: Decimal,
    pub canton_factor: Decimal,
    /// Pillar 3a amount counted after capping.
    pub pillar3a_used: Decimal,
    pub pillar3a_cap: Decimal,
    pub total_income: Decimal,
    pub total_deductions: Decimal,
}

impl EstimateResult {
    /// The municipality parameters the estimate was computed with.
    pub fn municipality_profile(&self) -> MunicipalityProfile {
        MunicipalityProfile {
            name: self.municipality.clone(),
            commune_multiplier: self.commune_multiplier,
            church_tax_percent: self.church_tax_percent,
        }
    }

    /// Legal pillar 3a room still unused, never negative.
    pub fn pillar3a_remaining(&self) -> Decimal {
        (self.pillar3a_cap - self.pillar3a_used).max(Decimal::ZERO)
    }
}
