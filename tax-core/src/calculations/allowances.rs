//! Suggested defaults for the flat allowances and the pillar 2 contribution.
//!
//! These are starting values for whoever builds a [`TaxpayerProfile`]. The
//! deduction aggregator never calls into this module; it sums the final
//! values found on the profile.

use rust_decimal::Decimal;

use crate::calculations::common::{max, round_half_up, round_to_franc};
use crate::models::{EmploymentType, FlatAllowances, MaritalStatus, TaxYearConfig, TaxpayerProfile};

/// Pillar 2 contribution rate by age band, upper bound exclusive.
const PILLAR2_AGE_BANDS: [(u8, Decimal); 5] = [
    (25, Decimal::from_parts(7, 0, 0, false, 2)),
    (35, Decimal::from_parts(10, 0, 0, false, 2)),
    (45, Decimal::from_parts(15, 0, 0, false, 2)),
    (55, Decimal::from_parts(18, 0, 0, false, 2)),
    (65, Decimal::from_parts(20, 0, 0, false, 2)),
];

pub struct AllowanceDefaults<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> AllowanceDefaults<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    /// Professional expenses: a share of salary, clamped between the floor
    /// and the ceiling.
    pub fn berufskosten(
        &self,
        salary: Decimal,
    ) -> Decimal {
        let share = (salary * self.config.berufskosten_rate).min(self.config.berufskosten_max);
        round_half_up(max(self.config.berufskosten_min, share))
    }

    pub fn asset_management(
        &self,
        securities_value: Decimal,
    ) -> Decimal {
        round_half_up(securities_value * self.config.asset_management_rate)
    }

    /// Highest health insurance allowance for the household.
    pub fn health_insurance_cap(
        &self,
        marital_status: MaritalStatus,
        children: u32,
    ) -> Decimal {
        Decimal::from(marital_status.adults()) * self.config.health_insurance_cap_adult
            + Decimal::from(children) * self.config.health_insurance_cap_child
    }

    pub fn child_deduction(
        &self,
        children: u32,
    ) -> Decimal {
        Decimal::from(children) * self.config.child_deduction_per_child
    }

    /// Suggested mandatory pillar 2 contribution, in whole francs.
    ///
    /// Zero without a pension fund or from age 65.
    pub fn pillar2(
        &self,
        employment_type: EmploymentType,
        age: u8,
        salary: Decimal,
    ) -> Decimal {
        if employment_type != EmploymentType::EmployeeWithPensionFund {
            return Decimal::ZERO;
        }

        PILLAR2_AGE_BANDS
            .iter()
            .find(|(below, _)| age < *below)
            .map_or(Decimal::ZERO, |(_, rate)| round_to_franc(salary * rate))
    }

    /// All four flat allowances at their defaults for `profile`.
    ///
    /// The health insurance allowance defaults to its cap.
    pub fn for_profile(
        &self,
        profile: &TaxpayerProfile,
    ) -> FlatAllowances {
        let children = profile.children();

        FlatAllowances {
            berufskosten: self.berufskosten(profile.income.salary),
            asset_management: self.asset_management(profile.securities_value),
            health_insurance: self.health_insurance_cap(profile.marital_status, children),
            child_deduction: self.child_deduction(children),
        }
    }
}
