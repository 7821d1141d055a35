//! Input record describing one taxpayer's declared income and deductions.
//!
//! A [`TaxpayerProfile`] is produced by whatever collects the answers (a form,
//! a file, a test) and is read-only for the core. Flat allowances carry their
//! *final* values; use [`crate::calculations::AllowanceDefaults`] to suggest
//! them before building the profile.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tax_year_config::TaxYearData;
use crate::calculations::AllowanceDefaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    #[default]
    Single,
    /// Married or in a registered partnership.
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    /// Adults counted for the health insurance allowance.
    pub fn adults(&self) -> u32 {
        match self {
            Self::Married => 2,
            Self::Single | Self::Divorced | Self::Widowed => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[default]
    EmployeeWithPensionFund,
    /// Self-employed, or employed without a pension fund.
    WithoutPensionFund,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommuteMode {
    #[default]
    PublicTransport,
    Car,
    BikeWalk,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependent {
    pub name: String,
    pub lives_with_taxpayer: bool,
    /// Annual support paid for this dependent.
    pub support_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Income {
    /// Gross employment income.
    pub salary: Decimal,
    /// Rental, investment and other taxable income.
    pub other: Decimal,
    pub foreign: Decimal,
    pub benefits: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commute {
    pub mode: CommuteMode,
    pub one_way_km: Decimal,
    pub work_days_per_week: u8,
}

impl Default for Commute {
    fn default() -> Self {
        Self {
            mode: CommuteMode::default(),
            one_way_km: Decimal::ZERO,
            work_days_per_week: 5,
        }
    }
}

/// Areas in square metres.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeOffice {
    pub office_area: Decimal,
    pub total_area: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PensionContributions {
    /// Mandatory occupational pension contributions.
    pub pillar2: Decimal,
    /// Voluntary pillar 3a contributions already made this year.
    pub pillar3a: Decimal,
    /// Value of pillar 3a assets; informational, excluded from securities.
    pub pillar3a_assets: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemizedExpenses {
    pub medical: Decimal,
    pub disability: Decimal,
    pub home_help: Decimal,
    pub childcare: Decimal,
    pub training: Decimal,
    pub school_fees: Decimal,
    /// Used for the home office share only; rent itself is not deductible.
    pub rent_paid: Decimal,
    pub mortgage_interest: Decimal,
    pub home_maintenance: Decimal,
    pub energy_efficiency: Decimal,
    pub charitable: Decimal,
    pub union_fees: Decimal,
    pub legal: Decimal,
    pub moving: Decimal,
    pub municipal_fees: Decimal,
    pub foreign_taxes: Decimal,
    pub business_travel: Decimal,
    /// Supplementary insurance premiums; recorded but not deductible.
    pub private_insurance_premiums: Decimal,
}

/// Final values of the flat allowances (Pauschalabzüge).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlatAllowances {
    pub berufskosten: Decimal,
    pub asset_management: Decimal,
    pub health_insurance: Decimal,
    pub child_deduction: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxpayerProfile {
    pub municipality: String,
    pub marital_status: MaritalStatus,
    pub age: u8,
    pub employment_type: EmploymentType,
    pub dependents: Vec<Dependent>,
    pub income: Income,
    pub commute: Commute,
    pub home_office: Option<HomeOffice>,
    pub pension: PensionContributions,
    pub expenses: ItemizedExpenses,
    pub allowances: FlatAllowances,
    /// Securities portfolio value, excluding pillar 3a assets.
    pub securities_value: Decimal,
    /// When positive, replaces the computed taxable income.
    pub taxable_income_override: Option<Decimal>,
}

impl Default for TaxpayerProfile {
    fn default() -> Self {
        Self {
            municipality: "Zurich City".to_string(),
            marital_status: MaritalStatus::default(),
            age: 35,
            employment_type: EmploymentType::default(),
            dependents: Vec::new(),
            income: Income::default(),
            commute: Commute::default(),
            home_office: None,
            pension: PensionContributions::default(),
            expenses: ItemizedExpenses::default(),
            allowances: FlatAllowances::default(),
            securities_value: Decimal::ZERO,
            taxable_income_override: None,
        }
    }
}

/// Input-range violations caught before a profile reaches the estimator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{field} must not be negative, got {amount}")]
    NegativeAmount { field: &'static str, amount: Decimal },

    #[error("age must be between 18 and 100, got {0}")]
    AgeOutOfRange(u8),

    #[error("work days per week must be between 1 and 7, got {0}")]
    WorkDaysOutOfRange(u8),

    #[error("unknown municipality '{0}'")]
    UnknownMunicipality(String),

    #[error("health insurance allowance {amount} exceeds the cap of {cap}")]
    HealthInsuranceAboveCap { amount: Decimal, cap: Decimal },
}

impl TaxpayerProfile {
    /// Number of declared children and other dependents.
    pub fn children(&self) -> u32 {
        u32::try_from(self.dependents.len()).unwrap_or(u32::MAX)
    }

    /// Sum of the annual support declared for all dependents.
    pub fn dependent_support(&self) -> Decimal {
        self.dependents.iter().map(|d| d.support_amount).sum()
    }

    /// Every monetary field paired with its name.
    fn monetary_fields(&self) -> Vec<(&'static str, Decimal)> {
        let income = &self.income;
        let pension = &self.pension;
        let expenses = &self.expenses;
        let allowances = &self.allowances;

        let mut fields = vec![
            ("income.salary", income.salary),
            ("income.other", income.other),
            ("income.foreign", income.foreign),
            ("income.benefits", income.benefits),
            ("commute.one_way_km", self.commute.one_way_km),
            ("pension.pillar2", pension.pillar2),
            ("pension.pillar3a", pension.pillar3a),
            ("pension.pillar3a_assets", pension.pillar3a_assets),
            ("expenses.medical", expenses.medical),
            ("expenses.disability", expenses.disability),
            ("expenses.home_help", expenses.home_help),
            ("expenses.childcare", expenses.childcare),
            ("expenses.training", expenses.training),
            ("expenses.school_fees", expenses.school_fees),
            ("expenses.rent_paid", expenses.rent_paid),
            ("expenses.mortgage_interest", expenses.mortgage_interest),
            ("expenses.home_maintenance", expenses.home_maintenance),
            ("expenses.energy_efficiency", expenses.energy_efficiency),
            ("expenses.charitable", expenses.charitable),
            ("expenses.union_fees", expenses.union_fees),
            ("expenses.legal", expenses.legal),
            ("expenses.moving", expenses.moving),
            ("expenses.municipal_fees", expenses.municipal_fees),
            ("expenses.foreign_taxes", expenses.foreign_taxes),
            ("expenses.business_travel", expenses.business_travel),
            (
                "expenses.private_insurance_premiums",
                expenses.private_insurance_premiums,
            ),
            ("allowances.berufskosten", allowances.berufskosten),
            ("allowances.asset_management", allowances.asset_management),
            ("allowances.health_insurance", allowances.health_insurance),
            ("allowances.child_deduction", allowances.child_deduction),
            ("securities_value", self.securities_value),
        ];

        if let Some(office) = &self.home_office {
            fields.push(("home_office.office_area", office.office_area));
            fields.push(("home_office.total_area", office.total_area));
        }
        if let Some(value) = self.taxable_income_override {
            fields.push(("taxable_income_override", value));
        }
        fields.extend(
            self.dependents
                .iter()
                .map(|d| ("dependents.support_amount", d.support_amount)),
        );

        fields
    }

    /// Checks the input ranges a questionnaire would enforce.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProfileError`] found.
    pub fn validate(
        &self,
        data: &TaxYearData,
    ) -> Result<(), ProfileError> {
        if let Some((field, amount)) = self
            .monetary_fields()
            .into_iter()
            .find(|(_, amount)| *amount < Decimal::ZERO)
        {
            return Err(ProfileError::NegativeAmount { field, amount });
        }

        if !(18..=100).contains(&self.age) {
            return Err(ProfileError::AgeOutOfRange(self.age));
        }

        if !(1..=7).contains(&self.commute.work_days_per_week) {
            return Err(ProfileError::WorkDaysOutOfRange(
                self.commute.work_days_per_week,
            ));
        }

        if !data.municipalities.contains(&self.municipality) {
            return Err(ProfileError::UnknownMunicipality(self.municipality.clone()));
        }

        let cap = AllowanceDefaults::new(&data.config)
            .health_insurance_cap(self.marital_status, self.children());
        if self.allowances.health_insurance > cap {
            return Err(ProfileError::HealthInsuranceAboveCap {
                amount: self.allowances.health_insurance,
                cap,
            });
        }

        Ok(())
    }
}
