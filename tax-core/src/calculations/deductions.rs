//! Turns a [`TaxpayerProfile`] into a taxable income.
//!
//! Every deduction category that comes out strictly positive becomes one
//! itemized [`Deduction`], rounded to cents. Flat allowances are taken as
//! given; suggesting their defaults is [`super::AllowanceDefaults`]' job.
//!
//! ```text
//! gross income    = salary + other + foreign
//! total income    = gross income + benefits
//! taxable income  = override, when positive
//!                 | max(0, total income - total deductions)
//! ```

use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::calculations::common::{non_negative, round_half_up};
use crate::models::{CommuteMode, CommuteRate, EmploymentType, TaxYearConfig, TaxpayerProfile};

const WEEKS_PER_YEAR: Decimal = Decimal::from_parts(52, 0, 0, false, 0);

/// Deduction categories, in the order they are itemized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionKind {
    Commute,
    HomeOffice,
    Pillar3a,
    Pillar2,
    Medical,
    Disability,
    HomeHelp,
    Childcare,
    Training,
    SchoolFees,
    MortgageInterest,
    HomeMaintenance,
    EnergyEfficiency,
    Charitable,
    UnionFees,
    Legal,
    Moving,
    MunicipalFees,
    ForeignTaxes,
    BusinessTravel,
    Berufskosten,
    AssetManagement,
    HealthInsurance,
    ChildDeduction,
    DependentSupport,
}

impl DeductionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Commute => "Commute",
            Self::HomeOffice => "Home office",
            Self::Pillar3a => "Pillar 3a",
            Self::Pillar2 => "Pillar 2",
            Self::Medical => "Medical costs",
            Self::Disability => "Disability costs",
            Self::HomeHelp => "Home help",
            Self::Childcare => "Childcare",
            Self::Training => "Training",
            Self::SchoolFees => "School fees",
            Self::MortgageInterest => "Mortgage interest",
            Self::HomeMaintenance => "Home maintenance",
            Self::EnergyEfficiency => "Energy efficiency",
            Self::Charitable => "Charitable donations",
            Self::UnionFees => "Union fees",
            Self::Legal => "Legal costs",
            Self::Moving => "Moving costs",
            Self::MunicipalFees => "Municipal fees",
            Self::ForeignTaxes => "Foreign taxes",
            Self::BusinessTravel => "Business travel",
            Self::Berufskosten => "Berufskosten",
            Self::AssetManagement => "Asset management",
            Self::HealthInsurance => "Health insurance",
            Self::ChildDeduction => "Child deduction",
            Self::DependentSupport => "Dependent support",
        }
    }
}

impl fmt::Display for DeductionKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deduction {
    pub kind: DeductionKind,
    pub amount: Decimal,
}

/// Declared pillar 3a contribution against its legal cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pillar3aCheck {
    pub declared: Decimal,
    pub cap: Decimal,
    /// `min(declared, cap)`.
    pub used: Decimal,
}

impl Pillar3aCheck {
    /// True when the declaration had to be cut back to the cap.
    pub fn exceeded(&self) -> bool {
        self.declared > self.cap
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeductionSummary {
    pub items: Vec<Deduction>,
    /// Salary, other and foreign income.
    pub gross_income: Decimal,
    /// Gross income plus benefits.
    pub total_income: Decimal,
    pub total_deductions: Decimal,
    pub taxable_income: Decimal,
    pub pillar3a: Pillar3aCheck,
    pub override_applied: bool,
}

impl DeductionSummary {
    /// Itemized amount for `kind`, zero when the item was omitted.
    pub fn amount(
        &self,
        kind: DeductionKind,
    ) -> Decimal {
        self.items
            .iter()
            .find(|item| item.kind == kind)
            .map_or(Decimal::ZERO, |item| item.amount)
    }
}

pub struct DeductionAggregator<'a> {
    config: &'a TaxYearConfig,
}

impl<'a> DeductionAggregator<'a> {
    pub fn new(config: &'a TaxYearConfig) -> Self {
        Self { config }
    }

    fn commute_rate(
        &self,
        mode: CommuteMode,
    ) -> Option<CommuteRate> {
        match mode {
            CommuteMode::PublicTransport => None,
            CommuteMode::Car => Some(self.config.commute_car),
            CommuteMode::BikeWalk => Some(self.config.commute_bike),
            CommuteMode::Mixed => Some(self.config.commute_mixed),
        }
    }

    /// Annual round trips priced per km, capped per mode.
    ///
    /// Public transport yields nothing here; its actual cost is entered as
    /// business travel.
    pub fn commute_deduction(
        &self,
        profile: &TaxpayerProfile,
    ) -> Decimal {
        let commute = &profile.commute;
        let Some(rate) = self.commute_rate(commute.mode) else {
            return Decimal::ZERO;
        };

        let annual_km = commute.one_way_km
            * Decimal::TWO
            * Decimal::from(commute.work_days_per_week)
            * WEEKS_PER_YEAR;
        (annual_km * rate.rate_per_km).min(rate.cap)
    }

    /// Office share of the rent paid, times the deductible rent share.
    pub fn home_office_deduction(
        &self,
        profile: &TaxpayerProfile,
    ) -> Decimal {
        match &profile.home_office {
            Some(office) if office.total_area > Decimal::ZERO => {
                office.office_area / office.total_area
                    * profile.expenses.rent_paid
                    * self.config.home_office_rent_share
            }
            _ => Decimal::ZERO,
        }
    }

    /// Caps the declared pillar 3a contribution.
    ///
    /// Employees with a pension fund share one fixed cap; everyone else may
    /// deduct a share of gross income, benefits excluded.
    pub fn pillar3a_check(
        &self,
        profile: &TaxpayerProfile,
        gross_income: Decimal,
    ) -> Pillar3aCheck {
        let cap = match profile.employment_type {
            EmploymentType::EmployeeWithPensionFund => self.config.pillar3a_cap_employed,
            EmploymentType::WithoutPensionFund => {
                non_negative(gross_income * self.config.pillar3a_self_employed_rate)
            }
        };
        let declared = profile.pension.pillar3a;

        Pillar3aCheck {
            declared,
            cap,
            used: declared.min(cap),
        }
    }

    pub fn aggregate(
        &self,
        profile: &TaxpayerProfile,
    ) -> DeductionSummary {
        let income = &profile.income;
        let gross_income = income.salary + income.other + income.foreign;
        let total_income = gross_income + income.benefits;

        let pillar3a = self.pillar3a_check(profile, gross_income);
        if pillar3a.exceeded() {
            warn!(
                declared = %pillar3a.declared,
                cap = %pillar3a.cap,
                "pillar 3a contribution exceeds the legal cap; counting the cap"
            );
        }

        let expenses = &profile.expenses;
        let allowances = &profile.allowances;
        let candidates = [
            (DeductionKind::Commute, self.commute_deduction(profile)),
            (DeductionKind::HomeOffice, self.home_office_deduction(profile)),
            (DeductionKind::Pillar3a, pillar3a.used),
            (DeductionKind::Pillar2, profile.pension.pillar2),
            (DeductionKind::Medical, expenses.medical),
            (DeductionKind::Disability, expenses.disability),
            (DeductionKind::HomeHelp, expenses.home_help),
            (DeductionKind::Childcare, expenses.childcare),
            (DeductionKind::Training, expenses.training),
            (DeductionKind::SchoolFees, expenses.school_fees),
            (DeductionKind::MortgageInterest, expenses.mortgage_interest),
            (DeductionKind::HomeMaintenance, expenses.home_maintenance),
            (DeductionKind::EnergyEfficiency, expenses.energy_efficiency),
            (DeductionKind::Charitable, expenses.charitable),
            (DeductionKind::UnionFees, expenses.union_fees),
            (DeductionKind::Legal, expenses.legal),
            (DeductionKind::Moving, expenses.moving),
            (DeductionKind::MunicipalFees, expenses.municipal_fees),
            (DeductionKind::ForeignTaxes, expenses.foreign_taxes),
            (DeductionKind::BusinessTravel, expenses.business_travel),
            (DeductionKind::Berufskosten, allowances.berufskosten),
            (DeductionKind::AssetManagement, allowances.asset_management),
            (DeductionKind::HealthInsurance, allowances.health_insurance),
            (DeductionKind::ChildDeduction, allowances.child_deduction),
            (DeductionKind::DependentSupport, profile.dependent_support()),
        ];

        let items: Vec<Deduction> = candidates
            .into_iter()
            .map(|(kind, amount)| Deduction {
                kind,
                amount: round_half_up(amount),
            })
            .filter(|item| item.amount > Decimal::ZERO)
            .collect();
        let total_deductions: Decimal = items.iter().map(|item| item.amount).sum();

        let (taxable_income, override_applied) = match profile.taxable_income_override {
            Some(value) if value > Decimal::ZERO => (value, true),
            _ => (non_negative(total_income - total_deductions), false),
        };

        DeductionSummary {
            items,
            gross_income,
            total_income,
            total_deductions,
            taxable_income,
            pillar3a,
            override_applied,
        }
    }
}
