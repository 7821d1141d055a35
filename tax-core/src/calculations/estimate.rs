//! Total tax estimate for one taxable income.
//!
//! The cantonal basic tax is scaled by the canton factor and the commune
//! multiplier; church tax is a percentage of that cantonal amount; federal
//! tax comes straight from the federal table.
//!
//! | Component     | Formula                                        |
//! |---------------|------------------------------------------------|
//! | basic         | cantonal table at taxable income               |
//! | cantonal      | basic × canton factor × commune multiplier     |
//! | church        | cantonal × church tax percent / 100            |
//! | federal       | federal table at taxable income                |
//! | total         | cantonal + church + federal                    |
//!
//! Nothing is rounded here. Callers decide how to present the amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::bracket_tax;
use crate::calculations::common::percent_of;
use crate::calculations::deductions::{DeductionAggregator, DeductionSummary};
use crate::models::{BracketTable, EstimateResult, MunicipalityProfile, TaxYearData, TaxpayerProfile};

/// Tax components for one taxable income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub basic_cantonal_tax: Decimal,
    /// Cantonal plus communal tax.
    pub cantonal_tax: Decimal,
    pub church_tax: Decimal,
    pub federal_tax: Decimal,
    pub total_tax: Decimal,
}

/// Composes the cantonal, communal, church and federal layers.
///
/// Borrows its tables so the optimizer can re-run it cheaply.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator<'a> {
    cantonal: &'a BracketTable,
    federal: &'a BracketTable,
    canton_factor: Decimal,
}

impl<'a> TaxCalculator<'a> {
    pub fn new(
        cantonal: &'a BracketTable,
        federal: &'a BracketTable,
        canton_factor: Decimal,
    ) -> Self {
        Self {
            cantonal,
            federal,
            canton_factor,
        }
    }

    pub fn from_data(data: &'a TaxYearData) -> Self {
        Self::new(&data.cantonal, &data.federal, data.config.canton_factor)
    }

    pub fn canton_factor(&self) -> Decimal {
        self.canton_factor
    }

    /// Computes every tax component for `taxable_income` in `municipality`.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tax_core::calculations::TaxCalculator;
    /// use tax_core::{BracketTable, MunicipalityProfile, TableKind, TaxBracket};
    ///
    /// let flat = |kind, rate| {
    ///     BracketTable::new(
    ///         kind,
    ///         vec![TaxBracket {
    ///             min_income: dec!(0),
    ///             max_income: None,
    ///             base_tax: dec!(0),
    ///             tax_rate: rate,
    ///         }],
    ///     )
    ///     .unwrap()
    /// };
    /// let cantonal = flat(TableKind::Cantonal, dec!(0.10));
    /// let federal = flat(TableKind::Federal, dec!(0.05));
    /// let town = MunicipalityProfile {
    ///     name: "Town".to_string(),
    ///     commune_multiplier: dec!(1.5),
    ///     church_tax_percent: dec!(10),
    /// };
    ///
    /// let tax = TaxCalculator::new(&cantonal, &federal, dec!(1)).compute(dec!(1000), &town);
    ///
    /// assert_eq!(tax.basic_cantonal_tax, dec!(100));
    /// assert_eq!(tax.cantonal_tax, dec!(150));
    /// assert_eq!(tax.church_tax, dec!(15));
    /// assert_eq!(tax.federal_tax, dec!(50));
    /// assert_eq!(tax.total_tax, dec!(215));
    /// ```
    pub fn compute(
        &self,
        taxable_income: Decimal,
        municipality: &MunicipalityProfile,
    ) -> TaxBreakdown {
        let basic_cantonal_tax = bracket_tax::evaluate(self.cantonal, taxable_income);
        let cantonal_tax = basic_cantonal_tax * self.canton_factor * municipality.commune_multiplier;
        let church_tax = percent_of(cantonal_tax, municipality.church_tax_percent);
        let federal_tax = bracket_tax::evaluate(self.federal, taxable_income);

        TaxBreakdown {
            basic_cantonal_tax,
            cantonal_tax,
            church_tax,
            federal_tax,
            total_tax: cantonal_tax + church_tax + federal_tax,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimateError {
    #[error("unknown municipality '{0}'")]
    UnknownMunicipality(String),
}

/// An estimate together with the deductions that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Estimate {
    pub result: EstimateResult,
    pub deductions: DeductionSummary,
}

/// Runs a profile through the deduction aggregator and the tax calculator.
pub struct Estimator<'a> {
    data: &'a TaxYearData,
}

impl<'a> Estimator<'a> {
    pub fn new(data: &'a TaxYearData) -> Self {
        Self { data }
    }

    /// Estimates the tax owed for `profile`.
    ///
    /// The profile is expected to have passed
    /// [`TaxpayerProfile::validate`]; amounts are clamped rather than checked.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::UnknownMunicipality`] when the profile names a
    /// municipality missing from the catalog.
    pub fn estimate(
        &self,
        profile: &TaxpayerProfile,
    ) -> Result<Estimate, EstimateError> {
        let municipality = self
            .data
            .municipalities
            .get(&profile.municipality)
            .ok_or_else(|| EstimateError::UnknownMunicipality(profile.municipality.clone()))?;

        let deductions = DeductionAggregator::new(&self.data.config).aggregate(profile);
        debug!(
            total_income = %deductions.total_income,
            total_deductions = %deductions.total_deductions,
            override_applied = deductions.override_applied,
            "aggregated deductions"
        );

        let calculator = TaxCalculator::from_data(self.data);
        let tax = calculator.compute(deductions.taxable_income, municipality);
        info!(
            municipality = %municipality.name,
            taxable_income = %deductions.taxable_income,
            total_tax = %tax.total_tax,
            "estimate complete"
        );

        let result = EstimateResult {
            municipality: municipality.name.clone(),
            taxable_income: deductions.taxable_income,
            total_tax: tax.total_tax,
            basic_cantonal_tax: tax.basic_cantonal_tax,
            cantonal_tax: tax.cantonal_tax,
            church_tax: tax.church_tax,
            federal_tax: tax.federal_tax,
            commune_multiplier: municipality.commune_multiplier,
            church_tax_percent: municipality.church_tax_percent,
            canton_factor: calculator.canton_factor(),
            pillar3a_used: deductions.pillar3a.used,
            pillar3a_cap: deductions.pillar3a.cap,
            total_income: deductions.total_income,
            total_deductions: deductions.total_deductions,
        };

        Ok(Estimate { result, deductions })
    }
}
