//! Zurich 2025 reference data shared by the unit tests.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calculations::TaxCalculator;
use crate::models::{
    BracketTable, CommuteRate, EstimateResult, MunicipalityCatalog, MunicipalityProfile, TableKind,
    TaxBracket, TaxYearConfig, TaxYearData,
};

fn table(
    kind: TableKind,
    rows: &[(Decimal, Option<Decimal>, Decimal, Decimal)],
) -> BracketTable {
    let brackets = rows
        .iter()
        .map(|&(min_income, max_income, base_tax, tax_rate)| TaxBracket {
            min_income,
            max_income,
            base_tax,
            tax_rate,
        })
        .collect();
    BracketTable::new(kind, brackets).expect("fixture table is valid")
}

pub(crate) fn cantonal_table() -> BracketTable {
    table(
        TableKind::Cantonal,
        &[
            (dec!(0), Some(dec!(6900)), dec!(0), dec!(0)),
            (dec!(6900), Some(dec!(11800)), dec!(0), dec!(0.02)),
            (dec!(11800), Some(dec!(16600)), dec!(98), dec!(0.03)),
            (dec!(16600), Some(dec!(24500)), dec!(242), dec!(0.04)),
            (dec!(24500), Some(dec!(34100)), dec!(558), dec!(0.05)),
            (dec!(34100), Some(dec!(45100)), dec!(1038), dec!(0.06)),
            (dec!(45100), Some(dec!(58000)), dec!(1698), dec!(0.07)),
            (dec!(58000), Some(dec!(75400)), dec!(2601), dec!(0.08)),
            (dec!(75400), Some(dec!(109000)), dec!(3993), dec!(0.09)),
            (dec!(109000), Some(dec!(142200)), dec!(7017), dec!(0.10)),
            (dec!(142200), Some(dec!(194900)), dec!(10337), dec!(0.11)),
            (dec!(194900), Some(dec!(263300)), dec!(16134), dec!(0.12)),
            (dec!(263300), None, dec!(24342), dec!(0.13)),
        ],
    )
}

pub(crate) fn federal_table() -> BracketTable {
    table(
        TableKind::Federal,
        &[
            (dec!(0), Some(dec!(14700)), dec!(0), dec!(0)),
            (dec!(14700), Some(dec!(31500)), dec!(0), dec!(0.01)),
            (dec!(31500), Some(dec!(41400)), dec!(168), dec!(0.02)),
            (dec!(41400), Some(dec!(52400)), dec!(366), dec!(0.03)),
            (dec!(52400), Some(dec!(75500)), dec!(696), dec!(0.04)),
            (dec!(75500), Some(dec!(103600)), dec!(1620), dec!(0.055)),
            (dec!(103600), Some(dec!(134600)), dec!(3165.5), dec!(0.065)),
            (dec!(134600), Some(dec!(176000)), dec!(5180.5), dec!(0.075)),
            (dec!(176000), Some(dec!(755000)), dec!(8285.5), dec!(0.085)),
            (dec!(755000), None, dec!(57500.5), dec!(0.095)),
        ],
    )
}

pub(crate) fn zurich_city() -> MunicipalityProfile {
    MunicipalityProfile {
        name: "Zurich City".to_string(),
        commune_multiplier: dec!(1.19),
        church_tax_percent: dec!(0.50),
    }
}

pub(crate) fn catalog() -> MunicipalityCatalog {
    let others = [
        ("Kloten", dec!(1.10)),
        ("Opfikon", dec!(1.12)),
        ("Winterthur", dec!(1.18)),
        ("Uster", dec!(1.16)),
        ("Dübendorf", dec!(1.17)),
    ];
    let mut entries = vec![zurich_city()];
    entries.extend(others.into_iter().map(|(name, multiplier)| MunicipalityProfile {
        name: name.to_string(),
        commune_multiplier: multiplier,
        church_tax_percent: dec!(0.50),
    }));
    MunicipalityCatalog::new(entries).expect("fixture catalog is valid")
}

pub(crate) fn config_2025() -> TaxYearConfig {
    TaxYearConfig {
        tax_year: 2025,
        canton_factor: dec!(0.98),
        pillar3a_cap_employed: dec!(7056),
        pillar3a_self_employed_rate: dec!(0.20),
        health_insurance_cap_adult: dec!(2900),
        health_insurance_cap_child: dec!(1300),
        child_deduction_per_child: dec!(9400),
        berufskosten_rate: dec!(0.03),
        berufskosten_min: dec!(2000),
        berufskosten_max: dec!(4000),
        asset_management_rate: dec!(0.003),
        home_office_rent_share: dec!(0.4),
        commute_car: CommuteRate {
            rate_per_km: dec!(0.70),
            cap: dec!(3000),
        },
        commute_bike: CommuteRate {
            rate_per_km: dec!(0.20),
            cap: dec!(1000),
        },
        commute_mixed: CommuteRate {
            rate_per_km: dec!(0.35),
            cap: dec!(2500),
        },
    }
}

pub(crate) fn tax_year_data() -> TaxYearData {
    TaxYearData::new(config_2025(), cantonal_table(), federal_table(), catalog())
        .expect("fixture data is valid")
}

/// Zurich City baseline for `taxable_income` with no pillar 3a used yet.
pub(crate) fn baseline(taxable_income: Decimal) -> EstimateResult {
    let cantonal = cantonal_table();
    let federal = federal_table();
    let municipality = zurich_city();
    let breakdown =
        TaxCalculator::new(&cantonal, &federal, dec!(0.98)).compute(taxable_income, &municipality);

    EstimateResult {
        municipality: municipality.name,
        taxable_income,
        total_tax: breakdown.total_tax,
        basic_cantonal_tax: breakdown.basic_cantonal_tax,
        cantonal_tax: breakdown.cantonal_tax,
        church_tax: breakdown.church_tax,
        federal_tax: breakdown.federal_tax,
        commune_multiplier: municipality.commune_multiplier,
        church_tax_percent: municipality.church_tax_percent,
        canton_factor: dec!(0.98),
        pillar3a_used: Decimal::ZERO,
        pillar3a_cap: dec!(7056),
        total_income: taxable_income,
        total_deductions: Decimal::ZERO,
    }
}
