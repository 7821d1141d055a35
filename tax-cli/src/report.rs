//! Plain-text rendering of estimates and search results.

use std::fmt::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tax_core::calculations::common::round_half_up;
use tax_core::calculations::{Estimate, RankedAllocations, SearchOutcome};
use tax_core::{Channel, MunicipalityCatalog};

/// Amount in CHF with two decimals, rounded half up.
pub fn chf(amount: Decimal) -> String {
    format!("{:.2}", round_half_up(amount))
}

fn row(
    out: &mut String,
    label: &str,
    amount: Decimal,
) {
    let _ = writeln!(out, "  {label:<28}{:>14}", chf(amount));
}

pub fn municipalities(catalog: &MunicipalityCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<16}{:>12}{:>12}", "Municipality", "Multiplier", "Church %");
    for municipality in catalog.iter() {
        let _ = writeln!(
            out,
            "{:<16}{:>12.2}{:>12.2}",
            municipality.name, municipality.commune_multiplier, municipality.church_tax_percent
        );
    }
    out
}

pub fn estimate(
    estimate: &Estimate,
    tax_year: i32,
    prepared_on: NaiveDate,
) -> String {
    let result = &estimate.result;
    let deductions = &estimate.deductions;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Tax estimate {tax_year}, {} (prepared {prepared_on})",
        result.municipality
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Income");
    row(&mut out, "Gross income", deductions.gross_income);
    row(&mut out, "Total income", deductions.total_income);

    let _ = writeln!(out);
    let _ = writeln!(out, "Deductions");
    if deductions.items.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for item in &deductions.items {
        row(&mut out, item.kind.label(), item.amount);
    }
    row(&mut out, "Total deductions", deductions.total_deductions);

    let _ = writeln!(out);
    let _ = writeln!(out, "Tax");
    row(&mut out, "Taxable income", result.taxable_income);
    if deductions.override_applied {
        let _ = writeln!(out, "  (taxable income set manually)");
    }
    row(&mut out, "Basic cantonal tax", result.basic_cantonal_tax);
    row(&mut out, "Cantonal and communal tax", result.cantonal_tax);
    row(&mut out, "Church tax", result.church_tax);
    row(&mut out, "Federal tax", result.federal_tax);
    row(&mut out, "Total tax", result.total_tax);

    if deductions.pillar3a.exceeded() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Warning: pillar 3a contribution {} exceeds the cap of {}; {} was counted.",
            chf(deductions.pillar3a.declared),
            chf(deductions.pillar3a.cap),
            chf(deductions.pillar3a.used),
        );
    }

    out
}

fn ranked(
    out: &mut String,
    ranked: &RankedAllocations,
    channels: &[Channel],
    top: usize,
) {
    let _ = write!(out, "{:>4}", "#");
    for channel in channels {
        let _ = write!(out, "{:>18}", channel.label());
    }
    let _ = writeln!(out, "{:>12}{:>12}{:>12}{:>14}", "Extra", "Saved", "Net cost", "Tax after");

    for (rank, candidate) in ranked.top(top).iter().enumerate() {
        let _ = write!(out, "{:>4}", rank + 1);
        for channel in channels {
            let _ = write!(out, "{:>18}", chf(candidate.amount(*channel)));
        }
        let _ = writeln!(
            out,
            "{:>12}{:>12}{:>12}{:>14}",
            chf(candidate.extra),
            chf(candidate.tax_saved),
            chf(candidate.net_cost),
            chf(candidate.tax_after),
        );
    }

    let best = ranked.best();
    let _ = writeln!(out);
    let _ = writeln!(out, "Best strategy: {}", best.describe());
    row(out, "Extra contribution", best.extra);
    row(out, "Tax saved", best.tax_saved);
    row(out, "Net cost", best.net_cost);
    row(out, "Tax after", best.tax_after);
    let _ = writeln!(
        out,
        "  ({} of {} combinations feasible)",
        ranked.all().len(),
        ranked.combinations()
    );
}

/// Renders a search outcome. Oversized searches render an explanation; the
/// caller decides whether that is a failure.
pub fn search_outcome(
    outcome: &SearchOutcome,
    baseline_tax: Decimal,
    top: usize,
) -> String {
    let mut out = String::new();

    match outcome {
        SearchOutcome::NothingSelected => {
            let _ = writeln!(out, "No channel selected; nothing to optimize.");
        }
        SearchOutcome::SearchSpaceTooLarge {
            combinations,
            limit,
        } => {
            let _ = writeln!(
                out,
                "Search space too large: {combinations} combinations exceed the limit of {limit}."
            );
            let _ = writeln!(out, "Use a larger step, a smaller budget or fewer channels.");
        }
        SearchOutcome::NoFeasibleAllocation { .. } => {
            let _ = writeln!(
                out,
                "No feasible allocation found. Increase the budget or enable more channels."
            );
        }
        SearchOutcome::Ranked(allocations) => {
            let channels: Vec<Channel> = allocations
                .best()
                .allocation
                .keys()
                .copied()
                .collect();
            let _ = writeln!(out, "Baseline total tax: {}", chf(baseline_tax));
            let _ = writeln!(out);
            ranked(&mut out, allocations, &channels, top);
        }
    }

    out
}
