use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use tax_core::calculations::{AllocationSearch, Estimate, Estimator, OptimizerRequest, SearchOutcome};
use tax_core::{TaxYearData, TaxpayerProfile};
use tracing::{debug, info};

use crate::cli::{Cli, Command, EstimateArgs, OptimizeArgs};
use crate::profile;
use crate::report;

/// Loads the requested data set and checks it covers `year`.
pub fn load_data(
    data_dir: Option<&Path>,
    year: Option<i32>,
) -> Result<TaxYearData> {
    let data = match data_dir {
        Some(dir) => tax_data::load_dir(dir)
            .with_context(|| format!("Failed to load tax data from: {}", dir.display()))?,
        None => tax_data::zurich_2025().context("Built-in tax data is invalid")?,
    };

    if let Some(year) = year {
        if year != data.tax_year() {
            bail!(
                "no tax data for {year}; the loaded data set covers {}",
                data.tax_year()
            );
        }
    }
    debug!(tax_year = data.tax_year(), "using tax data");

    Ok(data)
}

fn load_profile(
    path: &Path,
    data: &TaxYearData,
) -> Result<TaxpayerProfile> {
    let profile = profile::load_profile(path, &data.config)
        .with_context(|| format!("Failed to load profile: {}", path.display()))?;
    profile
        .validate(data)
        .with_context(|| format!("Invalid profile: {}", path.display()))?;
    Ok(profile)
}

fn estimate_profile(
    path: &Path,
    data: &TaxYearData,
) -> Result<Estimate> {
    let profile = load_profile(path, data)?;
    Estimator::new(data)
        .estimate(&profile)
        .context("Failed to estimate tax")
}

fn run_estimate(
    args: &EstimateArgs,
    data: &TaxYearData,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<()> {
    let estimate = estimate_profile(&args.profile, data)?;
    write!(out, "{}", report::estimate(&estimate, data.tax_year(), today))?;
    Ok(())
}

fn run_optimize(
    args: &OptimizeArgs,
    data: &TaxYearData,
    out: &mut dyn Write,
) -> Result<()> {
    let estimate = estimate_profile(&args.profile, data)?;
    let baseline = &estimate.result;
    info!(
        taxable_income = %baseline.taxable_income,
        total_tax = %baseline.total_tax,
        "baseline estimate"
    );

    let request =
        OptimizerRequest::new(args.selected_channels(), args.budget).with_step(args.step);
    let outcome = AllocationSearch::from_data(data)
        .search(baseline, &request)
        .context("Invalid optimizer request")?;

    write!(
        out,
        "{}",
        report::search_outcome(&outcome, baseline.total_tax, args.top)
    )?;

    if let SearchOutcome::SearchSpaceTooLarge { combinations, limit } = outcome {
        bail!("search refused: {combinations} combinations exceed the limit of {limit}");
    }
    Ok(())
}

/// Runs one parsed command, writing its report to `out`.
pub fn run(
    cli: &Cli,
    today: NaiveDate,
    out: &mut dyn Write,
) -> Result<()> {
    let data = load_data(cli.data_dir.as_deref(), cli.year)?;

    match &cli.command {
        Command::Municipalities => {
            write!(out, "{}", report::municipalities(&data.municipalities))?;
            Ok(())
        }
        Command::Estimate(args) => run_estimate(args, &data, today, out),
        Command::Optimize(args) => run_optimize(args, &data, out),
    }
}
