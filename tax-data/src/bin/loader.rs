use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tax_core::TaxYearData;

/// Validate a tax data directory and print what it contains.
///
/// The directory must hold:
/// - brackets.csv: tax_year,table,min_income,max_income,base_tax,rate
/// - municipalities.csv: name,commune_multiplier,church_tax_percent
/// - config.toml: the scalar constants for the tax year
#[derive(Parser, Debug)]
#[command(name = "tax-data-check")]
#[command(version, about, long_about = None)]
struct Args {
    /// Data directory to check; the embedded data set when omitted
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

fn print_summary(data: &TaxYearData) {
    println!("Tax year {}", data.tax_year());
    println!("  canton factor: {}", data.config.canton_factor);
    for table in [&data.cantonal, &data.federal] {
        println!("  {} table: {} brackets", table.kind(), table.brackets().len());
        for jump in table.discontinuities() {
            println!(
                "    jump at {}: {} below, base {} above",
                jump.boundary, jump.tax_below, jump.base_above
            );
        }
    }
    println!("  municipalities: {}", data.municipalities.len());
}

fn main() -> Result<()> {
    let args = Args::parse();

    let data = match &args.dir {
        Some(dir) => tax_data::load_dir(dir)
            .with_context(|| format!("Failed to load tax data from: {}", dir.display()))?,
        None => tax_data::zurich_2025().context("Embedded tax data is invalid")?,
    };

    print_summary(&data);
    println!("Data set is valid.");

    Ok(())
}
