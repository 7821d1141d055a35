//! Static tax data: bracket tables, municipalities and yearly constants.
//!
//! Each tax year lives in a directory holding `brackets.csv`,
//! `municipalities.csv` and `config.toml`. The Zurich 2025 set is embedded in
//! the binary; other years can be loaded from disk with [`load_dir`].

mod loader;

use std::fs;
use std::path::Path;

use tax_core::TaxYearData;
use tracing::info;

pub use loader::{BracketRecord, DataLoadError, MunicipalityRecord, TaxDataLoader};

pub const BRACKETS_FILE: &str = "brackets.csv";
pub const MUNICIPALITIES_FILE: &str = "municipalities.csv";
pub const CONFIG_FILE: &str = "config.toml";

/// Tax year of the embedded data set.
pub const BUILT_IN_YEAR: i32 = 2025;

const ZURICH_2025_CONFIG: &str = include_str!("../data/2025/config.toml");
const ZURICH_2025_BRACKETS: &str = include_str!("../data/2025/brackets.csv");
const ZURICH_2025_MUNICIPALITIES: &str = include_str!("../data/2025/municipalities.csv");

/// The embedded Zurich 2025 data set.
pub fn zurich_2025() -> Result<TaxYearData, DataLoadError> {
    TaxDataLoader::load(
        ZURICH_2025_CONFIG,
        ZURICH_2025_BRACKETS,
        ZURICH_2025_MUNICIPALITIES,
    )
}

fn read(path: &Path) -> Result<String, DataLoadError> {
    fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Loads a data set from a directory holding the three data files.
pub fn load_dir(dir: &Path) -> Result<TaxYearData, DataLoadError> {
    let data = TaxDataLoader::load(
        &read(&dir.join(CONFIG_FILE))?,
        &read(&dir.join(BRACKETS_FILE))?,
        &read(&dir.join(MUNICIPALITIES_FILE))?,
    )?;
    info!(
        dir = %dir.display(),
        tax_year = data.tax_year(),
        municipalities = data.municipalities.len(),
        "loaded tax data"
    );

    Ok(data)
}
