//! TOML profile files.
//!
//! A profile file is a [`TaxpayerProfile`] in TOML. Flat allowances and the
//! pillar 2 contribution that the file leaves out are filled with their
//! suggested defaults; values the file sets are kept as written.
//!
//! ```toml
//! municipality = "Zurich City"
//! age = 40
//!
//! [income]
//! salary = 95000
//!
//! [pension]
//! pillar3a = 5000
//!
//! [allowances]
//! berufskosten = 2500
//! ```

use std::fs;
use std::path::Path;

use tax_core::calculations::AllowanceDefaults;
use tax_core::{TaxYearConfig, TaxpayerProfile};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ProfileLoadError {
    #[error("failed to read profile {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid profile: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Which defaulted values the file set explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ExplicitValues {
    berufskosten: bool,
    asset_management: bool,
    health_insurance: bool,
    child_deduction: bool,
    pillar2: bool,
}

impl ExplicitValues {
    fn from_table(table: &toml::Table) -> Self {
        let has = |section: &str, key: &str| {
            table
                .get(section)
                .and_then(toml::Value::as_table)
                .is_some_and(|section| section.contains_key(key))
        };

        Self {
            berufskosten: has("allowances", "berufskosten"),
            asset_management: has("allowances", "asset_management"),
            health_insurance: has("allowances", "health_insurance"),
            child_deduction: has("allowances", "child_deduction"),
            pillar2: has("pension", "pillar2"),
        }
    }
}

/// Parses a profile and fills in every default the text leaves out.
pub fn parse_profile(
    source: &str,
    config: &TaxYearConfig,
) -> Result<TaxpayerProfile, ProfileLoadError> {
    let explicit = ExplicitValues::from_table(&toml::from_str(source)?);
    let mut profile: TaxpayerProfile = toml::from_str(source)?;

    let defaults = AllowanceDefaults::new(config);
    let suggested = defaults.for_profile(&profile);
    let allowances = &mut profile.allowances;
    if !explicit.berufskosten {
        allowances.berufskosten = suggested.berufskosten;
    }
    if !explicit.asset_management {
        allowances.asset_management = suggested.asset_management;
    }
    if !explicit.health_insurance {
        allowances.health_insurance = suggested.health_insurance;
    }
    if !explicit.child_deduction {
        allowances.child_deduction = suggested.child_deduction;
    }
    if !explicit.pillar2 {
        profile.pension.pillar2 =
            defaults.pillar2(profile.employment_type, profile.age, profile.income.salary);
    }
    debug!(?explicit, allowances = ?profile.allowances, "filled profile defaults");

    Ok(profile)
}

pub fn load_profile(
    path: &Path,
    config: &TaxYearConfig,
) -> Result<TaxpayerProfile, ProfileLoadError> {
    let source = fs::read_to_string(path).map_err(|source| ProfileLoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_profile(&source, config)
}
