use std::collections::BTreeMap;
use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use tax_core::{
    BracketTable, BracketTableError, MunicipalityCatalog, MunicipalityCatalogError,
    MunicipalityProfile, TableKind, TaxBracket, TaxYearConfig, TaxYearData, TaxYearDataError,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur when loading a tax year data set.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown bracket table '{0}' (expected 'cantonal' or 'federal')")]
    UnknownTable(String),

    #[error("no {0} brackets found")]
    MissingTable(TableKind),

    #[error("bracket row for tax year {found} in a {expected} data set")]
    TaxYearMismatch { expected: i32, found: i32 },

    #[error("invalid {table} bracket table: {source}")]
    InvalidTable {
        table: TableKind,
        #[source]
        source: BracketTableError,
    },

    #[error("invalid municipality catalog: {0}")]
    Municipalities(#[from] MunicipalityCatalogError),

    #[error(transparent)]
    TaxYearData(#[from] TaxYearDataError),
}

impl From<csv::Error> for DataLoadError {
    fn from(err: csv::Error) -> Self {
        DataLoadError::CsvParse(err.to_string())
    }
}

impl From<toml::de::Error> for DataLoadError {
    fn from(err: toml::de::Error) -> Self {
        DataLoadError::TomlParse(err.to_string())
    }
}

/// A single record from `brackets.csv`.
///
/// - `tax_year`: The tax year (e.g., 2025)
/// - `table`: `cantonal` or `federal`
/// - `min_income`: Lower bound of the bracket, exclusive except for zero
/// - `max_income`: Upper bound of the bracket (empty for unbounded)
/// - `base_tax`: Tax owed at `min_income`
/// - `rate`: The marginal tax rate as a decimal (e.g., 0.055)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub tax_year: i32,
    pub table: String,
    pub min_income: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_income: Option<Decimal>,
    pub base_tax: Decimal,
    pub rate: Decimal,
}

/// A single record from `municipalities.csv`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MunicipalityRecord {
    pub name: String,
    pub commune_multiplier: Decimal,
    pub church_tax_percent: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for one tax year: bracket tables and municipalities from CSV,
/// scalar constants from TOML.
pub struct TaxDataLoader;

impl TaxDataLoader {
    /// Parse bracket records from a CSV reader.
    pub fn parse_brackets<R: Read>(reader: R) -> Result<Vec<BracketRecord>, DataLoadError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse municipality records from a CSV reader.
    pub fn parse_municipalities<R: Read>(
        reader: R
    ) -> Result<Vec<MunicipalityRecord>, DataLoadError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: MunicipalityRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    pub fn parse_config(source: &str) -> Result<TaxYearConfig, DataLoadError> {
        Ok(toml::from_str(source)?)
    }

    /// Groups bracket records into validated tables.
    ///
    /// Every record must belong to `tax_year`. Rows keep their file order
    /// within each table. Boundaries where the tax jumps are logged, not
    /// rejected.
    pub fn bracket_tables(
        tax_year: i32,
        records: &[BracketRecord],
    ) -> Result<BTreeMap<TableKind, BracketTable>, DataLoadError> {
        let mut grouped: BTreeMap<TableKind, Vec<TaxBracket>> = BTreeMap::new();

        for record in records {
            if record.tax_year != tax_year {
                return Err(DataLoadError::TaxYearMismatch {
                    expected: tax_year,
                    found: record.tax_year,
                });
            }
            let kind = TableKind::parse(record.table.trim())
                .ok_or_else(|| DataLoadError::UnknownTable(record.table.clone()))?;

            grouped.entry(kind).or_default().push(TaxBracket {
                min_income: record.min_income,
                max_income: record.max_income,
                base_tax: record.base_tax,
                tax_rate: record.rate,
            });
        }

        let mut tables = BTreeMap::new();
        for (kind, brackets) in grouped {
            let table = BracketTable::new(kind, brackets)
                .map_err(|source| DataLoadError::InvalidTable { table: kind, source })?;

            for jump in table.discontinuities() {
                warn!(
                    table = %kind,
                    boundary = %jump.boundary,
                    tax_below = %jump.tax_below,
                    base_above = %jump.base_above,
                    "bracket table jumps at boundary"
                );
            }
            debug!(table = %kind, brackets = table.brackets().len(), "loaded bracket table");

            tables.insert(kind, table);
        }

        Ok(tables)
    }

    pub fn catalog(records: Vec<MunicipalityRecord>) -> Result<MunicipalityCatalog, DataLoadError> {
        let entries = records
            .into_iter()
            .map(|record| MunicipalityProfile {
                name: record.name.trim().to_string(),
                commune_multiplier: record.commune_multiplier,
                church_tax_percent: record.church_tax_percent,
            })
            .collect();

        Ok(MunicipalityCatalog::new(entries)?)
    }

    /// Builds a complete data set from the three source texts.
    pub fn load(
        config_toml: &str,
        brackets_csv: &str,
        municipalities_csv: &str,
    ) -> Result<TaxYearData, DataLoadError> {
        let config = Self::parse_config(config_toml)?;
        let records = Self::parse_brackets(brackets_csv.as_bytes())?;
        let mut tables = Self::bracket_tables(config.tax_year, &records)?;
        let cantonal = tables
            .remove(&TableKind::Cantonal)
            .ok_or(DataLoadError::MissingTable(TableKind::Cantonal))?;
        let federal = tables
            .remove(&TableKind::Federal)
            .ok_or(DataLoadError::MissingTable(TableKind::Federal))?;
        let municipalities =
            Self::catalog(Self::parse_municipalities(municipalities_csv.as_bytes())?)?;

        Ok(TaxYearData::new(config, cantonal, federal, municipalities)?)
    }
}
