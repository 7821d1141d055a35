use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Municipality-level parameters applied on top of the basic cantonal tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityProfile {
    pub name: String,
    /// Scaling factor applied to the basic cantonal tax (e.g. `1.19`).
    pub commune_multiplier: Decimal,
    /// Church tax as a percentage of the cantonal tax (e.g. `0.50` = 0.5%).
    pub church_tax_percent: Decimal,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MunicipalityCatalogError {
    #[error("municipality catalog is empty")]
    Empty,

    #[error("municipality '{0}' is listed more than once")]
    Duplicate(String),

    #[error("municipality '{name}' has a negative commune multiplier {value}")]
    NegativeMultiplier { name: String, value: Decimal },

    #[error("municipality '{name}' has a negative church tax percentage {value}")]
    NegativeChurchTax { name: String, value: Decimal },
}

/// Static catalog of municipalities, kept in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MunicipalityCatalog {
    entries: Vec<MunicipalityProfile>,
}

impl MunicipalityCatalog {
    pub fn new(entries: Vec<MunicipalityProfile>) -> Result<Self, MunicipalityCatalogError> {
        if entries.is_empty() {
            return Err(MunicipalityCatalogError::Empty);
        }

        for (index, entry) in entries.iter().enumerate() {
            if entry.commune_multiplier < Decimal::ZERO {
                return Err(MunicipalityCatalogError::NegativeMultiplier {
                    name: entry.name.clone(),
                    value: entry.commune_multiplier,
                });
            }
            if entry.church_tax_percent < Decimal::ZERO {
                return Err(MunicipalityCatalogError::NegativeChurchTax {
                    name: entry.name.clone(),
                    value: entry.church_tax_percent,
                });
            }
            if entries[..index].iter().any(|e| e.name == entry.name) {
                return Err(MunicipalityCatalogError::Duplicate(entry.name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// Looks up a municipality by its exact name.
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&MunicipalityProfile> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MunicipalityProfile> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
