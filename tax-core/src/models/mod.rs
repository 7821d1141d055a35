mod allocation;
mod estimate_result;
mod municipality;
mod tax_bracket;
mod tax_year_config;
mod taxpayer_profile;

pub use allocation::{AllocationCandidate, AllocationChannel, Channel};
pub use estimate_result::EstimateResult;
pub use municipality::{MunicipalityCatalog, MunicipalityCatalogError, MunicipalityProfile};
pub use tax_bracket::{BracketTable, BracketTableError, Discontinuity, TableKind, TaxBracket};
pub use tax_year_config::{CommuteRate, TaxYearConfig, TaxYearData, TaxYearDataError};
pub use taxpayer_profile::{
    Commute, CommuteMode, Dependent, EmploymentType, FlatAllowances, HomeOffice, Income,
    ItemizedExpenses, MaritalStatus, PensionContributions, ProfileError, TaxpayerProfile,
};
