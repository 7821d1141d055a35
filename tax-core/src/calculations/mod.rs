//! Tax computations for the Zurich estimate and the deduction optimizer.
//!
//! Data flows one way: [`DeductionAggregator`] produces a taxable income,
//! [`TaxCalculator`] turns it into a tax breakdown, and [`AllocationSearch`]
//! re-runs the calculator on perturbed incomes.

pub mod allowances;
pub mod bracket_tax;
pub mod common;
pub mod deductions;
pub mod estimate;
pub mod optimizer;

pub use allowances::AllowanceDefaults;
pub use deductions::{
    Deduction, DeductionAggregator, DeductionKind, DeductionSummary, Pillar3aCheck,
};
pub use estimate::{Estimate, EstimateError, Estimator, TaxBreakdown, TaxCalculator};
pub use optimizer::{
    AllocationSearch, DEFAULT_STEP, DEFAULT_TOP_K, MAX_COMBINATIONS, OptimizerError,
    OptimizerRequest, RankedAllocations, SearchOutcome,
};
