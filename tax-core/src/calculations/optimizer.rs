//! Budget allocation search across the additional deduction channels.
//!
//! Every enabled channel gets a domain of step multiples from zero up to the
//! smaller of its cap and the budget. The search walks the full Cartesian
//! product of those domains, re-estimates the tax for each combination that
//! spends something within budget, and ranks the survivors by net cost:
//!
//! ```text
//! extra     = sum of amounts
//! tax_after = total tax at max(0, baseline taxable income - extra)
//! tax_saved = baseline total tax - tax_after
//! net_cost  = extra - tax_saved
//! ```
//!
//! Ties on net cost go to the smaller `extra`, then to enumeration order
//! (the last channel varies fastest).
//!
//! The product of domain sizes is checked against [`MAX_COMBINATIONS`] before
//! anything is enumerated. A larger space is refused, never truncated.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tax_core::calculations::{AllocationSearch, OptimizerRequest, SearchOutcome};
//! use tax_core::{BracketTable, Channel, EstimateResult, TableKind, TaxBracket};
//!
//! let flat = |kind| {
//!     BracketTable::new(
//!         kind,
//!         vec![TaxBracket {
//!             min_income: dec!(0),
//!             max_income: None,
//!             base_tax: dec!(0),
//!             tax_rate: dec!(0.10),
//!         }],
//!     )
//!     .unwrap()
//! };
//! let cantonal = flat(TableKind::Cantonal);
//! let federal = flat(TableKind::Federal);
//! let baseline = EstimateResult {
//!     municipality: "Town".to_string(),
//!     taxable_income: dec!(10000),
//!     total_tax: dec!(2000),
//!     basic_cantonal_tax: dec!(1000),
//!     cantonal_tax: dec!(1000),
//!     church_tax: dec!(0),
//!     federal_tax: dec!(1000),
//!     commune_multiplier: dec!(1),
//!     church_tax_percent: dec!(0),
//!     canton_factor: dec!(1),
//!     pillar3a_used: dec!(0),
//!     pillar3a_cap: dec!(7056),
//!     total_income: dec!(10000),
//!     total_deductions: dec!(0),
//! };
//! let request = OptimizerRequest::new(vec![Channel::Donations], dec!(200));
//!
//! let outcome = AllocationSearch::new(&cantonal, &federal)
//!     .search(&baseline, &request)
//!     .unwrap();
//!
//! let SearchOutcome::Ranked(ranked) = outcome else {
//!     panic!("expected ranked allocations");
//! };
//! assert_eq!(ranked.best().extra, dec!(100));
//! assert_eq!(ranked.best().tax_saved, dec!(20));
//! assert_eq!(ranked.best().net_cost, dec!(80));
//! assert_eq!(ranked.all().len(), 2);
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculations::common::non_negative;
use crate::calculations::estimate::TaxCalculator;
use crate::models::{
    AllocationCandidate, AllocationChannel, BracketTable, Channel, EstimateResult, TaxYearData,
};

/// Largest number of combinations the search will enumerate.
pub const MAX_COMBINATIONS: u64 = 200_000;

pub const DEFAULT_STEP: Decimal = Decimal::ONE_HUNDRED;

/// How many candidates a report usually shows.
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptimizerError {
    #[error("step must be a positive whole amount, got {0}")]
    InvalidStep(Decimal),

    #[error("budget must not be negative, got {0}")]
    NegativeBudget(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerRequest {
    /// Channels to search; duplicates are ignored.
    pub channels: Vec<Channel>,
    pub max_budget: Decimal,
    pub step: Decimal,
}

impl OptimizerRequest {
    pub fn new(
        channels: Vec<Channel>,
        max_budget: Decimal,
    ) -> Self {
        Self {
            channels,
            max_budget,
            step: DEFAULT_STEP,
        }
    }

    pub fn with_step(
        mut self,
        step: Decimal,
    ) -> Self {
        self.step = step;
        self
    }

    fn validate(&self) -> Result<(), OptimizerError> {
        if self.step <= Decimal::ZERO || !self.step.fract().is_zero() {
            return Err(OptimizerError::InvalidStep(self.step));
        }
        if self.max_budget < Decimal::ZERO {
            return Err(OptimizerError::NegativeBudget(self.max_budget));
        }
        Ok(())
    }
}

/// Candidates sorted best first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedAllocations {
    candidates: Vec<AllocationCandidate>,
    combinations: u64,
}

impl RankedAllocations {
    /// The lowest net cost allocation.
    pub fn best(&self) -> &AllocationCandidate {
        &self.candidates[0]
    }

    /// At most `k` candidates, best first.
    pub fn top(
        &self,
        k: usize,
    ) -> &[AllocationCandidate] {
        &self.candidates[..k.min(self.candidates.len())]
    }

    pub fn all(&self) -> &[AllocationCandidate] {
        &self.candidates
    }

    /// Size of the enumerated search space, discarded combinations included.
    pub fn combinations(&self) -> u64 {
        self.combinations
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SearchOutcome {
    /// No channel was enabled; nothing was searched.
    NothingSelected,

    /// The search space exceeds `limit`; nothing was enumerated.
    SearchSpaceTooLarge { combinations: u64, limit: u64 },

    /// Every combination was a no-op or over budget.
    NoFeasibleAllocation { combinations: u64 },

    Ranked(RankedAllocations),
}

/// Walks the Cartesian product of per-channel amount domains, last domain
/// varying fastest.
struct CartesianProduct<'d> {
    domains: &'d [Vec<Decimal>],
    indices: Vec<usize>,
    exhausted: bool,
}

impl<'d> CartesianProduct<'d> {
    fn new(domains: &'d [Vec<Decimal>]) -> Self {
        Self {
            domains,
            indices: vec![0; domains.len()],
            exhausted: domains.is_empty() || domains.iter().any(Vec::is_empty),
        }
    }
}

impl Iterator for CartesianProduct<'_> {
    type Item = Vec<Decimal>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let current = self
            .indices
            .iter()
            .zip(self.domains)
            .map(|(&index, domain)| domain[index])
            .collect();

        // odometer increment
        self.exhausted = true;
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.domains[position].len() {
                self.exhausted = false;
                break;
            }
            self.indices[position] = 0;
        }

        Some(current)
    }
}

/// Number of step multiples in `[0, upper]`, saturating at `u64::MAX`.
fn domain_size(
    upper: Decimal,
    step: Decimal,
) -> u64 {
    (upper / step)
        .floor()
        .to_u64()
        .map_or(u64::MAX, |steps| steps.saturating_add(1))
}

fn domain(
    size: u64,
    step: Decimal,
) -> Vec<Decimal> {
    (0..size).map(|i| Decimal::from(i) * step).collect()
}

pub struct AllocationSearch<'a> {
    cantonal: &'a BracketTable,
    federal: &'a BracketTable,
}

impl<'a> AllocationSearch<'a> {
    pub fn new(
        cantonal: &'a BracketTable,
        federal: &'a BracketTable,
    ) -> Self {
        Self { cantonal, federal }
    }

    pub fn from_data(data: &'a TaxYearData) -> Self {
        Self::new(&data.cantonal, &data.federal)
    }

    /// Searches allocations of `request.max_budget` over the requested
    /// channels, starting from `baseline`.
    ///
    /// The baseline's canton factor and municipality parameters are reused
    /// for every re-estimate.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError`] when the step is not a positive whole
    /// amount or the budget is negative. Empty and oversized searches are
    /// reported through [`SearchOutcome`].
    pub fn search(
        &self,
        baseline: &EstimateResult,
        request: &OptimizerRequest,
    ) -> Result<SearchOutcome, OptimizerError> {
        request.validate()?;

        let selected: BTreeSet<Channel> = request.channels.iter().copied().collect();
        if selected.is_empty() {
            return Ok(SearchOutcome::NothingSelected);
        }

        let budget = request.max_budget;
        let step = request.step;
        let channels: Vec<AllocationChannel> = selected
            .into_iter()
            .map(|channel| AllocationChannel::for_baseline(channel, baseline))
            .collect();
        let sizes: Vec<u64> = channels
            .iter()
            .map(|channel| domain_size(channel.upper_bound(budget), step))
            .collect();

        let combinations = sizes
            .iter()
            .try_fold(1u64, |product, &size| product.checked_mul(size))
            .unwrap_or(u64::MAX);
        debug!(?sizes, combinations, %budget, %step, "sized allocation search");

        if combinations > MAX_COMBINATIONS {
            warn!(
                combinations,
                limit = MAX_COMBINATIONS,
                "allocation search space too large; raise the step or narrow the channels"
            );
            return Ok(SearchOutcome::SearchSpaceTooLarge {
                combinations,
                limit: MAX_COMBINATIONS,
            });
        }

        let domains: Vec<Vec<Decimal>> = sizes.iter().map(|&size| domain(size, step)).collect();
        let calculator = TaxCalculator::new(self.cantonal, self.federal, baseline.canton_factor);
        let municipality = baseline.municipality_profile();

        // the resulting tax depends on the total only
        let mut tax_after_by_extra: HashMap<Decimal, Decimal> = HashMap::new();
        let mut candidates = Vec::new();

        for amounts in CartesianProduct::new(&domains) {
            // a sum past Decimal::MAX is over any budget
            let Some(extra) = amounts
                .iter()
                .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount))
            else {
                continue;
            };
            if extra.is_zero() || extra > budget {
                continue;
            }

            let tax_after = *tax_after_by_extra.entry(extra).or_insert_with(|| {
                let taxable_income = non_negative(baseline.taxable_income - extra);
                calculator.compute(taxable_income, &municipality).total_tax
            });
            let tax_saved = baseline.total_tax - tax_after;

            candidates.push(AllocationCandidate {
                allocation: channels
                    .iter()
                    .map(|c| c.channel)
                    .zip(amounts)
                    .collect::<BTreeMap<_, _>>(),
                extra,
                tax_saved,
                net_cost: extra - tax_saved,
                tax_after,
            });
        }

        if candidates.is_empty() {
            info!(combinations, "no feasible allocation");
            return Ok(SearchOutcome::NoFeasibleAllocation { combinations });
        }

        candidates.sort_by(|a, b| a.net_cost.cmp(&b.net_cost).then(a.extra.cmp(&b.extra)));
        info!(
            combinations,
            candidates = candidates.len(),
            best_net_cost = %candidates[0].net_cost,
            best_extra = %candidates[0].extra,
            "allocation search complete"
        );

        Ok(SearchOutcome::Ranked(RankedAllocations {
            candidates,
            combinations,
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::fixtures;

    fn search(
        baseline: &EstimateResult,
        request: &OptimizerRequest,
    ) -> SearchOutcome {
        let cantonal = fixtures::cantonal_table();
        let federal = fixtures::federal_table();
        AllocationSearch::new(&cantonal, &federal)
            .search(baseline, request)
            .unwrap()
    }

    fn ranked(outcome: SearchOutcome) -> RankedAllocations {
        match outcome {
            SearchOutcome::Ranked(ranked) => ranked,
            other => panic!("expected ranked allocations, got {other:?}"),
        }
    }

    fn total_tax_at(taxable_income: Decimal) -> Decimal {
        let cantonal = fixtures::cantonal_table();
        let federal = fixtures::federal_table();
        TaxCalculator::new(&cantonal, &federal, dec!(0.98))
            .compute(taxable_income, &fixtures::zurich_city())
            .total_tax
    }

    // =========================================================================
    // request validation
    // =========================================================================

    #[test]
    fn rejects_non_positive_step() {
        let baseline = fixtures::baseline(dec!(80000));

        for step in [dec!(0), dec!(-100)] {
            let request = OptimizerRequest::new(vec![Channel::Donations], dec!(500)).with_step(step);
            let cantonal = fixtures::cantonal_table();
            let federal = fixtures::federal_table();

            assert_eq!(
                AllocationSearch::new(&cantonal, &federal).search(&baseline, &request),
                Err(OptimizerError::InvalidStep(step))
            );
        }
    }

    #[test]
    fn rejects_fractional_step() {
        let baseline = fixtures::baseline(dec!(80000));
        let request =
            OptimizerRequest::new(vec![Channel::Donations], dec!(500)).with_step(dec!(50.5));
        let cantonal = fixtures::cantonal_table();
        let federal = fixtures::federal_table();

        assert_eq!(
            AllocationSearch::new(&cantonal, &federal).search(&baseline, &request),
            Err(OptimizerError::InvalidStep(dec!(50.5)))
        );
    }

    #[test]
    fn rejects_negative_budget() {
        let baseline = fixtures::baseline(dec!(80000));
        let request = OptimizerRequest::new(vec![Channel::Donations], dec!(-1));
        let cantonal = fixtures::cantonal_table();
        let federal = fixtures::federal_table();

        assert_eq!(
            AllocationSearch::new(&cantonal, &federal).search(&baseline, &request),
            Err(OptimizerError::NegativeBudget(dec!(-1)))
        );
    }

    #[test]
    fn default_step_is_one_hundred() {
        let request = OptimizerRequest::new(Channel::DEFAULT_SELECTION.to_vec(), dec!(1000));

        assert_eq!(request.step, dec!(100));
    }

    // =========================================================================
    // empty outcomes
    // =========================================================================

    #[test]
    fn no_channels_is_nothing_selected() {
        let baseline = fixtures::baseline(dec!(80000));
        let request = OptimizerRequest::new(vec![], dec!(1000));

        assert_eq!(search(&baseline, &request), SearchOutcome::NothingSelected);
    }

    #[test]
    fn zero_budget_has_no_feasible_allocation() {
        let baseline = fixtures::baseline(dec!(80000));

        for channels in [
            vec![Channel::Donations],
            Channel::DEFAULT_SELECTION.to_vec(),
            Channel::ALL.to_vec(),
        ] {
            let request = OptimizerRequest::new(channels, dec!(0));
            assert_eq!(
                search(&baseline, &request),
                SearchOutcome::NoFeasibleAllocation { combinations: 1 }
            );
        }
    }

    #[test]
    fn budget_below_step_has_no_feasible_allocation() {
        let baseline = fixtures::baseline(dec!(80000));
        let request = OptimizerRequest::new(vec![Channel::Donations], dec!(99));

        assert_eq!(
            search(&baseline, &request),
            SearchOutcome::NoFeasibleAllocation { combinations: 1 }
        );
    }

    // =========================================================================
    // search space guard
    // =========================================================================

    #[test]
    fn oversized_search_space_is_refused() {
        let baseline = fixtures::baseline(dec!(80000));
        // 61 amounts per channel, 61^3 = 226981
        let request = OptimizerRequest::new(Channel::DEFAULT_SELECTION.to_vec(), dec!(6000));

        assert_eq!(
            search(&baseline, &request),
            SearchOutcome::SearchSpaceTooLarge {
                combinations: 226_981,
                limit: MAX_COMBINATIONS,
            }
        );
    }

    #[test]
    fn huge_budget_is_refused_without_overflow() {
        let baseline = fixtures::baseline(dec!(80000));
        let request = OptimizerRequest::new(Channel::ALL.to_vec(), Decimal::MAX).with_step(dec!(1));

        assert_eq!(
            search(&baseline, &request),
            SearchOutcome::SearchSpaceTooLarge {
                combinations: u64::MAX,
                limit: MAX_COMBINATIONS,
            }
        );
    }

    #[test]
    fn sums_past_the_decimal_range_are_over_budget() {
        let baseline = fixtures::baseline(dec!(80000));
        // domains {0, 2e28, 4e28, 6e28}; pairs above 7.9e28 overflow
        let request = OptimizerRequest::new(vec![Channel::Pillar2, Channel::Donations], Decimal::MAX)
            .with_step(dec!(20000000000000000000000000000));

        let ranked = ranked(search(&baseline, &request));

        assert_eq!(ranked.combinations(), 16);
        // 3 single-channel amounts each, plus (2e28, 2e28), (2e28, 4e28)
        // and (4e28, 2e28)
        assert_eq!(ranked.all().len(), 9);
        assert!(
            ranked
                .all()
                .iter()
                .all(|c| c.extra <= dec!(60000000000000000000000000000))
        );
    }

    #[test]
    fn search_space_at_limit_runs() {
        let baseline = fixtures::baseline(dec!(80000));
        // 447^2 = 199809
        let request = OptimizerRequest::new(vec![Channel::Pillar2, Channel::Donations], dec!(446))
            .with_step(dec!(1));

        let ranked = ranked(search(&baseline, &request));

        assert_eq!(ranked.combinations(), 199_809);
    }

    // =========================================================================
    // ranking
    // =========================================================================

    #[test]
    fn single_donation_channel_scenario() {
        let baseline = fixtures::baseline(dec!(50000));
        let request = OptimizerRequest::new(vec![Channel::Donations], dec!(300));

        let ranked = ranked(search(&baseline, &request));

        let extras: Vec<Decimal> = ranked.all().iter().map(|c| c.extra).collect();
        let mut sorted_extras = extras.clone();
        sorted_extras.sort();
        assert_eq!(sorted_extras, vec![dec!(100), dec!(200), dec!(300)]);

        for candidate in ranked.all() {
            let expected_after = total_tax_at(dec!(50000) - candidate.extra);
            assert_eq!(candidate.tax_after, expected_after);
            assert!(candidate.tax_after <= baseline.total_tax);
            assert_eq!(candidate.tax_saved, baseline.total_tax - expected_after);
            assert_eq!(candidate.net_cost, candidate.extra - candidate.tax_saved);
            assert_eq!(candidate.amount(Channel::Donations), candidate.extra);
        }
        for pair in ranked.all().windows(2) {
            assert!(pair[0].net_cost <= pair[1].net_cost);
        }
        // a flat marginal rate makes the smallest gift the cheapest
        assert_eq!(ranked.best().extra, dec!(100));
    }

    #[test]
    fn candidates_respect_budget_and_pillar3a_room() {
        let mut baseline = fixtures::baseline(dec!(90000));
        baseline.pillar3a_used = dec!(6856);
        let request = OptimizerRequest::new(Channel::ALL.to_vec(), dec!(500));

        let ranked = ranked(search(&baseline, &request));

        for candidate in ranked.all() {
            assert!(candidate.extra > dec!(0));
            assert!(candidate.extra <= dec!(500));
            assert!(candidate.amount(Channel::Pillar3a) <= dec!(200));
            assert_eq!(candidate.allocation.len(), 4);
        }
        let best = ranked.best();
        assert!(ranked.all().iter().all(|c| best.net_cost <= c.net_cost));
    }

    #[test]
    fn over_budget_combinations_are_discarded() {
        let baseline = fixtures::baseline(dec!(80000));
        let request = OptimizerRequest::new(vec![Channel::Pillar2, Channel::Donations], dec!(200));

        let ranked = ranked(search(&baseline, &request));

        // 3 x 3 combinations minus the empty one and three over budget
        assert_eq!(ranked.combinations(), 9);
        assert_eq!(ranked.all().len(), 5);
    }

    #[test]
    fn equal_net_cost_keeps_enumeration_order() {
        let baseline = fixtures::baseline(dec!(80000));
        let request = OptimizerRequest::new(vec![Channel::Donations, Channel::Pillar3a], dec!(100));

        let ranked = ranked(search(&baseline, &request));
        let first = &ranked.all()[0];
        let second = &ranked.all()[1];

        assert_eq!(first.net_cost, second.net_cost);
        assert_eq!(first.amount(Channel::Donations), dec!(100));
        assert_eq!(second.amount(Channel::Pillar3a), dec!(100));
    }

    #[test]
    fn duplicate_channels_collapse() {
        let baseline = fixtures::baseline(dec!(80000));
        let request = OptimizerRequest::new(
            vec![Channel::Donations, Channel::Donations, Channel::Donations],
            dec!(300),
        );

        let ranked = ranked(search(&baseline, &request));

        assert_eq!(ranked.combinations(), 4);
        assert_eq!(ranked.all().len(), 3);
    }

    #[test]
    fn exhausted_pillar3a_room_contributes_nothing() {
        let mut baseline = fixtures::baseline(dec!(80000));
        baseline.pillar3a_used = dec!(7056);
        let request = OptimizerRequest::new(vec![Channel::Pillar3a], dec!(1000));

        assert_eq!(
            search(&baseline, &request),
            SearchOutcome::NoFeasibleAllocation { combinations: 1 }
        );
    }

    #[test]
    fn extra_above_taxable_income_floors_income_at_zero() {
        let baseline = fixtures::baseline(dec!(200));
        let request = OptimizerRequest::new(vec![Channel::Donations], dec!(500));

        let ranked = ranked(search(&baseline, &request));

        assert!(ranked.all().iter().all(|c| c.tax_after == dec!(0)));
        assert_eq!(ranked.best().net_cost, dec!(100));
    }

    #[test]
    fn top_truncates_to_available_candidates() {
        let baseline = fixtures::baseline(dec!(80000));
        let request = OptimizerRequest::new(vec![Channel::Donations], dec!(1500));

        let ranked = ranked(search(&baseline, &request));

        assert_eq!(ranked.top(DEFAULT_TOP_K).len(), 10);
        assert_eq!(ranked.top(100).len(), 15);
        assert_eq!(ranked.top(1)[0], *ranked.best());
    }

    // =========================================================================
    // CartesianProduct
    // =========================================================================

    #[test]
    fn cartesian_product_varies_last_domain_fastest() {
        let domains = vec![vec![dec!(0), dec!(1)], vec![dec!(0), dec!(10), dec!(20)]];

        let combinations: Vec<Vec<Decimal>> = CartesianProduct::new(&domains).collect();

        assert_eq!(
            combinations,
            vec![
                vec![dec!(0), dec!(0)],
                vec![dec!(0), dec!(10)],
                vec![dec!(0), dec!(20)],
                vec![dec!(1), dec!(0)],
                vec![dec!(1), dec!(10)],
                vec![dec!(1), dec!(20)],
            ]
        );
    }

    #[test]
    fn domain_size_counts_inclusive_multiples() {
        assert_eq!(domain_size(dec!(300), dec!(100)), 4);
        assert_eq!(domain_size(dec!(350), dec!(100)), 4);
        assert_eq!(domain_size(dec!(0), dec!(100)), 1);
    }
}
