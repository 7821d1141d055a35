use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::estimate_result::EstimateResult;

/// Additional deductible contribution channels the optimizer can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Additional voluntary pillar 3a contribution.
    Pillar3a,
    /// Voluntary pillar 2 buy-in.
    Pillar2,
    Donations,
    /// Job-related moving costs.
    Moving,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Pillar3a,
        Channel::Pillar2,
        Channel::Donations,
        Channel::Moving,
    ];

    /// Channels enabled when the caller does not choose any.
    pub const DEFAULT_SELECTION: [Channel; 3] =
        [Channel::Pillar3a, Channel::Pillar2, Channel::Donations];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pillar3a => "pillar3a",
            Self::Pillar2 => "pillar2",
            Self::Donations => "donations",
            Self::Moving => "moving",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pillar3a" => Some(Self::Pillar3a),
            "pillar2" => Some(Self::Pillar2),
            "donations" => Some(Self::Donations),
            "moving" => Some(Self::Moving),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pillar3a => "Pillar 3a",
            Self::Pillar2 => "Pillar 2 buy-in",
            Self::Donations => "Donations",
            Self::Moving => "Moving costs",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A channel together with the most it may receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationChannel {
    pub channel: Channel,
    /// `None` when only the budget limits the channel.
    pub cap: Option<Decimal>,
}

impl AllocationChannel {
    /// Caps a channel by what the baseline leaves available.
    ///
    /// Only pillar 3a is capped, by the unused legal room.
    pub fn for_baseline(
        channel: Channel,
        baseline: &EstimateResult,
    ) -> Self {
        let cap = match channel {
            Channel::Pillar3a => Some(baseline.pillar3a_remaining()),
            Channel::Pillar2 | Channel::Donations | Channel::Moving => None,
        };
        Self { channel, cap }
    }

    /// Largest amount this channel may receive under `budget`.
    pub fn upper_bound(
        &self,
        budget: Decimal,
    ) -> Decimal {
        self.cap.map_or(budget, |cap| cap.min(budget))
    }
}

/// One evaluated allocation of the extra budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationCandidate {
    /// Amount per selected channel, zero amounts included.
    pub allocation: BTreeMap<Channel, Decimal>,
    /// Sum of all allocated amounts.
    pub extra: Decimal,
    pub tax_saved: Decimal,
    /// `extra - tax_saved`; negative means the allocation pays for itself.
    pub net_cost: Decimal,
    pub tax_after: Decimal,
}

impl AllocationCandidate {
    pub fn amount(
        &self,
        channel: Channel,
    ) -> Decimal {
        self.allocation
            .get(&channel)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Compact `"Pillar 3a: 300, Donations: 0"` style description.
    pub fn describe(&self) -> String {
        self.allocation
            .iter()
            .map(|(channel, amount)| format!("{channel}: {amount}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
