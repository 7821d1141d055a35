//! Rounding and clamping helpers shared by the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, half away from zero.
///
/// Every itemized deduction is stored rounded this way.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1234.565)), dec!(1234.57));
/// assert_eq!(round_half_up(dec!(1234.564)), dec!(1234.56));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to whole francs, half away from zero.
///
/// Used for suggested defaults, which are shown as whole amounts.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_to_franc;
///
/// assert_eq!(round_to_franc(dec!(2549.50)), dec!(2550));
/// ```
pub fn round_to_franc(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Floors a value at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    max(value, Decimal::ZERO)
}

/// `amount * percent / 100`.
pub fn percent_of(
    amount: Decimal,
    percent: Decimal,
) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // rounding tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_midpoint_away_from_zero() {
        assert_eq!(round_half_up(dec!(0.005)), dec!(0.01));
        assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
    }

    #[test]
    fn round_half_up_keeps_whole_amounts() {
        assert_eq!(round_half_up(dec!(3000)), dec!(3000.00));
    }

    #[test]
    fn round_half_up_truncates_long_fractions() {
        // 10 m² of 80 m² at 24000 rent and 40% share
        let share = dec!(10) / dec!(80) * dec!(24000) * dec!(0.4);

        assert_eq!(round_half_up(share), dec!(1200.00));
    }

    #[test]
    fn round_to_franc_rounds_to_whole_amount() {
        assert_eq!(round_to_franc(dec!(2399.49)), dec!(2399));
        assert_eq!(round_to_franc(dec!(2399.5)), dec!(2400));
    }

    // =========================================================================
    // clamping tests
    // =========================================================================

    #[test]
    fn max_picks_larger_value() {
        assert_eq!(max(dec!(1.5), dec!(-2)), dec!(1.5));
        assert_eq!(max(dec!(-2), dec!(1.5)), dec!(1.5));
    }

    #[test]
    fn non_negative_floors_at_zero() {
        assert_eq!(non_negative(dec!(-0.01)), dec!(0));
        assert_eq!(non_negative(dec!(12.5)), dec!(12.5));
    }

    #[test]
    fn percent_of_scales_by_hundredths() {
        assert_eq!(percent_of(dec!(5000), dec!(0.50)), dec!(25));
    }
}
