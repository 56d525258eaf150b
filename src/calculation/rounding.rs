//! Currency rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a money amount to two decimal places, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an amount to the whole currency unit, half away from zero.
pub fn round_to_unit(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec("10.005")), dec("10.01"));
        assert_eq!(round_money(dec("-10.005")), dec("-10.01"));
        assert_eq!(round_money(dec("10.004")), dec("10.00"));
    }

    #[test]
    fn test_round_to_unit() {
        assert_eq!(round_to_unit(dec("8884.88")), dec("8885"));
        assert_eq!(round_to_unit(dec("8333.5")), dec("8334"));
        assert_eq!(round_to_unit(dec("8333.49")), dec("8333"));
    }
}
