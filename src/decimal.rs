use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// number of decimal places carried by every currency amount
pub const CURRENCY_SCALE: u32 = 2;

/// Money type with centavo precision.
///
/// Every constructor and arithmetic operation re-rounds to [`CURRENCY_SCALE`],
/// so sums of money values never accumulate sub-cent drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(CURRENCY_SCALE))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(CURRENCY_SCALE)))
    }

    /// create from whole currency units (pesos, dollars)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor units (centavos, cents)
    pub fn from_minor(amount: i64) -> Self {
        Money(Decimal::new(amount, CURRENCY_SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// subtraction floored at zero
    pub fn saturating_sub(self, other: Self) -> Self {
        (self - other).max(Money::ZERO)
    }

    /// split into `parts` shares: returns the per-share amount and the final
    /// share, which absorbs whatever the truncated shares leave behind.
    ///
    /// `base * (parts - 1) + last == self` always holds exactly.
    pub fn split_even(&self, parts: u32) -> (Money, Money) {
        if parts <= 1 {
            return (*self, *self);
        }
        let base = (self.0 / Decimal::from(parts))
            .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::ToZero);
        let last = self.0 - base * Decimal::from(parts - 1);
        (Money(base), Money(last))
    }

    /// multiply by a rate and a period count (simple interest)
    pub fn simple_interest(&self, rate: Rate, periods: Decimal) -> Self {
        Money::from_decimal(self.0 * rate.as_decimal() * periods)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(CURRENCY_SCALE))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(CURRENCY_SCALE);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(CURRENCY_SCALE))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(CURRENCY_SCALE);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(CURRENCY_SCALE))
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money((self.0 / other).round_dp(CURRENCY_SCALE))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

/// rate type for interest rates, discount rates and ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);
    pub const ONE: Rate = Rate(Decimal::ONE);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from basis points (e.g., 500 for 5%)
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::from(bps) / Decimal::from(10000))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// daily rate from annual rate
    pub fn daily_rate(&self) -> Rate {
        Rate(self.0 / Decimal::from(365))
    }

    /// monthly rate from annual rate
    pub fn monthly_rate(&self) -> Rate {
        Rate(self.0 / Decimal::from(12))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.125").unwrap();
        // banker's rounding to centavos
        assert_eq!(m.to_string(), "100.12");

        let m = Money::from_str_exact("100.135").unwrap();
        assert_eq!(m.to_string(), "100.14");
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Money::from_minor(150), Money::from_decimal(dec!(1.50)));
        assert_eq!(Money::from_minor(1), Money::CENT);
    }

    #[test]
    fn test_sums_do_not_drift() {
        let tenth = Money::from_decimal(dec!(0.10));
        let total: Money = std::iter::repeat(tenth).take(10).sum();
        assert_eq!(total, Money::ONE);
    }

    #[test]
    fn test_split_even_exact() {
        let (base, last) = Money::from_major(120_000).split_even(12);
        assert_eq!(base, Money::from_major(10_000));
        assert_eq!(last, Money::from_major(10_000));
    }

    #[test]
    fn test_split_even_remainder_on_last() {
        let total = Money::from_major(100);
        let (base, last) = total.split_even(3);
        assert_eq!(base, Money::from_decimal(dec!(33.33)));
        assert_eq!(last, Money::from_decimal(dec!(33.34)));
        assert_eq!(base * dec!(2) + last, total);
    }

    #[test]
    fn test_split_even_small_amount() {
        let total = Money::from_minor(5);
        let (base, last) = total.split_even(12);
        assert_eq!(base, Money::ZERO);
        assert_eq!(last, total);
    }

    #[test]
    fn test_saturating_sub() {
        let a = Money::from_major(5);
        assert_eq!(a.saturating_sub(Money::from_major(7)), Money::ZERO);
        assert_eq!(a.saturating_sub(Money::from_major(2)), Money::from_major(3));
    }

    #[test]
    fn test_simple_interest() {
        let face = Money::from_major(100_000);
        let interest = face.simple_interest(Rate::from_decimal(dec!(0.0005)), Decimal::from(31));
        assert_eq!(interest, Money::from_major(1_550));
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::from_percentage(12).to_string(), "12%");
        assert_eq!(Rate::from_bps(250).as_decimal(), dec!(0.025));
    }
}
