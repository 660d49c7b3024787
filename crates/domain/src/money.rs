//! Money and percentage value objects.

use serde::{Deserialize, Serialize};

/// Money amount in centavos to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    /// Amount in centavos (e.g., 1000 = R$ 10,00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from centavos.
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Creates a new Money amount from whole reais.
    pub fn from_reais(reais: i64) -> Self {
        Self {
            cents: reais * 100,
        }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in centavos.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the whole-reais portion.
    pub fn reais(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the centavos portion (remainder after reais).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }

    /// Multiplies by a quantity, or None on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(quantity as i64)
            .map(Money::from_cents)
    }

    /// Adds two amounts, or None on overflow.
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.cents.checked_add(rhs.cents).map(Money::from_cents)
    }

    /// Returns `percentage` of this amount, rounded half-up to the centavo.
    pub fn percentage(&self, percentage: Percentage) -> Money {
        Money {
            cents: scale_rounded(self.cents, percentage.basis_points() as i64),
        }
    }

    /// Returns this amount reduced by `discount`, rounded half-up to the centavo.
    pub fn discounted(&self, discount: Percentage) -> Money {
        let remaining = Percentage::BASIS_POINTS_PER_UNIT as i64 - discount.basis_points() as i64;
        Money {
            cents: scale_rounded(self.cents, remaining),
        }
    }

    /// Formats as a plain decimal with a dot separator (`1234.56`), for CSV.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.cents < 0 { "-" } else { "" };
        format!("{sign}{}.{:02}", self.reais().abs(), self.cents_part())
    }
}

/// Multiplies `cents` by `basis_points / 10000`, rounding half away from zero.
fn scale_rounded(cents: i64, basis_points: i64) -> i64 {
    let scaled = cents as i128 * basis_points as i128;
    let unit = Percentage::BASIS_POINTS_PER_UNIT as i128;
    let half = unit / 2;
    let rounded = if scaled >= 0 {
        (scaled + half) / unit
    } else {
        (scaled - half) / unit
    };
    rounded as i64
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    /// Brazilian real formatting: `R$ 1.234,56`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.reais().abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.cents < 0 { "-" } else { "" };
        write!(f, "{sign}R$ {grouped},{:02}", self.cents_part())
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::ops::SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.cents -= rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A non-negative percentage with two decimal places of precision.
///
/// Stored as basis points (hundredths of a percent) and serialized as the
/// plain percentage number, e.g. `7.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "f64")]
pub struct Percentage(u32);

impl Percentage {
    const BASIS_POINTS_PER_UNIT: u32 = 10_000;

    /// Zero percent.
    pub const ZERO: Percentage = Percentage(0);

    /// Creates a percentage from basis points (`750` = 7.5%).
    pub const fn from_basis_points(basis_points: u32) -> Self {
        Self(basis_points)
    }

    /// Creates a percentage from a percent value, rounding to two decimals.
    ///
    /// Returns None for negative or non-finite input.
    pub fn from_percent(percent: f64) -> Option<Self> {
        if !percent.is_finite() || percent < 0.0 {
            return None;
        }
        Some(Self((percent * 100.0).round() as u32))
    }

    /// Returns the value in basis points.
    pub fn basis_points(&self) -> u32 {
        self.0
    }

    /// Returns the value as a percent number.
    pub fn as_percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns true if the percentage is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{:.2}%", self.as_percent())
        }
    }
}

impl From<Percentage> for f64 {
    fn from(p: Percentage) -> Self {
        p.as_percent()
    }
}

/// Error returned when a number is not a valid percentage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid percentage: {0}")]
pub struct InvalidPercentage(pub f64);

impl TryFrom<f64> for Percentage {
    type Error = InvalidPercentage;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Percentage::from_percent(value).ok_or(InvalidPercentage(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_cents() {
        let money = Money::from_cents(1234);
        assert_eq!(money.cents(), 1234);
        assert_eq!(money.reais(), 12);
        assert_eq!(money.cents_part(), 34);
    }

    #[test]
    fn test_money_display_in_reais() {
        assert_eq!(Money::from_cents(1234).to_string(), "R$ 12,34");
        assert_eq!(Money::from_cents(5).to_string(), "R$ 0,05");
        assert_eq!(Money::from_cents(123_456_789).to_string(), "R$ 1.234.567,89");
        assert_eq!(Money::from_cents(-100_000).to_string(), "-R$ 1.000,00");
    }

    #[test]
    fn test_money_decimal_string() {
        assert_eq!(Money::from_cents(38000).to_decimal_string(), "380.00");
        assert_eq!(Money::from_cents(-5).to_decimal_string(), "-0.05");
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply(3).cents(), 3000);
        assert_eq!(vec![a, b, b].into_iter().sum::<Money>().cents(), 2000);
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let huge = Money::from_cents(i64::MAX / 2 + 1);
        assert_eq!(huge.checked_multiply(2), None);
        assert_eq!(huge.checked_add(huge), None);
        assert_eq!(
            Money::from_cents(250).checked_multiply(4),
            Some(Money::from_reais(10))
        );
        assert_eq!(
            Money::from_cents(1).checked_add(Money::from_cents(2)),
            Some(Money::from_cents(3))
        );
    }

    #[test]
    fn test_discount_rounds_half_up() {
        let subtotal = Money::from_reais(400);
        assert_eq!(
            subtotal.discounted(Percentage::from_percent(5.0).unwrap()),
            Money::from_reais(380)
        );

        // 0.33 * (1 - 0.075) = 0.30525 -> 0.31
        let odd = Money::from_cents(33);
        assert_eq!(
            odd.discounted(Percentage::from_percent(7.5).unwrap()).cents(),
            31
        );
    }

    #[test]
    fn test_percentage_of_amount() {
        let labor = Money::from_reais(1500);
        let rate = Percentage::from_percent(12.5).unwrap();
        assert_eq!(labor.percentage(rate), Money::from_cents(18750));
    }

    #[test]
    fn test_percentage_parsing() {
        assert_eq!(Percentage::from_percent(7.5).unwrap().basis_points(), 750);
        assert_eq!(Percentage::from_percent(10.0).unwrap().to_string(), "10%");
        assert_eq!(Percentage::from_percent(2.25).unwrap().to_string(), "2.25%");
        assert!(Percentage::from_percent(-1.0).is_none());
        assert!(Percentage::from_percent(f64::NAN).is_none());
    }

    #[test]
    fn test_percentage_serializes_as_number() {
        let p = Percentage::from_percent(7.5).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "7.5");
        let back: Percentage = serde_json::from_str("7.5").unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<Percentage>("-3").is_err());
    }
}
