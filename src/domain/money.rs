use super::currency::Currency;
use crate::error::PaymentError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Mul;

/// A currency-tagged decimal amount.
///
/// Zero amounts are currency-less for equality: `0 INR == 0 JPY == Money::ZERO`.
/// This breaks strict structural equality on purpose, and callers that need to
/// tell zero amounts apart by currency must compare [`Money::currency`] themselves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Money {
    currency: Currency,
    amount: Decimal,
}

impl Money {
    pub const ZERO: Self = Self {
        currency: Currency::DEFAULT,
        amount: Decimal::ZERO,
    };

    pub fn new(currency: Currency, amount: Decimal) -> Self {
        Self { currency, amount }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Adds two amounts of the same currency.
    ///
    /// A zero operand is the identity and is accepted in any currency.
    /// A sum outside the `Decimal` range fails with `Overflow`.
    pub fn try_add(&self, other: &Money) -> Result<Money, PaymentError> {
        if other.is_zero() {
            return Ok(*self);
        }
        if self.is_zero() {
            return Ok(*other);
        }
        self.ensure_same_currency(other)?;
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(self.currency, amount))
            .ok_or_else(|| PaymentError::Overflow(format!("{} + {}", self, other)))
    }

    /// Scales the amount, keeping the currency.
    ///
    /// # Panics
    ///
    /// Panics if the product is outside the `Decimal` range. Use
    /// [`Money::try_multiply`] when the factor is untrusted.
    pub fn multiply(&self, factor: Decimal) -> Money {
        Self::new(self.currency, self.amount * factor)
    }

    pub fn try_multiply(&self, factor: Decimal) -> Result<Money, PaymentError> {
        self.amount
            .checked_mul(factor)
            .map(|amount| Self::new(self.currency, amount))
            .ok_or_else(|| PaymentError::Overflow(format!("{} * {}", self, factor)))
    }

    /// Fails with `CurrencyMismatch` for non-zero amounts in different currencies.
    ///
    /// A zero operand compares against any currency without error, matching
    /// [`Money::try_add`] and the `PartialOrd` impl. Only two non-zero amounts
    /// need the same currency.
    pub fn less_than(&self, other: &Money) -> Result<bool, PaymentError> {
        self.partial_cmp(other)
            .map(|ordering| ordering == Ordering::Less)
            .ok_or(PaymentError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            })
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), PaymentError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(PaymentError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            })
        }
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero() && other.is_zero() {
            return true;
        }
        self.currency == other.currency && self.amount == other.amount
    }
}

impl Eq for Money {}

impl Hash for Money {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree with `eq`: every zero hashes the same regardless of currency or scale.
        if self.is_zero() {
            Decimal::ZERO.hash(state);
        } else {
            self.currency.hash(state);
            self.amount.normalize().hash(state);
        }
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.currency == other.currency || self.is_zero() || other.is_zero() {
            self.amount.partial_cmp(&other.amount)
        } else {
            None
        }
    }
}

/// Same as [`Money::multiply`], including the panic on overflow.
impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, rhs: Decimal) -> Self::Output {
        self.multiply(rhs)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{} {:.2}", self.currency.symbol(), rounded)
    }
}
