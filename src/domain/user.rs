use crate::error::MarketError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative sum of money in the smallest currency unit.
///
/// Balances and prices share this type. It is unsigned, so a negative balance is
/// unrepresentable; arithmetic is checked and reports failures as domain errors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, MarketError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(MarketError::BalanceOverflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, MarketError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(MarketError::InsufficientBalance {
                required: rhs.0,
                available: self.0,
            })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive top-up amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(u64);

impl Amount {
    pub fn new(value: i64) -> Result<Self, MarketError> {
        match u64::try_from(value) {
            Ok(v) if v > 0 => Ok(Self(v)),
            _ => Err(MarketError::InvalidAmount),
        }
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = MarketError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Money {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

/// A marketplace participant and their spendable funds.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub balance: Money,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            balance: Money::ZERO,
        }
    }

    /// Adds funds to the balance.
    pub fn credit(&mut self, amount: Money) -> Result<(), MarketError> {
        self.balance = self.balance.checked_add(amount)?;
        Ok(())
    }

    /// Removes funds if the balance covers them; leaves the balance untouched otherwise.
    pub fn debit(&mut self, amount: Money) -> Result<(), MarketError> {
        self.balance = self.balance.checked_sub(amount)?;
        Ok(())
    }
}
