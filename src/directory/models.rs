use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Movement kind, derived from the sign of the amount
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum MovementType {
    Deposit,
    Withdrawal,
}

impl MovementType {
    pub fn as_str(&self) -> &str {
        match self {
            MovementType::Deposit => "deposit",
            MovementType::Withdrawal => "withdrawal",
        }
    }
}

/// A single signed ledger entry
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Movement {
    /// Positive for deposits, negative for withdrawals
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

impl Movement {
    pub fn new(amount: f64, timestamp: DateTime<Utc>) -> Self {
        Self { amount, timestamp }
    }

    pub fn movement_type(&self) -> MovementType {
        if self.amount > 0.0 {
            MovementType::Deposit
        } else {
            MovementType::Withdrawal
        }
    }
}

/// Seed record an account is built from at directory population
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccountSeed {
    pub owner: String,
    pub pin: u32,
    /// Interest rate in percent
    pub interest_rate: f64,
    pub currency: String,
    pub locale: String,
    #[serde(default)]
    pub movements: Vec<Movement>,
}

/// Account model
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
    pub id: Uuid,
    pub owner: String,
    /// Derived from `owner` when the directory is populated
    pub username: String,
    pub pin: u32,
    pub interest_rate: f64,
    pub currency: String,
    pub locale: String,
    /// Chronological, latest last
    pub movements: Vec<Movement>,
}

impl Account {
    pub fn new(seed: AccountSeed) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: seed.owner,
            username: String::new(),
            pin: seed.pin,
            interest_rate: seed.interest_rate,
            currency: seed.currency,
            locale: seed.locale,
            movements: seed.movements,
        }
    }

    /// First word of the owner's name
    pub fn first_name(&self) -> &str {
        self.owner.split_whitespace().next().unwrap_or("")
    }
}

/// Aggregate figures derived from an account's movements
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub total_in: f64,
    pub total_out: f64,
    pub total_interest: f64,
}
