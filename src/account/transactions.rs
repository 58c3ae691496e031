use chrono::{DateTime, Utc};
use log::debug;
use std::fmt;

use crate::directory::models::{Account, Movement, Summary};

/// Reasons a transfer or loan request is rejected
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionError {
    /// No account with the receiving username
    ReceiverNotFound,
    /// Receiver is the sending account
    SelfTransfer,
    /// Amount is not a finite number above zero
    InvalidAmount,
    /// Balance does not cover the amount
    InsufficientFunds,
    /// No past movement reaches the required share of the loan
    LoanNotEligible,
}

impl fmt::Display for TransactionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionError::ReceiverNotFound => write!(f, "Receiving account not found"),
            TransactionError::SelfTransfer => write!(f, "Cannot transfer to the same account"),
            TransactionError::InvalidAmount => write!(f, "Invalid transaction amount"),
            TransactionError::InsufficientFunds => write!(f, "Insufficient funds for transaction"),
            TransactionError::LoanNotEligible => {
                write!(f, "No past deposit is large enough to grant this loan")
            }
        }
    }
}

impl std::error::Error for TransactionError {}

/// Ledger rules that come from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerPolicy {
    /// Interest terms below this are not credited in the summary
    pub min_interest_credit: f64,
    /// A loan needs one movement of at least this share of the amount
    pub loan_min_deposit_ratio: f64,
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            min_interest_credit: 1.0,
            loan_min_deposit_ratio: 0.1,
        }
    }
}

/// Current balance, always recomputed from the movements
pub fn balance(account: &Account) -> f64 {
    account.movements.iter().map(|movement| movement.amount).sum()
}

/// Deposit, withdrawal and interest totals for an account
pub fn summary(account: &Account, policy: &LedgerPolicy) -> Summary {
    let deposits = || {
        account
            .movements
            .iter()
            .map(|movement| movement.amount)
            .filter(|amount| *amount > 0.0)
    };

    let total_in = deposits().sum();

    let total_out = account
        .movements
        .iter()
        .map(|movement| movement.amount)
        .filter(|amount| *amount < 0.0)
        .map(f64::abs)
        .sum();

    let total_interest = deposits()
        .map(|amount| amount * account.interest_rate / 100.0)
        .filter(|interest| *interest >= policy.min_interest_credit)
        .sum();

    Summary {
        total_in,
        total_out,
        total_interest,
    }
}

/// Append a movement at the end of the ledger
pub fn append_movement(account: &mut Account, amount: f64, timestamp: DateTime<Utc>) {
    account.movements.push(Movement::new(amount, timestamp));
}

/// Movements ordered by ascending amount; the stored order is left alone
pub fn sorted_view(account: &Account) -> Vec<Movement> {
    let mut movements = account.movements.clone();
    movements.sort_by(|a, b| a.amount.total_cmp(&b.amount));
    movements
}

/// Check a transfer of `amount` from `sender` to `receiver`
pub fn validate_transfer(
    sender: &Account,
    receiver: Option<&Account>,
    amount: f64,
) -> Result<(), TransactionError> {
    let receiver = receiver.ok_or(TransactionError::ReceiverNotFound)?;

    if receiver.username == sender.username {
        return Err(TransactionError::SelfTransfer);
    }

    if !amount.is_finite() || amount <= 0.0 {
        return Err(TransactionError::InvalidAmount);
    }

    // Written so a NaN balance fails the check
    if !(balance(sender) >= amount) {
        debug!(
            "Transfer of {:.2} exceeds balance of {}",
            amount, sender.username
        );
        return Err(TransactionError::InsufficientFunds);
    }

    Ok(())
}

/// Check a loan request, returning the amount that would be credited.
///
/// The requested amount is floored to a whole number first.
pub fn loan_eligibility(
    account: &Account,
    requested: f64,
    policy: &LedgerPolicy,
) -> Result<f64, TransactionError> {
    let amount = requested.floor();

    if !amount.is_finite() || amount <= 0.0 {
        return Err(TransactionError::InvalidAmount);
    }

    let threshold = amount * policy.loan_min_deposit_ratio;
    if account.movements.iter().any(|movement| movement.amount >= threshold) {
        Ok(amount)
    } else {
        Err(TransactionError::LoanNotEligible)
    }
}
