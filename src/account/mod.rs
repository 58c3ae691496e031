// Ledger module
// This module derives balances and summaries from an account's movements
// and holds the validation rules for transfers and loans.

mod transactions;

pub use transactions::{
    append_movement,
    balance,
    loan_eligibility,
    sorted_view,
    summary,
    validate_transfer,
    LedgerPolicy,
    TransactionError,
};
