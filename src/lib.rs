//! Bankist: a single-user banking session over a fixed account directory.
//!
//! [`session::AuthSession`] is the entry point. It authenticates against an
//! [`directory::AccountDirectory`], applies transfers, loans and closures
//! through the ledger rules in [`account`], and ends the login after a
//! period of inactivity.

pub mod account;
pub mod cli;
pub mod config;
pub mod directory;
pub mod session;
