// Account directory module
// Holds the process-lifetime set of accounts, derives their usernames
// and supports lookup and removal.

use log::{debug, info};
use std::collections::HashSet;
use thiserror::Error;

pub mod models;
pub mod seed;

use crate::account;
use models::{Account, AccountSeed};

/// Directory population errors
#[derive(Debug, Error, PartialEq)]
pub enum DirectoryError {
    #[error("Username '{0}' is derived from more than one owner")]
    DuplicateUsername(String),

    #[error("Owner name '{0}' does not yield a username")]
    EmptyUsername(String),

    #[error("Movement of {amount} for '{owner}' is not a finite amount")]
    NonFiniteMovement { owner: String, amount: f64 },
}

/// Lowercase initials of each space-separated word of `owner`
pub fn derive_username(owner: &str) -> String {
    owner
        .to_lowercase()
        .split(' ')
        .filter_map(|word| word.chars().next())
        .collect()
}

/// The set of accounts known to the application, unique by username
#[derive(Debug, Default, Clone)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
}

impl AccountDirectory {
    /// Populate the directory from a seed list
    pub fn from_seeds(seeds: Vec<AccountSeed>) -> Result<Self, DirectoryError> {
        for seed in &seeds {
            if let Some(movement) = seed.movements.iter().find(|m| !m.amount.is_finite()) {
                return Err(DirectoryError::NonFiniteMovement {
                    owner: seed.owner.clone(),
                    amount: movement.amount,
                });
            }
        }

        let mut directory = Self {
            accounts: seeds.into_iter().map(Account::new).collect(),
        };
        directory.derive_usernames()?;

        info!("Account directory populated with {} accounts", directory.len());
        Ok(directory)
    }

    /// Compute every account's username from its owner.
    ///
    /// Idempotent as long as owners are unchanged. Fails without touching
    /// any account if two owners collapse onto the same username.
    pub fn derive_usernames(&mut self) -> Result<(), DirectoryError> {
        let mut seen = HashSet::new();
        let mut derived = Vec::with_capacity(self.accounts.len());

        for account in &self.accounts {
            let username = derive_username(&account.owner);
            if username.is_empty() {
                return Err(DirectoryError::EmptyUsername(account.owner.clone()));
            }
            if !seen.insert(username.clone()) {
                return Err(DirectoryError::DuplicateUsername(username));
            }
            derived.push(username);
        }

        for (account, username) in self.accounts.iter_mut().zip(derived) {
            debug!("Derived username '{}' for {}", username, account.owner);
            account.username = username;
        }

        Ok(())
    }

    pub fn find_by_username(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.username == username)
    }

    pub fn find_by_username_mut(&mut self, username: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.username == username)
    }

    /// Remove the account with `username`, returning it if it existed
    pub fn remove(&mut self, username: &str) -> Option<Account> {
        let index = self
            .accounts
            .iter()
            .position(|account| account.username == username)?;
        Some(self.accounts.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Sum of every account's balance
    pub fn total_balance(&self) -> f64 {
        self.accounts.iter().map(account::balance).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use super::models::Movement;
    use test_case::test_case;

    fn seed(owner: &str, pin: u32) -> AccountSeed {
        AccountSeed {
            owner: owner.to_string(),
            pin,
            interest_rate: 1.0,
            currency: "EUR".to_string(),
            locale: "de-DE".to_string(),
            movements: Vec::new(),
        }
    }

    #[test_case("Jonas Schmedtmann", "js" ; "two words")]
    #[test_case("Steven Thomas Williams", "stw" ; "three words")]
    #[test_case("Sarah", "s" ; "single word")]
    #[test_case("JESSICA DAVIS", "jd" ; "uppercase")]
    #[test_case("Ana  Lopes", "al" ; "double space")]
    fn test_derive_username(owner: &str, expected: &str) {
        assert_eq!(derive_username(owner), expected);
    }

    #[test]
    fn test_populate_and_lookup() {
        let directory =
            AccountDirectory::from_seeds(vec![seed("Jonas Schmedtmann", 1111), seed("Jessica Davis", 2222)])
                .unwrap();

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.find_by_username("jd").unwrap().pin, 2222);
        assert!(directory.find_by_username("xx").is_none());
    }

    #[test]
    fn test_duplicate_usernames_rejected() {
        let result =
            AccountDirectory::from_seeds(vec![seed("Jonas Schmedtmann", 1111), seed("Jane Smith", 2222)]);
        assert_eq!(
            result.unwrap_err(),
            DirectoryError::DuplicateUsername("js".to_string())
        );
    }

    #[test]
    fn test_empty_owner_rejected() {
        let result = AccountDirectory::from_seeds(vec![seed("   ", 1111)]);
        assert!(matches!(result, Err(DirectoryError::EmptyUsername(_))));
    }

    #[test_case(f64::NAN ; "nan")]
    #[test_case(f64::INFINITY ; "infinity")]
    #[test_case(f64::NEG_INFINITY ; "negative infinity")]
    fn test_non_finite_movement_rejected(amount: f64) {
        let mut broken = seed("Jonas Schmedtmann", 1111);
        broken.movements.push(Movement::new(200.0, Utc::now()));
        broken.movements.push(Movement::new(amount, Utc::now()));

        let result = AccountDirectory::from_seeds(vec![broken, seed("Jessica Davis", 2222)]);
        assert!(matches!(
            result,
            Err(DirectoryError::NonFiniteMovement { ref owner, .. }) if owner == "Jonas Schmedtmann"
        ));
    }

    #[test]
    fn test_derive_usernames_is_idempotent() {
        let mut directory = AccountDirectory::from_seeds(vec![seed("Jessica Davis", 2222)]).unwrap();
        directory.derive_usernames().unwrap();
        directory.derive_usernames().unwrap();

        let usernames: Vec<_> = directory.iter().map(|a| a.username.clone()).collect();
        assert_eq!(usernames, vec!["jd".to_string()]);
    }

    #[test]
    fn test_remove() {
        let mut directory =
            AccountDirectory::from_seeds(vec![seed("Jonas Schmedtmann", 1111), seed("Jessica Davis", 2222)])
                .unwrap();

        let removed = directory.remove("js").unwrap();
        assert_eq!(removed.owner, "Jonas Schmedtmann");
        assert!(directory.find_by_username("js").is_none());
        assert_eq!(directory.len(), 1);
        assert!(directory.remove("js").is_none());
    }
}
