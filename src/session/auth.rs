use log::{debug, info};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::account::{self, LedgerPolicy, TransactionError};
use crate::config::Config;
use crate::directory::models::{Account, Movement, Summary};
use crate::directory::AccountDirectory;

use super::clock::{Clock, SystemClock};
use super::scheduler::Scheduler;
use super::timer::{SessionTimer, TimerTick};

/// Session operation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// Unknown username or wrong pin
    #[error("Invalid username or pin")]
    AuthFailure,

    /// Transfer or loan preconditions not met
    #[error("{0}")]
    ValidationFailure(#[from] TransactionError),

    /// Operation needs a logged-in account
    #[error("No account is logged in")]
    NotAuthorized,

    /// Deferred effect outlived the login that scheduled it
    #[error("Deferred effect no longer applies to the current session")]
    StaleEffect,
}

/// Session rules that come from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionPolicy {
    /// Inactivity countdown in seconds
    pub timeout_secs: u64,
    /// Delay before an approved loan is credited
    pub loan_approval_delay: Duration,
    pub ledger: LedgerPolicy,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            loan_approval_delay: Duration::from_millis(2500),
            ledger: LedgerPolicy::default(),
        }
    }
}

impl From<&Config> for SessionPolicy {
    fn from(config: &Config) -> Self {
        Self {
            timeout_secs: config.session.timeout_secs,
            loan_approval_delay: Duration::from_millis(config.loan.approval_delay_millis),
            ledger: LedgerPolicy {
                min_interest_credit: config.ledger.min_interest_credit,
                loan_min_deposit_ratio: config.loan.min_deposit_ratio,
            },
        }
    }
}

/// Identity a deferred loan credit is bound to
#[derive(Debug, Clone, PartialEq)]
pub struct LoanTicket {
    pub account_id: Uuid,
    pub amount: f64,
}

/// Work the session schedules for later
#[derive(Debug, Clone, PartialEq)]
pub enum SessionJob {
    Tick,
    CreditLoan(LoanTicket),
}

/// Things that happened while time advanced
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The inactivity countdown ran out and the session was closed
    Expired { username: String },
    /// A deferred loan was credited to the current account
    LoanCredited { amount: f64 },
    /// A deferred loan was dropped because its account is no longer logged in
    LoanDiscarded { amount: f64 },
}

#[derive(Debug, Clone, PartialEq)]
struct LoginBinding {
    username: String,
    account_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    LoggedOut,
    LoggedIn(LoginBinding),
}

/// What the presentation layer renders for the logged-in account
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub account: Account,
    pub balance: f64,
    pub summary: Summary,
    /// In the current display order
    pub movements: Vec<Movement>,
    pub sorted: bool,
    pub seconds_remaining: u64,
}

/// Single-user session over an account directory.
///
/// Owns the directory, the inactivity timer and the scheduler that drives
/// both the timer and deferred loan credits. Time only moves through
/// [`AuthSession::advance`].
pub struct AuthSession {
    directory: AccountDirectory,
    policy: SessionPolicy,
    clock: Box<dyn Clock>,
    scheduler: Scheduler<SessionJob>,
    timer: SessionTimer,
    state: SessionState,
    sorted: bool,
}

impl AuthSession {
    pub fn new(directory: AccountDirectory, policy: SessionPolicy) -> Self {
        Self::with_clock(directory, policy, Box::new(SystemClock))
    }

    pub fn with_clock(directory: AccountDirectory, policy: SessionPolicy, clock: Box<dyn Clock>) -> Self {
        Self {
            directory,
            timer: SessionTimer::new(policy.timeout_secs),
            policy,
            clock,
            scheduler: Scheduler::new(),
            state: SessionState::LoggedOut,
            sorted: false,
        }
    }

    pub fn directory(&self) -> &AccountDirectory {
        &self.directory
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn(_))
    }

    /// Username of the logged-in account
    pub fn current_username(&self) -> Option<&str> {
        match &self.state {
            SessionState::LoggedIn(binding) => Some(binding.username.as_str()),
            SessionState::LoggedOut => None,
        }
    }

    /// Log in as `username`. A failed attempt leaves the session untouched,
    /// including any login already in place.
    pub fn authenticate(&mut self, username: &str, pin: u32) -> Result<(), SessionError> {
        let account = match self.directory.find_by_username(username) {
            Some(account) if account.pin == pin => account,
            _ => {
                debug!("Rejected login attempt for '{}'", username);
                return Err(SessionError::AuthFailure);
            }
        };

        self.state = SessionState::LoggedIn(LoginBinding {
            username: account.username.clone(),
            account_id: account.id,
        });
        self.sorted = false;
        self.reset_timer();

        info!("User '{}' logged in", username);
        Ok(())
    }

    /// Move `amount` from the logged-in account to `to_username`
    pub fn transfer(&mut self, to_username: &str, amount: f64) -> Result<(), SessionError> {
        let sender_username = self.binding()?.username.clone();
        let sender = self
            .directory
            .find_by_username(&sender_username)
            .ok_or(SessionError::NotAuthorized)?;

        if let Err(e) = account::validate_transfer(sender, self.directory.find_by_username(to_username), amount) {
            debug!("Rejected transfer from '{}' to '{}': {}", sender_username, to_username, e);
            return Err(e.into());
        }

        // One instant for both legs
        let now = self.clock.now();
        if let Some(sender) = self.directory.find_by_username_mut(&sender_username) {
            account::append_movement(sender, -amount, now);
        }
        if let Some(receiver) = self.directory.find_by_username_mut(to_username) {
            account::append_movement(receiver, amount, now);
        }
        self.reset_timer();

        info!("Transferred {:.2} from '{}' to '{}'", amount, sender_username, to_username);
        Ok(())
    }

    /// Ask for a loan. Returns the whole amount that will be credited once
    /// the approval delay has passed; nothing is credited now.
    pub fn request_loan(&mut self, amount: f64) -> Result<f64, SessionError> {
        let binding = self.binding()?.clone();
        let account = self
            .directory
            .find_by_username(&binding.username)
            .ok_or(SessionError::NotAuthorized)?;

        let granted = match account::loan_eligibility(account, amount, &self.policy.ledger) {
            Ok(granted) => granted,
            Err(e) => {
                debug!("Rejected loan of {} for '{}': {}", amount, binding.username, e);
                return Err(e.into());
            }
        };

        self.scheduler.schedule_after(
            self.policy.loan_approval_delay,
            SessionJob::CreditLoan(LoanTicket {
                account_id: binding.account_id,
                amount: granted,
            }),
        );

        info!("Loan of {:.0} approved for '{}', crediting after delay", granted, binding.username);
        Ok(granted)
    }

    /// Close the logged-in account after confirming its credentials
    pub fn close_account(&mut self, username: &str, pin: u32) -> Result<(), SessionError> {
        let binding = self.binding()?;
        let confirmed = binding.username == username
            && self
                .directory
                .find_by_username(username)
                .map_or(false, |account| account.pin == pin);

        if !confirmed {
            debug!("Rejected closure confirmation for '{}'", binding.username);
            return Err(SessionError::AuthFailure);
        }

        self.directory.remove(username);
        self.timer.cancel(&mut self.scheduler);
        self.state = SessionState::LoggedOut;
        self.sorted = false;

        info!("Account '{}' closed", username);
        Ok(())
    }

    /// Flip between chronological and ascending-amount display order
    pub fn toggle_sorted_view(&mut self) -> Result<Vec<Movement>, SessionError> {
        let username = self.binding()?.username.clone();
        self.sorted = !self.sorted;
        self.reset_timer();

        let account = self
            .directory
            .find_by_username(&username)
            .ok_or(SessionError::NotAuthorized)?;
        Ok(self.display_order(account))
    }

    /// Derived view of the logged-in account, `None` while logged out
    pub fn current_state(&self) -> Option<SessionSnapshot> {
        let account = self.current_account().ok()?;

        Some(SessionSnapshot {
            balance: account::balance(account),
            summary: account::summary(account, &self.policy.ledger),
            movements: self.display_order(account),
            sorted: self.sorted,
            seconds_remaining: self.timer.remaining(),
            account: account.clone(),
        })
    }

    /// Let `elapsed` pass, running timer ticks and deferred credits in order
    pub fn advance(&mut self, elapsed: Duration) -> Vec<SessionEvent> {
        let deadline = self.scheduler.now().saturating_add(elapsed);
        let mut events = Vec::new();

        while let Some(job) = self.scheduler.pop_due(deadline) {
            if let Some(event) = self.run_job(job) {
                events.push(event);
            }
        }
        self.scheduler.settle(deadline);

        events
    }

    fn run_job(&mut self, job: SessionJob) -> Option<SessionEvent> {
        match job {
            SessionJob::Tick => match self.timer.tick(&mut self.scheduler) {
                TimerTick::Expired => self.expire_session(),
                TimerTick::Running(_) | TimerTick::Idle => None,
            },
            SessionJob::CreditLoan(ticket) => {
                let amount = ticket.amount;
                match self.credit_loan(ticket) {
                    Ok(()) => Some(SessionEvent::LoanCredited { amount }),
                    Err(e) => {
                        debug!("Discarding loan of {:.0}: {}", amount, e);
                        Some(SessionEvent::LoanDiscarded { amount })
                    }
                }
            }
        }
    }

    fn credit_loan(&mut self, ticket: LoanTicket) -> Result<(), SessionError> {
        let username = match &self.state {
            SessionState::LoggedIn(binding) if binding.account_id == ticket.account_id => {
                binding.username.clone()
            }
            _ => return Err(SessionError::StaleEffect),
        };

        let now = self.clock.now();
        let account = self
            .directory
            .find_by_username_mut(&username)
            .filter(|account| account.id == ticket.account_id)
            .ok_or(SessionError::StaleEffect)?;
        account::append_movement(account, ticket.amount, now);
        self.reset_timer();

        info!("Loan of {:.0} credited to '{}'", ticket.amount, username);
        Ok(())
    }

    fn expire_session(&mut self) -> Option<SessionEvent> {
        let previous = std::mem::replace(&mut self.state, SessionState::LoggedOut);
        self.sorted = false;

        match previous {
            SessionState::LoggedIn(binding) => {
                info!("Session for '{}' expired after inactivity", binding.username);
                Some(SessionEvent::Expired {
                    username: binding.username,
                })
            }
            SessionState::LoggedOut => None,
        }
    }

    fn reset_timer(&mut self) {
        self.timer.reset(&mut self.scheduler, SessionJob::Tick);
    }

    fn binding(&self) -> Result<&LoginBinding, SessionError> {
        match &self.state {
            SessionState::LoggedIn(binding) => Ok(binding),
            SessionState::LoggedOut => Err(SessionError::NotAuthorized),
        }
    }

    fn current_account(&self) -> Result<&Account, SessionError> {
        let binding = self.binding()?;
        self.directory
            .find_by_username(&binding.username)
            .ok_or(SessionError::NotAuthorized)
    }

    fn display_order(&self, account: &Account) -> Vec<Movement> {
        if self.sorted {
            account::sorted_view(account)
        } else {
            account.movements.clone()
        }
    }
}
