// Terminal front end
// Reads raw commands, hands them to the session and renders the result.

pub mod format;
pub mod shell;
pub mod utils;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::account;
use crate::config::Config;
use crate::directory::seed::{demo_accounts, load_seed_file};
use crate::directory::AccountDirectory;
use crate::session::{AuthSession, SessionPolicy};

use format::format_currency;
use shell::Shell;
use utils::print_header;

/// Build the account directory from the configured seed, or the demo accounts
pub fn load_directory(config: &Config) -> Result<AccountDirectory> {
    let seeds = match &config.seed.path {
        Some(path) => {
            info!("Loading accounts from {}", path);
            load_seed_file(path)?
        }
        None => demo_accounts()?,
    };

    if seeds.is_empty() {
        warn!("Seed list is empty, nobody will be able to log in");
    }

    AccountDirectory::from_seeds(seeds).context("Failed to populate account directory")
}

/// Print every account with its username
pub fn list_accounts(config: &Config) -> Result<()> {
    let directory = load_directory(config)?;

    print_header("Accounts");
    for account in directory.iter() {
        println!(
            "  {:<6} {:<28} {:>18}",
            account.username,
            account.owner,
            format_currency(account::balance(account), &account.locale, &account.currency)
        );
    }

    Ok(())
}

/// Start the interactive shell
pub fn run_shell(config: &Config) -> Result<()> {
    let directory = load_directory(config)?;
    let session = AuthSession::new(directory, SessionPolicy::from(config));

    Shell::new(session, config.ui.clone()).run()
}
