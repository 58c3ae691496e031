use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::models::{AccountSeed, Movement};

/// On-disk shape of a seed file
#[derive(Debug, Serialize, Deserialize)]
pub struct SeedFile {
    pub accounts: Vec<AccountSeed>,
}

/// Load a seed list from a TOML or JSON file
pub fn load_seed_file(path: &str) -> Result<Vec<AccountSeed>> {
    let contents = fs::read_to_string(Path::new(path))
        .context(format!("Failed to read seed file: {}", path))?;

    let seed: SeedFile = match path.ends_with(".toml") {
        true => toml::from_str(&contents).context("Failed to parse TOML seed file")?,
        false => serde_json::from_str(&contents).context("Failed to parse JSON seed file")?,
    };

    Ok(seed.accounts)
}

fn movements(entries: &[(f64, &str)]) -> Result<Vec<Movement>> {
    entries
        .iter()
        .map(|(amount, date)| -> Result<Movement> {
            let timestamp = DateTime::parse_from_rfc3339(date)
                .context(format!("Invalid seed timestamp: {}", date))?
                .with_timezone(&Utc);
            Ok(Movement::new(*amount, timestamp))
        })
        .collect()
}

/// The demo directory the application starts with
pub fn demo_accounts() -> Result<Vec<AccountSeed>> {
    Ok(vec![
        AccountSeed {
            owner: "Jonas Schmedtmann".to_string(),
            pin: 1111,
            interest_rate: 1.2,
            currency: "EUR".to_string(),
            locale: "pt-PT".to_string(),
            movements: movements(&[
                (200.0, "2019-11-18T21:31:17.178Z"),
                (455.23, "2019-12-23T07:42:02.383Z"),
                (-306.5, "2020-01-28T09:15:04.904Z"),
                (25000.0, "2020-04-01T10:17:24.185Z"),
                (-642.21, "2020-05-08T14:11:59.604Z"),
                (-133.9, "2021-02-01T17:01:17.194Z"),
                (79.97, "2021-02-02T18:36:17.929Z"),
                (1300.0, "2021-02-03T10:51:36.790Z"),
            ])?,
        },
        AccountSeed {
            owner: "Jessica Davis".to_string(),
            pin: 2222,
            interest_rate: 1.5,
            currency: "USD".to_string(),
            locale: "en-US".to_string(),
            movements: movements(&[
                (5000.0, "2019-11-01T13:15:33.035Z"),
                (3400.0, "2019-11-30T09:48:16.867Z"),
                (-150.0, "2019-12-25T06:04:23.907Z"),
                (-790.0, "2020-01-25T14:18:46.235Z"),
                (-3210.0, "2020-02-05T16:33:06.386Z"),
                (-1000.0, "2020-04-10T14:43:26.374Z"),
                (8500.0, "2020-06-25T18:49:59.371Z"),
                (-30.0, "2020-07-26T12:01:20.894Z"),
            ])?,
        },
    ])
}
