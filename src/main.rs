use clap::{Parser, Subcommand};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};
use std::process;

use bankist::{cli, config};

/// Bankist - a terminal banking demo with an inactivity-timed session
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Sets the configuration file
    #[clap(short, long, value_name = "FILE", default_value = "config.toml")]
    config: String,

    /// Turn debugging information on
    #[clap(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive banking session
    Shell {},

    /// List the accounts in the directory
    Accounts {},

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[clap(long)]
        force: bool,
    },
}

fn main() {
    dotenv().ok();

    let args = Cli::parse();

    let log_level = match args.debug {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    if let Commands::InitConfig { force } = &args.command {
        if std::path::Path::new(&args.config).exists() && !force {
            error!("{} already exists, use --force to overwrite it", args.config);
            process::exit(1);
        }
        if let Err(e) = config::save_config(&args.config, &config::Config::default()) {
            error!("Failed to write configuration: {:#}", e);
            process::exit(1);
        }
        info!("Default configuration written to {}", args.config);
        return;
    }

    if let Err(e) = config::load_config(&args.config) {
        error!("Failed to load configuration: {:#}", e);
        process::exit(1);
    }
    let config = config::get_config();

    let result = match &args.command {
        Commands::Shell {} => cli::run_shell(&config),
        Commands::Accounts {} => cli::list_accounts(&config),
        Commands::InitConfig { .. } => Ok(()),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}
