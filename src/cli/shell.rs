use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use std::time::{Duration, Instant};

use crate::cli::format::{format_currency, format_date, format_movement_date, format_timer};
use crate::cli::utils::{display_spinner, print_error, print_header, print_info, print_success, read_line};
use crate::config::UiConfig;
use crate::session::{AuthSession, SessionError, SessionEvent, SessionSnapshot};

/// A line typed at the shell prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { username: String, pin: Option<u32> },
    Transfer { to: String, amount: f64 },
    Loan { amount: f64 },
    Close { username: String, pin: Option<u32> },
    Sort,
    Show,
    Wait { seconds: u64 },
    Help,
    Quit,
    Unknown(String),
}

/// Raw amount text the way the browser form read it: anything unparseable
/// becomes NaN and is left to the session to reject.
fn parse_amount(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.parse::<f64>().ok()).unwrap_or(f64::NAN)
}

/// Pins are whole numbers; `1111.0` reads the same as `1111`
fn parse_pin(raw: Option<&str>) -> Option<u32> {
    let value = raw?;
    if let Ok(pin) = value.parse::<u32>() {
        return Some(pin);
    }

    let number = value.parse::<f64>().ok()?;
    if number.is_finite() && number.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&number) {
        Some(number as u32)
    } else {
        None
    }
}

/// Split a prompt line into a command
pub fn parse_command(line: &str) -> Command {
    let mut words = line.split_whitespace();
    let name = match words.next() {
        Some(name) => name.to_lowercase(),
        None => return Command::Show,
    };
    let mut next = || words.next();

    match name.as_str() {
        "login" => Command::Login {
            username: next().unwrap_or_default().to_string(),
            pin: parse_pin(next()),
        },
        "transfer" => Command::Transfer {
            to: next().unwrap_or_default().to_string(),
            amount: parse_amount(next()),
        },
        "loan" => Command::Loan {
            amount: parse_amount(next()),
        },
        "close" => Command::Close {
            username: next().unwrap_or_default().to_string(),
            pin: parse_pin(next()),
        },
        "sort" => Command::Sort,
        "show" => Command::Show,
        "wait" => Command::Wait {
            seconds: next().and_then(|value| value.parse().ok()).unwrap_or(1),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

fn print_help() {
    print_header("Commands");
    println!("  login <username> <pin>     Log in");
    println!("  transfer <username> <amt>  Transfer money to another account");
    println!("  loan <amount>              Request a loan");
    println!("  close <username> <pin>     Close the logged-in account");
    println!("  sort                       Toggle sorting movements by amount");
    println!("  show                       Show the account again");
    println!("  wait <seconds>             Let time pass");
    println!("  help                       Show this help");
    println!("  quit                       Leave the shell");
}

/// Render the logged-in account
pub fn render_account(snapshot: &SessionSnapshot) {
    let account = &snapshot.account;
    let money = |amount: f64| format_currency(amount, &account.locale, &account.currency);
    let now = Utc::now();

    print_header(&format!("Welcome back, {}", account.first_name()));
    println!("As of {}", format_date(&now, &account.locale));
    println!("Current balance: {}", money(snapshot.balance));
    println!();

    // Newest first, numbered in display order
    for (index, movement) in snapshot.movements.iter().enumerate().rev() {
        println!(
            "  {:>3} {:<10} {:<26} {:>16}",
            index + 1,
            movement.movement_type().as_str().to_uppercase(),
            format_movement_date(&movement.timestamp, &now, &account.locale),
            money(movement.amount)
        );
    }

    println!();
    println!(
        "In {}   Out {}   Interest {}   {}",
        money(snapshot.summary.total_in),
        money(snapshot.summary.total_out),
        money(snapshot.summary.total_interest),
        if snapshot.sorted { "[sorted]" } else { "" }
    );
    println!("You will be logged out in {}", format_timer(snapshot.seconds_remaining));
}

fn render_logged_out() {
    println!("Log in to get started");
}

/// Interactive session loop over a populated session
pub struct Shell {
    session: AuthSession,
    ui: UiConfig,
    last_input: Instant,
}

impl Shell {
    pub fn new(session: AuthSession, ui: UiConfig) -> Self {
        Self {
            session,
            ui,
            last_input: Instant::now(),
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Read and execute commands until `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        print_header("Bankist");
        render_logged_out();
        print_info("Type 'help' for commands");

        loop {
            let prompt = match self.session.current_username() {
                Some(username) => format!("{}> ", username),
                None => "> ".to_string(),
            };
            let line = match read_line(&prompt)? {
                Some(line) => line,
                None => break,
            };

            let elapsed = self.last_input.elapsed();
            self.last_input = Instant::now();
            self.catch_up(elapsed);

            if !self.execute(parse_command(&line))? {
                break;
            }
        }

        info!("Shell closed");
        Ok(())
    }

    /// Let `elapsed` pass on the session and report what happened
    pub fn catch_up(&mut self, elapsed: Duration) {
        for event in self.session.advance(elapsed) {
            match event {
                SessionEvent::Expired { .. } => {
                    print_info("You were logged out after inactivity");
                    render_logged_out();
                }
                SessionEvent::LoanCredited { amount } => {
                    if let Some(snapshot) = self.session.current_state() {
                        let account = &snapshot.account;
                        print_success(&format!(
                            "Loan of {} credited",
                            format_currency(amount, &account.locale, &account.currency)
                        ));
                    }
                }
                SessionEvent::LoanDiscarded { .. } => {}
            }
        }
    }

    /// Run one command. Returns false when the shell should stop.
    pub fn execute(&mut self, command: Command) -> Result<bool> {
        let outcome = match command {
            Command::Login { username, pin } => match pin {
                Some(pin) => self.session.authenticate(&username, pin),
                None => Err(SessionError::AuthFailure),
            },
            Command::Transfer { to, amount } => self.session.transfer(&to, amount),
            Command::Loan { amount } => self.session.request_loan(amount).map(|_| ()),
            Command::Close { username, pin } => match pin {
                Some(pin) => self.session.close_account(&username, pin),
                None if self.session.is_logged_in() => Err(SessionError::AuthFailure),
                None => Err(SessionError::NotAuthorized),
            },
            Command::Sort => self.session.toggle_sorted_view().map(|_| ()),
            Command::Show => Ok(()),
            Command::Wait { seconds } => {
                let wait = Duration::from_secs(seconds);
                display_spinner("Waiting", wait)?;
                self.last_input = Instant::now();
                self.catch_up(wait);
                Ok(())
            }
            Command::Help => {
                print_help();
                return Ok(true);
            }
            Command::Quit => return Ok(false),
            Command::Unknown(name) => {
                print_error(&format!("Unknown command '{}', type 'help'", name));
                return Ok(true);
            }
        };

        match outcome {
            Ok(()) => match self.session.current_state() {
                Some(snapshot) => render_account(&snapshot),
                None => render_logged_out(),
            },
            Err(e) => {
                debug!("Command rejected: {}", e);
                if !self.ui.silent_failures {
                    print_error(&e.to_string());
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::seed::demo_accounts;
    use crate::directory::AccountDirectory;
    use crate::session::SessionPolicy;
    use test_case::test_case;

    #[test_case("login js 1111", Command::Login { username: "js".into(), pin: Some(1111) } ; "login")]
    #[test_case("LOGIN js abc", Command::Login { username: "js".into(), pin: None } ; "login bad pin")]
    #[test_case("login js 1111.0", Command::Login { username: "js".into(), pin: Some(1111) } ; "login integral decimal pin")]
    #[test_case("login js 1111.5", Command::Login { username: "js".into(), pin: None } ; "login fractional pin")]
    #[test_case("login js -1", Command::Login { username: "js".into(), pin: None } ; "login negative pin")]
    #[test_case("close jd 2222", Command::Close { username: "jd".into(), pin: Some(2222) } ; "close")]
    #[test_case("sort", Command::Sort ; "sort")]
    #[test_case("", Command::Show ; "empty line")]
    #[test_case("wait", Command::Wait { seconds: 1 } ; "wait default")]
    #[test_case("quit", Command::Quit ; "quit")]
    #[test_case("dance", Command::Unknown("dance".into()) ; "unknown")]
    fn test_parse_command(line: &str, expected: Command) {
        assert_eq!(parse_command(line), expected);
    }

    #[test]
    fn test_parse_amounts() {
        assert_eq!(
            parse_command("transfer jd 100.5"),
            Command::Transfer { to: "jd".into(), amount: 100.5 }
        );
        match parse_command("loan lots") {
            Command::Loan { amount } => assert!(amount.is_nan()),
            other => panic!("unexpected command {:?}", other),
        }
    }

    fn shell() -> Shell {
        let directory = AccountDirectory::from_seeds(demo_accounts().unwrap()).unwrap();
        let session = AuthSession::new(directory, SessionPolicy::default());
        Shell::new(session, UiConfig { silent_failures: true })
    }

    #[test]
    fn test_execute_drives_session() {
        let mut shell = shell();

        assert!(shell.execute(parse_command("login js 1111")).unwrap());
        assert_eq!(shell.session().current_username(), Some("js"));

        assert!(shell.execute(parse_command("transfer jd 100")).unwrap());
        let receiver = shell.session().directory().find_by_username("jd").unwrap();
        assert_eq!(receiver.movements.last().unwrap().amount, 100.0);

        assert!(shell.execute(parse_command("close js 1111")).unwrap());
        assert!(!shell.session().is_logged_in());
        assert!(!shell.execute(parse_command("quit")).unwrap());
    }

    #[test]
    fn test_rejected_commands_keep_shell_running() {
        let mut shell = shell();

        assert!(shell.execute(parse_command("transfer jd 100")).unwrap());
        assert!(shell.execute(parse_command("login js nope")).unwrap());
        assert!(!shell.session().is_logged_in());
    }

    #[test]
    fn test_catch_up_credits_loan() {
        let mut shell = shell();
        shell.execute(parse_command("login jd 2222")).unwrap();
        shell.execute(parse_command("loan 1000")).unwrap();

        shell.catch_up(Duration::from_secs(3));
        let account = shell.session().directory().find_by_username("jd").unwrap();
        assert_eq!(account.movements.last().unwrap().amount, 1000.0);
    }
}
