use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

/// Print a success line
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print an error line
pub fn print_error(message: &str) {
    println!("❌ {}", message);
}

/// Print an informational line
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}

/// Print a section header
pub fn print_header(title: &str) {
    println!("\n=== {} ===", title);
}

/// Display a message with a spinning indicator while waiting
pub fn display_spinner(message: &str, duration: Duration) -> Result<()> {
    let spinner_chars = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
    let mut stdout = io::stdout();

    for i in 0..((duration.as_millis() / 100) as usize) {
        let spinner_char = spinner_chars[i % spinner_chars.len()];
        print!("\r{} {} ", spinner_char, message);
        stdout.flush()?;
        thread::sleep(Duration::from_millis(100));
    }

    println!("\r✓ {} ", message);
    Ok(())
}

/// Read a line of input from the terminal. Returns `None` at end of input.
pub fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin().lock().read_line(&mut input)?;
    if read == 0 {
        return Ok(None);
    }

    // Trim whitespace and newlines
    Ok(Some(input.trim().to_string()))
}
