//! Terminal prompts. Reads run on the blocking pool so the countdown keeps
//! ticking while the user types.

use anyhow::{Context, Result, bail};
use rpassword::read_password;
use secrecy::SecretString;
use std::io::{self, BufRead, Write};

fn flush_prompt(prompt: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()
}

fn read_line_blocking(prompt: &str) -> Result<String> {
    flush_prompt(prompt).context("Failed to write prompt")?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    if read == 0 {
        bail!("input closed");
    }
    Ok(line.trim().to_string())
}

fn read_secret_blocking(prompt: &str) -> Result<SecretString> {
    flush_prompt(prompt).context("Failed to write prompt")?;
    let value = read_password().context("Failed to read password")?;
    Ok(SecretString::from(value))
}

/// Prompts for one trimmed line of input.
///
/// # Errors
/// Returns an error if stdin is closed or unreadable.
pub async fn line(prompt: String) -> Result<String> {
    tokio::task::spawn_blocking(move || read_line_blocking(&prompt))
        .await
        .context("prompt task failed")?
}

/// Prompts for a secret without echoing it.
///
/// # Errors
/// Returns an error if the terminal cannot be read.
pub async fn secret(prompt: String) -> Result<SecretString> {
    tokio::task::spawn_blocking(move || read_secret_blocking(&prompt))
        .await
        .context("prompt task failed")?
}
