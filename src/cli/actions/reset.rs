//! Interactive password reset wizard.

use crate::cli::{actions::prompt, globals::GlobalArgs};
use crate::reset::{ResetError, ResetWorkflow, Step, countdown::format_mmss};
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: Option<String>,
}

/// What the user typed at the code prompt.
#[derive(Debug, PartialEq, Eq)]
enum VerifyInput {
    Back,
    Code(String),
}

fn parse_verify_input(input: &str) -> VerifyInput {
    match input.trim().to_lowercase().as_str() {
        "b" | "back" => VerifyInput::Back,
        other => VerifyInput::Code(other.to_string()),
    }
}

fn verify_prompt(remaining: u64) -> String {
    if remaining > 0 {
        format!("Code ({} left, b = back): ", format_mmss(remaining))
    } else {
        "Code (expired, b = back for a new code): ".to_string()
    }
}

fn progress(step: Step) -> String {
    Step::ALL
        .iter()
        .map(|s| {
            if *s == step {
                format!("[{s}]")
            } else {
                s.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

fn report(err: &ResetError) {
    debug!(local = err.is_local(), "wizard step did not advance");
    eprintln!("{err}");
}

/// Execute the reset-password action.
/// # Errors
/// Returns an error if the client cannot be built or the terminal closes.
pub async fn execute(args: Args) -> Result<()> {
    let client = Arc::new(args.globals.client()?);
    let workflow = ResetWorkflow::new(client, args.globals.email_policy());
    let mut email = args.email;
    let mut shown = None;

    loop {
        let step = workflow.step();
        if shown != Some(step) {
            println!("{}", progress(step));
            shown = Some(step);
        }

        match step {
            Step::Email => {
                let value = match email.take() {
                    Some(value) => value,
                    None => {
                        prompt::line(format!(
                            "School email (*{}): ",
                            workflow.policy().suffix()
                        ))
                        .await?
                    }
                };
                match workflow.send_code(&value).await {
                    Ok(ttl) => println!(
                        "A verification code was sent. It is valid for {}.",
                        format_mmss(ttl)
                    ),
                    Err(err) => report(&err),
                }
            }
            Step::Verify => {
                let input = prompt::line(verify_prompt(workflow.countdown_remaining())).await?;
                let result = match parse_verify_input(&input) {
                    VerifyInput::Back => workflow.restart(),
                    VerifyInput::Code(code) => workflow.verify_code(&code).await,
                };
                if let Err(err) = result {
                    report(&err);
                }
            }
            Step::Reset => {
                let password = prompt::secret("New password: ".to_string()).await?;
                let confirmation = prompt::secret("Confirm password: ".to_string()).await?;
                if let Err(err) = workflow.reset_password(password, confirmation).await {
                    report(&err);
                }
            }
            Step::Done => {
                println!("Your password was changed. Log in with the new password.");
                return Ok(());
            }
        }
    }
}
