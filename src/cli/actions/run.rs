use crate::cli::actions::{Action, reset, roadmap};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::ResetPassword(args) => reset::execute(args).await,
        Action::Roadmap(args) => roadmap::execute(args).await,
    }
}
