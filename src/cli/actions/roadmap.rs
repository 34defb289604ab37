use crate::api::auth;
use crate::cli::{actions::prompt, commands::roadmap::Login, globals::GlobalArgs};
use crate::roadmap::{self, Half, NewRoadmapItem, RoadmapItem, RoadmapPatch, arrange};
use anyhow::{Context, Result};
use std::fmt;
use tracing::info;

#[derive(Debug)]
pub enum Command {
    List { admin: bool },
    Create(NewRoadmapItem),
    Update { id: i64, patch: RoadmapPatch },
    Delete { id: i64 },
}

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub login: Option<Login>,
    pub command: Command,
}

/// Writes the grid one row per line, cells in display order.
fn write_grid(out: &mut impl fmt::Write, items: &[RoadmapItem]) -> fmt::Result {
    for ((half, row), cells) in arrange(items) {
        let period = match half {
            Half::Top => "Jan-Jun",
            Half::Bottom => "Jul-Dec",
        };
        writeln!(out, "{half} ({period}) row {row}")?;
        for cell in cells {
            let last = cell.col_start + cell.col_span - 1;
            writeln!(
                out,
                "  #{:<4} cols {}-{}  {}  [{} on {}]",
                cell.id, cell.col_start, last, cell.label, cell.text_color, cell.bg_color
            )?;
        }
    }
    Ok(())
}

fn render(items: &[RoadmapItem]) -> Result<String> {
    let mut out = String::new();
    write_grid(&mut out, items).context("failed to render roadmap")?;
    Ok(out)
}

/// Execute the roadmap action.
/// # Errors
/// Returns an error if login fails, validation fails, or the server rejects the call.
pub async fn execute(args: Args) -> Result<()> {
    let client = args.globals.client()?;

    if let Some(login) = args.login {
        let password = match login.password {
            Some(password) => password,
            None => prompt::secret(format!("Password for {}: ", login.email)).await?,
        };
        auth::login(&client, &login.email, &password)
            .await
            .context("login failed")?;
        info!("logged in");
    }

    match args.command {
        Command::List { admin } => {
            let items = if admin {
                roadmap::list_admin(&client).await
            } else {
                roadmap::list(&client).await
            }
            .context("failed to list roadmap items")?;

            if items.is_empty() {
                println!("No roadmap items.");
            } else {
                print!("{}", render(&items)?);
            }
        }
        Command::Create(item) => {
            let created = roadmap::create(&client, &item)
                .await
                .context("failed to create roadmap item")?;
            println!("Created roadmap item #{}.", created.id);
        }
        Command::Update { id, patch } => {
            let updated = roadmap::update(&client, id, &patch)
                .await
                .with_context(|| format!("failed to update roadmap item #{id}"))?;
            println!("Updated roadmap item #{}: {}", updated.id, updated.label);
        }
        Command::Delete { id } => {
            roadmap::delete(&client, id)
                .await
                .with_context(|| format!("failed to delete roadmap item #{id}"))?;
            println!("Deleted roadmap item #{id}.");
        }
    }

    Ok(())
}
