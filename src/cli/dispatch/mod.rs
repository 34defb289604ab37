//! Command-line argument dispatch.
//!
//! This module maps validated CLI matches to the action the binary executes,
//! with the shared connection options collected into `GlobalArgs`.

use crate::cli::{
    actions::{Action, reset, roadmap},
    commands::{
        self, ARG_BASE_URL, ARG_EMAIL, ARG_EMAIL_DOMAIN, ARG_TIMEOUT, CMD_RESET_PASSWORD,
        roadmap::{self as roadmap_args, ItemFields, Login},
    },
    globals::GlobalArgs,
};
use crate::roadmap::{NewRoadmapItem, RoadmapPatch};
use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use std::time::Duration;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;

    match matches.subcommand() {
        Some((CMD_RESET_PASSWORD, sub)) => Ok(Action::ResetPassword(reset::Args {
            globals,
            email: sub.get_one::<String>(ARG_EMAIL).cloned(),
        })),
        Some((roadmap_args::CMD_ROADMAP, sub)) => Ok(Action::Roadmap(roadmap::Args {
            globals,
            login: Login::parse(sub),
            command: roadmap_command(sub)?,
        })),
        Some((other, _)) => Err(anyhow!("unknown command: {other}")),
        None => Err(anyhow!("missing command, see --help")),
    }
}

fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let base_url = matches
        .get_one::<String>(ARG_BASE_URL)
        .cloned()
        .context("missing required argument: --base-url")?;

    let mut globals = GlobalArgs::new(base_url);
    if let Some(seconds) = matches.get_one::<u64>(ARG_TIMEOUT).copied() {
        globals.timeout = Duration::from_secs(seconds);
    }
    if let Some(domain) = matches.get_one::<String>(ARG_EMAIL_DOMAIN) {
        globals.email_domain.clone_from(domain);
    }
    Ok(globals)
}

fn roadmap_command(matches: &ArgMatches) -> Result<roadmap::Command> {
    match matches.subcommand() {
        Some((roadmap_args::CMD_LIST, sub)) => Ok(roadmap::Command::List {
            admin: sub.get_flag(roadmap_args::ARG_ADMIN),
        }),
        Some((roadmap_args::CMD_CREATE, sub)) => {
            let fields = ItemFields::parse(sub)?;
            Ok(roadmap::Command::Create(new_item(fields)?))
        }
        Some((roadmap_args::CMD_UPDATE, sub)) => {
            let id = item_id(sub)?;
            let patch = patch(ItemFields::parse(sub)?);
            if patch.is_empty() {
                bail!("nothing to update: pass at least one field");
            }
            Ok(roadmap::Command::Update { id, patch })
        }
        Some((roadmap_args::CMD_DELETE, sub)) => Ok(roadmap::Command::Delete {
            id: item_id(sub)?,
        }),
        _ => Err(anyhow!(
            "missing roadmap command, see {} --help",
            commands::roadmap::CMD_ROADMAP
        )),
    }
}

fn item_id(matches: &ArgMatches) -> Result<i64> {
    matches
        .get_one::<i64>(roadmap_args::ARG_ID)
        .copied()
        .context("missing required argument: <id>")
}

fn new_item(fields: ItemFields) -> Result<NewRoadmapItem> {
    let half = fields.half.context("missing required argument: --half")?;
    let label = fields.label.context("missing required argument: --label")?;

    let mut item = NewRoadmapItem::new(half, &label);
    if let Some(row) = fields.row {
        item.row = row;
    }
    if let Some(col_start) = fields.col_start {
        item.col_start = col_start;
    }
    if let Some(col_span) = fields.col_span {
        item.col_span = col_span;
    }
    if let Some(bg_color) = fields.bg_color {
        item.bg_color = bg_color;
    }
    if let Some(text_color) = fields.text_color {
        item.text_color = text_color;
    }
    if let Some(order) = fields.order {
        item.order = order;
    }
    Ok(item)
}

fn patch(fields: ItemFields) -> RoadmapPatch {
    RoadmapPatch {
        half: fields.half,
        row: fields.row,
        col_start: fields.col_start,
        col_span: fields.col_span,
        label: fields.label,
        bg_color: fields.bg_color,
        text_color: fields.text_color,
        order: fields.order,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::roadmap::Half;
    use secrecy::ExposeSecret;

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = commands::new().try_get_matches_from(args)?;
        handler(&matches)
    }

    #[test]
    fn reset_password_collects_globals() {
        temp_env::with_vars(
            [
                ("RECRUIT_BASE_URL", None::<&str>),
                ("RECRUIT_EMAIL_DOMAIN", Some("example.ac.kr")),
            ],
            || {
                let action = dispatch(&["recruit", "reset-password", "-e", "kim@example.ac.kr"])
                    .unwrap();
                let Action::ResetPassword(args) = action else {
                    panic!("expected reset-password action");
                };
                assert_eq!(args.email.as_deref(), Some("kim@example.ac.kr"));
                assert_eq!(args.globals.base_url, "http://127.0.0.1:8000");
                assert_eq!(args.globals.email_domain, "example.ac.kr");
            },
        );
    }

    #[test]
    fn roadmap_create_fills_form_defaults() {
        temp_env::with_vars(
            [
                ("RECRUIT_LOGIN_EMAIL", None::<&str>),
                ("RECRUIT_LOGIN_PASSWORD", None),
            ],
            || {
                let action = dispatch(&[
                    "recruit", "roadmap", "create", "--half", "bottom", "--label", "Hackathon",
                    "--row", "1",
                ])
                .unwrap();
                let Action::Roadmap(args) = action else {
                    panic!("expected roadmap action");
                };
                let roadmap::Command::Create(item) = args.command else {
                    panic!("expected create");
                };
                assert_eq!(item.half, Half::Bottom);
                assert_eq!(item.label, "Hackathon");
                assert_eq!(item.row, 1);
                assert_eq!(item.col_start, 1);
                assert_eq!(item.bg_color, "#F8F8FC");
                assert!(args.login.is_none());
            },
        );
    }

    #[test]
    fn roadmap_create_rejects_bad_half() {
        let result = dispatch(&[
            "recruit", "roadmap", "create", "--half", "middle", "--label", "Hackathon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn roadmap_update_requires_a_field() {
        assert!(dispatch(&["recruit", "roadmap", "update", "3"]).is_err());

        let action = dispatch(&["recruit", "roadmap", "update", "3", "--order", "2"]).unwrap();
        let Action::Roadmap(args) = action else {
            panic!("expected roadmap action");
        };
        let roadmap::Command::Update { id, patch } = args.command else {
            panic!("expected update");
        };
        assert_eq!(id, 3);
        assert_eq!(patch.order, Some(2));
        assert!(patch.label.is_none());
    }

    #[test]
    fn roadmap_login_reads_password_from_env() {
        temp_env::with_vars(
            [
                ("RECRUIT_LOGIN_EMAIL", Some("staff@sch.ac.kr")),
                ("RECRUIT_LOGIN_PASSWORD", Some("correct horse")),
            ],
            || {
                let action = dispatch(&["recruit", "roadmap", "delete", "5"]).unwrap();
                let Action::Roadmap(args) = action else {
                    panic!("expected roadmap action");
                };
                let login = args.login.unwrap();
                assert_eq!(login.email, "staff@sch.ac.kr");
                assert_eq!(
                    login.password.as_ref().map(|p| p.expose_secret().to_string()),
                    Some("correct horse".to_string())
                );
                assert!(!format!("{login:?}").contains("correct horse"));
            },
        );
    }
}
