use crate::roadmap::{
    Half,
    types::{DEFAULT_BG_COLOR, DEFAULT_TEXT_COLOR},
};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use secrecy::SecretString;

pub const CMD_ROADMAP: &str = "roadmap";
pub const CMD_LIST: &str = "list";
pub const CMD_CREATE: &str = "create";
pub const CMD_UPDATE: &str = "update";
pub const CMD_DELETE: &str = "delete";

pub const ARG_ADMIN: &str = "admin";
pub const ARG_ID: &str = "id";
pub const ARG_LOGIN_EMAIL: &str = "login-email";
pub const ARG_LOGIN_PASSWORD: &str = "login-password";

pub const ARG_HALF: &str = "half";
pub const ARG_ROW: &str = "row";
pub const ARG_COL_START: &str = "col-start";
pub const ARG_COL_SPAN: &str = "col-span";
pub const ARG_LABEL: &str = "label";
pub const ARG_BG_COLOR: &str = "bg-color";
pub const ARG_TEXT_COLOR: &str = "text-color";
pub const ARG_ORDER: &str = "order";

/// Staff credentials for the admin endpoints.
pub struct Login {
    pub email: String,
    pub password: Option<SecretString>,
}

impl std::fmt::Debug for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Login")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Login {
    /// `None` when no `--login-email` was given.
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Option<Self> {
        let email = matches.get_one::<String>(ARG_LOGIN_EMAIL).cloned()?;
        let password = matches
            .get_one::<String>(ARG_LOGIN_PASSWORD)
            .map(|value| SecretString::from(value.clone()));
        Some(Self { email, password })
    }
}

/// Grid fields given on the command line; unset fields stay `None`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub half: Option<Half>,
    pub row: Option<i32>,
    pub col_start: Option<i32>,
    pub col_span: Option<i32>,
    pub label: Option<String>,
    pub bg_color: Option<String>,
    pub text_color: Option<String>,
    pub order: Option<i32>,
}

impl ItemFields {
    /// # Errors
    /// Returns an error if `--half` is not TOP or BOTTOM.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let half = matches
            .get_one::<String>(ARG_HALF)
            .map(|value| value.parse::<Half>())
            .transpose()
            .map_err(anyhow::Error::msg)
            .context("invalid --half")?;

        Ok(Self {
            half,
            row: matches.get_one::<i32>(ARG_ROW).copied(),
            col_start: matches.get_one::<i32>(ARG_COL_START).copied(),
            col_span: matches.get_one::<i32>(ARG_COL_SPAN).copied(),
            label: matches.get_one::<String>(ARG_LABEL).cloned(),
            bg_color: matches.get_one::<String>(ARG_BG_COLOR).cloned(),
            text_color: matches.get_one::<String>(ARG_TEXT_COLOR).cloned(),
            order: matches.get_one::<i32>(ARG_ORDER).copied(),
        })
    }
}

fn item_args(command: Command, creating: bool) -> Command {
    let int = |name: &'static str, help: &'static str| {
        Arg::new(name)
            .long(name)
            .help(help)
            .allow_negative_numbers(true)
            .value_parser(clap::value_parser!(i32))
    };

    command
        .arg(
            Arg::new(ARG_HALF)
                .long(ARG_HALF)
                .help("Grid half: TOP (January-June) or BOTTOM (July-December)")
                .required(creating),
        )
        .arg(
            Arg::new(ARG_LABEL)
                .long(ARG_LABEL)
                .help("Text shown in the cell")
                .required(creating),
        )
        .arg(int(ARG_ROW, "Row within the half (0 is the main row)"))
        .arg(int(ARG_COL_START, "First column, 1-6"))
        .arg(int(ARG_COL_SPAN, "Number of columns, 1-6"))
        .arg(int(ARG_ORDER, "Sort order within the row"))
        .arg(
            Arg::new(ARG_BG_COLOR)
                .long(ARG_BG_COLOR)
                .help(format!("Background color as #RRGGBB (default {DEFAULT_BG_COLOR})")),
        )
        .arg(
            Arg::new(ARG_TEXT_COLOR)
                .long(ARG_TEXT_COLOR)
                .help(format!("Text color as #RRGGBB (default {DEFAULT_TEXT_COLOR})")),
        )
}

fn id_arg() -> Arg {
    Arg::new(ARG_ID)
        .help("Roadmap item id")
        .required(true)
        .value_parser(clap::value_parser!(i64))
}

#[must_use]
pub fn subcommand() -> Command {
    Command::new(CMD_ROADMAP)
        .about("Read and edit the home page roadmap")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_LOGIN_EMAIL)
                .long(ARG_LOGIN_EMAIL)
                .help("Staff email to log in with before calling admin endpoints")
                .env("RECRUIT_LOGIN_EMAIL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_LOGIN_PASSWORD)
                .long(ARG_LOGIN_PASSWORD)
                .help("Staff password (prompted for when unset)")
                .env("RECRUIT_LOGIN_PASSWORD")
                .hide(true)
                .hide_env_values(true)
                .global(true),
        )
        .subcommand(
            Command::new(CMD_LIST).about("List roadmap items").arg(
                Arg::new(ARG_ADMIN)
                    .long(ARG_ADMIN)
                    .help("Use the admin listing (requires a staff session)")
                    .action(ArgAction::SetTrue),
            ),
        )
        .subcommand(item_args(
            Command::new(CMD_CREATE).about("Create a roadmap item"),
            true,
        ))
        .subcommand(item_args(
            Command::new(CMD_UPDATE)
                .about("Update fields of a roadmap item")
                .arg(id_arg()),
            false,
        ))
        .subcommand(
            Command::new(CMD_DELETE)
                .about("Delete a roadmap item")
                .arg(id_arg()),
        )
}
