pub mod logging;
pub mod roadmap;

use crate::{api::client::DEFAULT_BASE_URL, reset::DEFAULT_EMAIL_DOMAIN};
use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_BASE_URL: &str = "base-url";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_EMAIL_DOMAIN: &str = "email-domain";
pub const ARG_EMAIL: &str = "email";

pub const CMD_RESET_PASSWORD: &str = "reset-password";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("recruit")
        .about("Recruiting site client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_BASE_URL)
                .short('u')
                .long(ARG_BASE_URL)
                .help("Base URL of the site API")
                .env("RECRUIT_BASE_URL")
                .default_value(DEFAULT_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .short('t')
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env("RECRUIT_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..))
                .global(true),
        )
        .arg(
            Arg::new(ARG_EMAIL_DOMAIN)
                .long(ARG_EMAIL_DOMAIN)
                .help("Institutional email domain accepted by the password reset")
                .env("RECRUIT_EMAIL_DOMAIN")
                .default_value(DEFAULT_EMAIL_DOMAIN)
                .global(true),
        )
        .subcommand(
            Command::new(CMD_RESET_PASSWORD)
                .about("Reset a forgotten password with an emailed code")
                .arg(
                    Arg::new(ARG_EMAIL)
                        .short('e')
                        .long(ARG_EMAIL)
                        .help("School email address (prompted for when unset)"),
                ),
        )
        .subcommand(roadmap::subcommand());

    logging::with_args(command)
}
