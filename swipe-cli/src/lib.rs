//! Command-line interface for the swipe engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod greet;
mod options;
mod presets;
mod run;
mod score;
mod telemetry;

pub use error::CliError;
pub use telemetry::TelemetryError;

use greet::GreetArgs;
use run::RunArgs;
use score::ScoreArgs;

pub(crate) const ARG_SITES: &str = "sites";
pub(crate) const ARG_SITE: &str = "site";
pub(crate) const ARG_WEIGHTS: &str = "weights";
pub(crate) const ARG_ATTRIBUTES: &str = "attributes";
pub(crate) const ARG_PROMPT: &str = "prompt";
pub(crate) const ARG_PROMPT_FILE: &str = "prompt-file";
pub(crate) const ARG_API_KEYS: &str = "api-keys";
pub(crate) const ARG_MODEL: &str = "model";
pub(crate) const ARG_BLACKLIST: &str = "blacklist";
pub(crate) const ARG_HIGH_THRESHOLD: &str = "high-threshold";
pub(crate) const ARG_MID_THRESHOLD: &str = "mid-threshold";
pub(crate) const ARG_P_HIGH: &str = "p-high";
pub(crate) const ARG_P_MID: &str = "p-mid";
pub(crate) const ARG_MAX_SWIPES: &str = "max-swipes";
pub(crate) const ARG_MAX_LIKES: &str = "max-likes";
pub(crate) const ARG_SAFE_DEFAULT: &str = "safe-default";
pub(crate) const ARG_HUMANISE: &str = "humanise";
pub(crate) const ARG_AUDIT_DIR: &str = "audit-dir";
pub(crate) const ARG_PROFILE_POLL_SECS: &str = "profile-poll-secs";
pub(crate) const ARG_READINESS_TIMEOUT_SECS: &str = "readiness-timeout-secs";
pub(crate) const ARG_COOLDOWN_AFTER: &str = "cooldown-after";
pub(crate) const ARG_TEMPLATES: &str = "templates";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_HEADLESS: &str = "headless";
pub(crate) const ARG_USER_DATA_DIR: &str = "user-data-dir";
pub(crate) const ARG_CHROME: &str = "chrome";
pub(crate) const ARG_REMOTE_URL: &str = "remote-url";
pub(crate) const ARG_WINDOW_WIDTH: &str = "window-width";
pub(crate) const ARG_WINDOW_HEIGHT: &str = "window-height";

pub(crate) const ENV_RUN_WEIGHTS: &str = "SWIPE_CMDS_RUN_WEIGHTS";
pub(crate) const ENV_RUN_PROMPT: &str = "SWIPE_CMDS_RUN_PROMPT";
pub(crate) const ENV_RUN_API_KEYS: &str = "SWIPE_CMDS_RUN_API_KEYS";
pub(crate) const ENV_SCORE_WEIGHTS: &str = "SWIPE_CMDS_SCORE_WEIGHTS";
pub(crate) const ENV_SCORE_ATTRIBUTES: &str = "SWIPE_CMDS_SCORE_ATTRIBUTES";
pub(crate) const ENV_GREET_TEMPLATES: &str = "SWIPE_CMDS_GREET_TEMPLATES";

/// Run the swipe CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, logging
/// cannot be initialised, or the selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    telemetry::init(cli.log_level.as_deref())?;
    match cli.command {
        Command::Run(args) => run::run_sessions(args),
        Command::Score(args) => score::run_score(args),
        Command::Greet(args) => greet::run_greet(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "swipe",
    about = "Automated swiping decisions for dating-app web interfaces",
    version
)]
struct Cli {
    /// Log filter directive used when `RUST_LOG` is unset (e.g. "debug").
    #[arg(long = "log-level", value_name = "filter", global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Drive one decision loop per site until each swipe quota is spent.
    Run(RunArgs),
    /// Score an attribute set against the weight table.
    Score(ScoreArgs),
    /// Send a first message to recent matches.
    Greet(GreetArgs),
}

#[cfg(test)]
mod tests;
