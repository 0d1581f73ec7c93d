//! Command dispatch: bridges CLI args -> core engine -> output formatting.

pub mod check;
pub mod config_cmd;
pub mod discover;
pub mod important;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an engine-bound command to the appropriate handler.
pub async fn dispatch(cmd: &Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Discover(args) => discover::handle(args, global),
        Command::Check(args) => check::handle(args, global),
        Command::Watch(args) => watch::handle(args, global).await,
        Command::Important(args) => important::handle(args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        // Completions are handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}
