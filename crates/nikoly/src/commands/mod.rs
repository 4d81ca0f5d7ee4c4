//! Command dispatch: bridges CLI args -> controller calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod locations;
pub mod raw;
pub mod system;
pub mod util;

use nikoly_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Locations(args) => locations::handle(controller, args, global).await,
        Command::Devices(args) => devices::handle(controller, args, global).await,
        Command::System(args) => system::handle(controller, args, global).await,
        Command::Raw(args) => raw::handle(controller, args, global).await,
        // Handled in main before a controller exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
