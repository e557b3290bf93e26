//! Command dispatch: bridges CLI args -> GMP client calls -> output formatting.

pub mod config_cmd;
pub mod configs;
pub mod raw;
pub mod reports;
pub mod results;
pub mod scan;
pub mod targets;
pub mod tasks;
pub mod util;
pub mod version;

use gvm_gmp::GmpClient;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Whether `cmd` must authenticate before it runs.
pub fn needs_login(cmd: &Command) -> bool {
    !matches!(cmd, Command::Version | Command::Raw { no_auth: true, .. })
}

/// Dispatch a gvmd-bound command to the appropriate handler.
pub fn dispatch(cmd: Command, client: &mut GmpClient, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Version => version::handle(client, global),
        Command::Targets(args) => targets::handle(client, args, global),
        Command::Tasks(args) => tasks::handle(client, args, global),
        Command::Configs(args) => configs::handle(client, args, global),
        Command::Reports(args) => reports::handle(client, args, global),
        Command::Results(args) => results::handle(client, args, global),
        Command::Raw { xml, .. } => raw::handle(client, &xml, global),
        Command::Scan(args) => scan::handle(client, &args, global),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
