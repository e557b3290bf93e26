//! Protocol version query.

use gvm_gmp::GmpClient;
use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct VersionInfo {
    gmp: String,
    socket: String,
}

pub fn handle(client: &mut GmpClient, global: &GlobalOpts) -> Result<(), CliError> {
    let info = VersionInfo {
        gmp: client.version_get()?,
        socket: client.socket_path().display().to_string(),
    };
    let out = output::render_single(
        &global.output,
        &info,
        |i| format!("GMP {} at {}", i.gmp, i.socket),
        |i| i.gmp.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
