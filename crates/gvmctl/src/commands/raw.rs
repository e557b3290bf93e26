//! Raw GMP passthrough.

use gvm_gmp::GmpClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub fn handle(client: &mut GmpClient, xml: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let response = client.request_raw(xml)?;
    output::print_output(response.trim_end(), global.quiet);
    Ok(())
}
