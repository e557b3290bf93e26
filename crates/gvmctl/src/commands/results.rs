//! Result queries. gvmd's result records are printed as returned.

use gvm_gmp::GmpClient;

use crate::cli::{GlobalOpts, ResultsArgs, ResultsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(
    client: &mut GmpClient,
    args: ResultsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ResultsCommand::Raw { list, task } => {
            let mut params = util::list_params(&list);
            if let Some(task) = task {
                params.insert("task_id".into(), task);
            }
            let doc = client.result_get_raw(&params)?;
            output::print_output(&doc.to_xml(), global.quiet);
            Ok(())
        }
    }
}
