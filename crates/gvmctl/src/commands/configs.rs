//! Scan config command handlers.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gvm_gmp::{Config, GmpClient};
use tabled::Tabled;

use crate::cli::{ConfigsArgs, ConfigsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

impl From<&Config> for ConfigRow {
    fn from(c: &Config) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            comment: c.comment.clone(),
        }
    }
}

pub fn handle(
    client: &mut GmpClient,
    args: ConfigsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ConfigsCommand::List(list) => {
            let configs = client.config_get_all(&util::list_params(&list))?;
            let out = output::render_list(
                &global.output,
                &configs,
                |c| ConfigRow::from(c),
                |c| c.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigsCommand::Copy { id, name } => {
            let new_id = client.config_copy(&id, &name)?;
            output::print_output(&new_id, global.quiet);
            util::notice(global.quiet, &format!("Config copied as '{name}'"));
            Ok(())
        }

        // gvmd expects the rc file base64-encoded
        ConfigsCommand::Create { name, rcfile } => {
            let contents = std::fs::read(&rcfile)?;
            let new_id = client.config_create(&name, &STANDARD.encode(contents))?;
            output::print_output(&new_id, global.quiet);
            util::notice(global.quiet, &format!("Config '{name}' created"));
            Ok(())
        }
    }
}
