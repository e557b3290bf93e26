//! Target command handlers.

use gvm_gmp::{GmpClient, Target, params};
use tabled::Tabled;

use crate::cli::{GlobalOpts, TargetsArgs, TargetsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TargetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Hosts")]
    hosts: String,
    #[tabled(rename = "Max hosts")]
    max_hosts: u32,
    #[tabled(rename = "In use")]
    in_use: String,
}

impl From<&Target> for TargetRow {
    fn from(t: &Target) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            hosts: t.hosts.clone(),
            max_hosts: t.max_hosts,
            in_use: if t.in_use { "yes" } else { "no" }.into(),
        }
    }
}

fn detail(t: &Target) -> String {
    util::detail_lines(&[
        ("ID", t.id.clone()),
        ("Name", t.name.clone()),
        ("Comment", t.comment.clone()),
        ("Hosts", t.hosts.clone()),
        ("Max hosts", t.max_hosts.to_string()),
        ("In use", t.in_use.to_string()),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    client: &mut GmpClient,
    args: TargetsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TargetsCommand::List(list) => {
            let targets = client.target_get_all(&util::list_params(&list))?;
            let out = output::render_list(
                &global.output,
                &targets,
                |t| TargetRow::from(t),
                |t| t.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TargetsCommand::Get { id } => {
            let target = client.target_get_byid(&id)?.ok_or_else(|| CliError::NotFound {
                resource_type: "target".into(),
                identifier: id.clone(),
                list_command: "targets list".into(),
            })?;
            let out = output::render_single(&global.output, &target, detail, |t| t.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TargetsCommand::Create {
            name,
            hosts,
            comment,
        } => {
            let mut fields = params([("name", name.as_str()), ("hosts", hosts.as_str())]);
            if let Some(comment) = comment {
                fields.insert("comment".into(), comment);
            }
            let id = client.target_create(&fields)?;
            output::print_output(&id, global.quiet);
            util::notice(global.quiet, &format!("Target '{name}' created"));
            Ok(())
        }

        TargetsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete target {id}?"), "targets delete", global.yes)? {
                return Ok(());
            }
            client.target_delete(&id)?;
            util::notice(global.quiet, "Target deleted");
            Ok(())
        }
    }
}
