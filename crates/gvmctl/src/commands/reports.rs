//! Report command handlers.

use gvm_gmp::{GmpClient, Report};
use tabled::Tabled;

use crate::cli::{GlobalOpts, ReportsArgs, ReportsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Task")]
    task: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ReportRow {
    fn new(r: &Report, color: bool) -> Self {
        Self {
            id: r.id.clone(),
            task: r
                .task_name
                .clone()
                .or_else(|| r.task_id.clone())
                .unwrap_or_default(),
            timestamp: r.timestamp.clone().unwrap_or_default(),
            status: r
                .scan_run_status
                .as_deref()
                .map(|s| output::paint_status(s, color))
                .unwrap_or_default(),
        }
    }
}

pub fn handle(
    client: &mut GmpClient,
    args: ReportsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ReportsCommand::List(list) => {
            let reports = client.report_get_all(&util::list_params(&list))?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &reports,
                |r| ReportRow::new(r, color),
                |r| r.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ReportsCommand::Get { id, format, out } => {
            let body = client.report_get_byid(&id, &format)?;
            output::write_payload(&body, out.as_deref())?;
            if let Some(path) = out {
                util::notice(
                    global.quiet,
                    &format!("Wrote {} bytes to {}", body.len(), path.display()),
                );
            }
            Ok(())
        }
    }
}
