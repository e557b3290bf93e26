//! Task command handlers.

use gvm_gmp::{Document, GmpClient, Task, params};
use tabled::Tabled;

use crate::cli::{GlobalOpts, TasksArgs, TasksCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Last report")]
    last_report: String,
}

impl TaskRow {
    fn new(t: &Task, color: bool) -> Self {
        Self {
            id: t.id.clone(),
            name: t.name.clone(),
            status: output::paint_status(&t.status, color),
            progress: format_progress(t.progress),
            last_report: t.last_report_id.clone().unwrap_or_default(),
        }
    }
}

fn format_progress(progress: i32) -> String {
    if progress < 0 {
        "-".into()
    } else {
        format!("{progress}%")
    }
}

fn detail(t: &Task) -> String {
    util::detail_lines(&[
        ("ID", t.id.clone()),
        ("Name", t.name.clone()),
        ("Comment", t.comment.clone()),
        ("Status", t.status.clone()),
        ("Progress", format_progress(t.progress)),
        ("First report", t.first_report_id.clone().unwrap_or_default()),
        ("Last report", t.last_report_id.clone().unwrap_or_default()),
    ])
}

fn not_found(id: &str) -> CliError {
    CliError::NotFound {
        resource_type: "task".into(),
        identifier: id.into(),
        list_command: "tasks list".into(),
    }
}

/// Report id announced by `<start_task_response>` or its resume sibling.
fn started_report(doc: &Document, verb: &str) -> Option<String> {
    doc.find(&format!("{verb}_response/report_id"))
        .and_then(|n| n.text())
        .map(|s| s.trim().to_owned())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(client: &mut GmpClient, args: TasksArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        TasksCommand::List(list) => {
            let tasks = client.task_get_all(&util::list_params(&list))?;
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &tasks,
                |t| TaskRow::new(t, color),
                |t| t.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TasksCommand::Get { id } => {
            let task = client.task_get_byid(&id)?.ok_or_else(|| not_found(&id))?;
            let out = output::render_single(&global.output, &task, detail, |t| t.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TasksCommand::Create {
            name,
            target,
            config,
            comment,
            scanner,
            schedule,
            alert,
        } => {
            let mut fields = params([
                ("name", name.as_str()),
                ("target", target.as_str()),
                ("config", config.as_str()),
            ]);
            let optional = [
                ("comment", comment),
                ("scanner", scanner),
                ("schedule", schedule),
                ("alert", alert),
            ];
            for (key, value) in optional.into_iter().filter_map(|(k, v)| v.map(|v| (k, v))) {
                fields.insert(key.into(), value);
            }
            let id = client.task_create(fields)?;
            output::print_output(&id, global.quiet);
            util::notice(global.quiet, &format!("Task '{name}' created"));
            Ok(())
        }

        TasksCommand::Delete { id } => {
            if !util::confirm(&format!("Delete task {id}?"), "tasks delete", global.yes)? {
                return Ok(());
            }
            client.task_delete(&id)?;
            util::notice(global.quiet, "Task deleted");
            Ok(())
        }

        TasksCommand::Start { id } => {
            let doc = client.task_start(&id)?;
            if let Some(report) = started_report(&doc, "start_task") {
                output::print_output(&report, global.quiet);
            }
            util::notice(global.quiet, "Task started");
            Ok(())
        }

        TasksCommand::Stop { id } => {
            client.task_stop(&id)?;
            util::notice(global.quiet, "Task stopped");
            Ok(())
        }

        TasksCommand::Pause { id } => {
            client.task_pause(&id)?;
            util::notice(global.quiet, "Task paused");
            Ok(())
        }

        TasksCommand::Resume { id } => {
            let doc = client.task_resume_or_start(&id)?;
            if let Some(report) = started_report(&doc, "resume_or_start_task") {
                output::print_output(&report, global.quiet);
            }
            util::notice(global.quiet, "Task resumed");
            Ok(())
        }

        TasksCommand::Progress { id } => {
            let progress = client.task_progress(&id)?;
            let out = output::render_single(
                &global.output,
                &progress,
                |p| format_progress(*p),
                i32::to_string,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn inactive_progress_renders_as_dash() {
        assert_eq!(format_progress(-1), "-");
        assert_eq!(format_progress(42), "42%");
    }

    #[test]
    fn start_response_yields_report_id() {
        let doc = Document::parse(
            br#"<authenticate_response status="200"/><start_task_response status="202"><report_id> r-7 </report_id></start_task_response>"#,
        )
        .unwrap();
        assert_eq!(started_report(&doc, "start_task").as_deref(), Some("r-7"));
        assert_eq!(started_report(&doc, "resume_or_start_task"), None);
    }
}
