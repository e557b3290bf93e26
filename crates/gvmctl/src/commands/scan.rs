//! One-shot scan: look up the config, create target and task, start it,
//! wait for `Done`, then fetch the last report.

use std::time::{Duration, Instant};

use gvm_gmp::{GmpClient, Task, params};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{GlobalOpts, ScanArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub fn handle(client: &mut GmpClient, args: &ScanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let name = args.name.clone().unwrap_or_else(|| args.hosts.clone());

    let config_id = client
        .config_id_by_name(&args.config_name)?
        .ok_or_else(|| CliError::NotFound {
            resource_type: "config".into(),
            identifier: args.config_name.clone(),
            list_command: "configs list".into(),
        })?;

    let target_id = client.target_create(&params([
        ("name", name.as_str()),
        ("hosts", args.hosts.as_str()),
        ("comment", "created by gvmctl scan"),
    ]))?;
    tracing::info!(%target_id, "target created");

    let task_id = client.task_create(params([
        ("name", name.as_str()),
        ("comment", "created by gvmctl scan"),
        ("target", target_id.as_str()),
        ("config", config_id.as_str()),
    ]))?;
    tracing::info!(%task_id, "task created");

    client.task_start(&task_id)?;
    util::notice(global.quiet, &format!("Scanning {} (task {task_id})", args.hosts));

    let task = wait_for_done(client, &task_id, args, global.quiet)?;

    let report_id = task.last_report_id.ok_or_else(|| CliError::NotFound {
        resource_type: "report".into(),
        identifier: format!("last report of task {task_id}"),
        list_command: "reports list".into(),
    })?;
    let body = client.report_get_byid(&report_id, &args.format)?;
    output::write_payload(&body, args.out.as_deref())?;

    if let Some(ref path) = args.out {
        util::notice(
            global.quiet,
            &format!("Report {report_id} written to {}", path.display()),
        );
    }
    Ok(())
}

/// Poll the task every `interval` until gvmd reports it `Done`.
fn wait_for_done(
    client: &mut GmpClient,
    task_id: &str,
    args: &ScanArgs,
    quiet: bool,
) -> Result<Task, CliError> {
    let bar = progress_bar(quiet);
    let started = Instant::now();

    loop {
        let task = client
            .task_get_byid(task_id)?
            .ok_or_else(|| CliError::NotFound {
                resource_type: "task".into(),
                identifier: task_id.into(),
                list_command: "tasks list".into(),
            })?;

        if let Ok(position) = u64::try_from(task.progress) {
            bar.set_position(position);
        }
        bar.set_message(task.status.clone());
        tracing::debug!(status = %task.status, progress = task.progress, "polled task");

        if task.is_done() {
            bar.finish_with_message("Done");
            return Ok(task);
        }

        if let Some(limit) = args.max_wait {
            if started.elapsed() >= limit {
                bar.abandon_with_message(task.status);
                return Err(CliError::Timeout {
                    task_id: task_id.into(),
                    waited: humantime::format_duration(round_secs(started.elapsed())).to_string(),
                });
            }
        }

        std::thread::sleep(args.interval);
    }
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos:>3}% {msg}")
    {
        bar.set_style(style);
    }
    bar
}

fn round_secs(d: Duration) -> Duration {
    Duration::from_secs(d.as_secs())
}
