//! Shared helpers for command handlers.

use std::fmt::Write as _;
use std::io::IsTerminal;

use gvm_gmp::Params;

use crate::cli::ListArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to prompt on, the action is refused instead.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Attributes for a `get_*` query from the shared list flags.
pub fn list_params(list: &ListArgs) -> Params {
    let mut params = Params::new();
    if let Some(ref filter) = list.filter {
        params.insert("filter".into(), filter.clone());
    }
    params
}

/// Aligned `key: value` lines for single-entity detail views.
pub fn detail_lines(fields: &[(&str, String)]) -> String {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in fields {
        let _ = writeln!(out, "{key:<width$}  {value}");
    }
    out.truncate(out.trim_end().len());
    out
}

/// Print a status line to stderr unless `--quiet`.
pub fn notice(quiet: bool, message: &str) {
    if !quiet {
        eprintln!("{message}");
    }
}
