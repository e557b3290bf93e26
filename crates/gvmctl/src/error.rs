//! CLI error types with miette diagnostics.
//!
//! Maps `gvm_gmp::Error` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use gvm_gmp_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const PROTOCOL: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to gvmd at {path}")]
    #[diagnostic(
        code(gvmctl::connection_failed),
        help(
            "Check that gvmd is running and that this user may open its socket.\n\
             Socket: {path}\n\
             Override with --socket or `gvmctl config set socket <path>`."
        )
    )]
    ConnectionFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(gvmctl::auth_failed),
        help(
            "Verify the GMP username and password.\n\
             Run: gvmctl config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(gvmctl::no_credentials),
        help(
            "Configure credentials with: gvmctl config init\n\
             Or set the GVMCTL_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(gvmctl::not_found),
        help("Run: gvmctl {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── GMP ──────────────────────────────────────────────────────────

    #[error("gvmd rejected the request ({status}): {message}")]
    #[diagnostic(code(gvmctl::rejected), help("Request: {request}"))]
    Rejected {
        status: String,
        message: String,
        request: String,
    },

    #[error("Malformed response from gvmd: {message}")]
    #[diagnostic(
        code(gvmctl::protocol),
        help("Re-run with -vvv to log the raw GMP exchange.")
    )]
    Protocol { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gvmctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(gvmctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: gvmctl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Could not load configuration: {message}")]
    #[diagnostic(code(gvmctl::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(gvmctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Task {task_id} did not finish within {waited}")]
    #[diagnostic(
        code(gvmctl::timeout),
        help(
            "The scan keeps running in gvmd.\n\
             Check it with: gvmctl tasks progress {task_id}"
        )
    )]
    Timeout { task_id: String, waited: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Protocol { .. } => exit_code::PROTOCOL,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::Config { .. } | Self::Io(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── gvm_gmp::Error → CliError mapping ───────────────────────────────

impl From<gvm_gmp::Error> for CliError {
    fn from(err: gvm_gmp::Error) -> Self {
        match err {
            gvm_gmp::Error::Connection { path, source } => CliError::ConnectionFailed {
                path: path.display().to_string(),
                source: Box::new(source),
            },

            gvm_gmp::Error::Authentication { status, message } => CliError::AuthFailed {
                profile: "current".into(),
                message: format!("{message} (status {status})"),
            },

            gvm_gmp::Error::NotFound { entity, id } => CliError::NotFound {
                resource_type: entity.into(),
                identifier: id,
                list_command: format!("{entity}s list"),
            },

            gvm_gmp::Error::XmlParsing { message, body } => {
                tracing::debug!(%body, "unparseable response");
                CliError::Protocol { message }
            }

            gvm_gmp::Error::Response {
                message,
                request,
                status,
                source,
            } => {
                let message = match source {
                    Some(cause) => format!("{message}: {cause}"),
                    None => message,
                };
                CliError::Rejected {
                    status: status.map_or_else(|| "no status".into(), |s| s.to_string()),
                    message,
                    request: request.unwrap_or_else(|| "(unknown)".into()),
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ──────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn gmp_errors_map_to_exit_codes() {
        let connection = CliError::from(gvm_gmp::Error::Connection {
            path: PathBuf::from("/run/gvmd/gvmd.sock"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(connection.exit_code(), exit_code::CONNECTION);

        let auth = CliError::from(gvm_gmp::Error::Authentication {
            status: 400,
            message: "Authentication failed".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing = CliError::from(gvm_gmp::Error::NotFound {
            entity: "task",
            id: "t-1".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(missing.to_string(), "task 't-1' not found");
    }

    #[test]
    fn response_error_keeps_status_and_request() {
        let err = CliError::from(gvm_gmp::Error::Response {
            message: "start_task failed: Failed to find task".into(),
            request: Some("<start_task task_id=\"x\"/>".into()),
            status: Some(404),
            source: None,
        });

        match err {
            CliError::Rejected {
                status, request, ..
            } => {
                assert_eq!(status, "404");
                assert_eq!(request, "<start_task task_id=\"x\"/>");
            }
            other => panic!("expected Rejected, got: {other:?}"),
        }
    }
}
