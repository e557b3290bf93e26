//! CLI configuration: a thin wrapper around `gvm_gmp_config`.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` overrides (--socket, --username, --password, ...).

use secrecy::SecretString;

use gvm_gmp::ClientConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use gvm_gmp_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// Verbosity from which GMP payloads are logged.
const PAYLOAD_VERBOSITY: u8 = 3;

/// Client debug level that enables payload logging.
const PAYLOAD_DEBUG: u8 = 4;

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names, for diagnostics.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build a `ClientConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over the profile. Without a matching profile the defaults
/// apply, unless `--profile` named one explicitly. With `login` unset no
/// password is resolved and the client does not authenticate.
pub fn build_client_config(global: &GlobalOpts, login: bool) -> Result<ClientConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                available: available_profiles(&cfg),
                name: profile_name,
            });
        }
        None => Profile::default(),
    };
    apply_overrides(&mut profile, global);

    let password = if !login {
        SecretString::from(String::new())
    } else if let Some(ref pw) = global.password {
        SecretString::from(pw.clone())
    } else {
        gvm_gmp_config::resolve_password(&profile, &profile_name)?
    };

    let mut client = gvm_gmp_config::client_config(&profile, &cfg.defaults, password)?;
    client.auto_login = login;
    if global.verbose >= PAYLOAD_VERBOSITY {
        client.debug = client.debug.max(PAYLOAD_DEBUG);
    }

    tracing::debug!(
        profile = %profile_name,
        socket = %client.socket_path.display(),
        user = %client.credentials.username,
        "resolved client config"
    );
    Ok(client)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref socket) = global.socket {
        profile.socket = Some(socket.clone());
    }
    if let Some(ref username) = global.username {
        profile.username.clone_from(username);
    }
    if let Some(bufsize) = global.bufsize {
        profile.bufsize = Some(bufsize);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(humantime::format_duration(timeout).to_string());
    }
}
