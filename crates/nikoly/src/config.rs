//! CLI configuration: thin wrapper around `nikoly_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--address, --port, --timeout).

use std::time::Duration;

use nikoly_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use nikoly_config::{
    Config, Profile, config_path, load_config, save_config, validate_address,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Comma-separated profile names, for error help text.
pub fn available_profiles(config: &Config) -> String {
    if config.profiles.is_empty() {
        "(none)".into()
    } else {
        config.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Build a `ControllerConfig` from the config file, profile, and flags.
///
/// Flags win over the profile. Without a matching profile, `--address`
/// alone is enough; an explicitly requested profile must exist.
pub fn build_controller_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<ControllerConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let profile = match (cfg.profiles.get(&profile_name), &global.address) {
        (Some(profile), _) => profile.clone(),
        (None, Some(address)) => Profile::new(address.clone()),
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    let mut controller = nikoly_config::profile_to_controller_config(&profile, &cfg.defaults)?;

    if let Some(ref address) = global.address {
        validate_address(address)?;
        controller.address = address.trim().to_owned();
    }
    if let Some(port) = global.port {
        controller.port = port;
    }
    if let Some(timeout) = global.timeout {
        controller.timeout = Duration::from_secs(timeout);
    }

    Ok(controller)
}
