//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

const VALID_KEYS: &str = "address, port, timeout, socket_keyword";

// ── Helpers ─────────────────────────────────────────────────────────

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

fn parse_number<T: std::str::FromStr>(field: &str, value: &str, what: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {what}, got '{value}'"),
    })
}

/// Ask for whatever `init` wasn't given on the command line.
fn prompt_missing(
    name: Option<String>,
    controller: Option<String>,
) -> Result<(String, String), CliError> {
    if let (Some(name), Some(controller)) = (&name, &controller) {
        return Ok((name.clone(), controller.clone()));
    }
    if controller.is_none() && !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractive {
            action: "config init without --controller".into(),
        });
    }

    let name = match name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Profile name")
            .default("default".into())
            .interact_text()
            .map_err(prompt_err)?,
    };
    let controller = match controller {
        Some(controller) => controller,
        None => Input::new()
            .with_prompt("Controller address")
            .interact_text()
            .map_err(prompt_err)?,
    };
    Ok((name, controller))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { name, controller } => {
            let config_path = config::config_path();
            let name = name.or_else(|| controller.as_ref().map(|_| "default".to_owned()));
            let (profile_name, address) = prompt_missing(name, controller)?;
            config::validate_address(&address)?;

            let mut cfg = config::load_config()?;
            if cfg.profiles.contains_key(&profile_name)
                && !util::confirm(
                    &format!("Profile '{profile_name}' exists. Overwrite?"),
                    global.yes,
                )?
            {
                return Ok(());
            }

            cfg.profiles
                .insert(profile_name.clone(), Profile::new(address.trim()));
            cfg.default_profile = Some(profile_name.clone());
            save_config(&cfg)?;

            output::status(
                global,
                &format!("Configuration written to {}", config_path.display()),
            );
            if !global.quiet {
                eprintln!("  Active profile: {profile_name}");
                eprintln!("  Test it: nikoly system info");
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let out = match global.output {
                OutputFormat::Table => toml::to_string_pretty(&cfg)?,
                _ => output::render_single(
                    &global.output,
                    &cfg,
                    |_| String::new(),
                    |c| c.default_profile_name().to_owned(),
                )?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config()?;
            let profile_name = config::active_profile_name(global, &cfg);

            if key != "address" && !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }
            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));

            match key.as_str() {
                "address" => {
                    config::validate_address(&value)?;
                    profile.address = value.trim().to_owned();
                }
                "port" => profile.port = Some(parse_number("port", &value, "a port number")?),
                "timeout" => {
                    profile.timeout = Some(parse_number("timeout", &value, "a number (seconds)")?);
                }
                "socket_keyword" | "socket-keyword" => profile.socket_keyword = Some(value),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!("unknown config key '{other}'. Valid keys: {VALID_KEYS}"),
                    });
                }
            }

            save_config(&cfg)?;
            output::status(global, &format!("Set {key} on profile '{profile_name}'"));
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: nikoly config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    name,
                    available: config::available_profiles(&cfg),
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            output::status(global, &format!("Default profile set to '{name}'"));
            Ok(())
        }
    }
}
