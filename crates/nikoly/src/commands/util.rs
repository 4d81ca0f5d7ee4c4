//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};

use nikoly_core::Controller;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Refresh the controller cache, with a spinner on interactive stderr.
pub async fn refresh(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let spinner = spinner(global, "Reading controller state");
    let result = controller.refresh().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    Ok(result?)
}

fn spinner(global: &GlobalOpts, message: &'static str) -> Option<ProgressBar> {
    if global.quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new_spinner().with_message(message);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractive {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Parse a `KEY=VALUE` field. The value is read as JSON when it parses,
/// otherwise it is kept as a string.
pub fn parse_field(raw: &str) -> Result<(String, Value), CliError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "field".into(),
        reason: format!("expected KEY=VALUE, got '{raw}'"),
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::Validation {
            field: "field".into(),
            reason: format!("empty key in '{raw}'"),
        });
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

/// Merge `--json` and `--field` arguments into one map; fields win.
pub fn collect_fields(json: Option<&str>, fields: &[String]) -> Result<Map<String, Value>, CliError> {
    let mut map = match json {
        Some(raw) => match serde_json::from_str::<Value>(raw)? {
            Value::Object(map) => map,
            other => {
                return Err(CliError::Validation {
                    field: "json".into(),
                    reason: format!("expected a JSON object, got {other}"),
                });
            }
        },
        None => Map::new(),
    };
    for raw in fields {
        let (key, value) = parse_field(raw)?;
        map.insert(key, value);
    }
    Ok(map)
}
