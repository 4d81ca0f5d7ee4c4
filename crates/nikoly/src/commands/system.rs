//! System command handlers.

use chrono::Local;
use serde_json::Value;

use nikoly_core::Controller;

use crate::cli::{GlobalOpts, SystemArgs, SystemCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    controller: &Controller,
    args: SystemArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SystemCommand::Info => {
            util::refresh(controller, global).await?;
            let info = controller.system_info();
            let snapshot = controller.snapshot();
            let config = controller.config().await;

            let out = output::render_single(
                &global.output,
                &info,
                |info| {
                    let mut pairs: Vec<(&str, String)> = info
                        .iter()
                        .map(|(k, v)| (k.as_str(), scalar(v)))
                        .collect();
                    pairs.push(("controller", config.endpoint().to_string()));
                    pairs.push(("devices", snapshot.devices.len().to_string()));
                    pairs.push(("locations", snapshot.user_locations().len().to_string()));
                    if let Some(at) = snapshot.refreshed_at {
                        pairs.push((
                            "refreshed",
                            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
                        ));
                    }
                    output::key_values(&pairs)
                },
                |info| {
                    info.iter()
                        .map(|(k, v)| format!("{k}={}", scalar(v)))
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Strings without quotes, everything else as compact JSON.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
