//! Raw command handler: send anything, print what comes back.

use nikoly_core::Controller;

use crate::cli::{GlobalOpts, RawArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    controller: &Controller,
    args: RawArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let fields = util::collect_fields(args.json.as_deref(), &args.fields)?;
    tracing::debug!(cmd = %args.cmd, fields = fields.len(), "sending raw command");

    let response = controller.raw_command(&args.cmd, fields).await?;
    let body = response.to_value();

    let out = output::render_single(
        &global.output,
        &body,
        |v| serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
        |v| v.get("data").map(ToString::to_string).unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
