//! Location command handlers.

use serde::Serialize;
use tabled::Tabled;

use nikoly_core::{Controller, Device, Location};

use crate::cli::{GlobalOpts, LocationsArgs, LocationsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LocationRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Devices")]
    devices: usize,
}

/// A location with the devices placed in it.
#[derive(Serialize)]
struct LocationDetail {
    id: i64,
    name: String,
    devices: Vec<Device>,
}

fn detail(l: &LocationDetail) -> String {
    let devices = if l.devices.is_empty() {
        "-".to_owned()
    } else {
        l.devices
            .iter()
            .map(|d| format!("{} ({})", d.name, d.id))
            .collect::<Vec<_>>()
            .join(", ")
    };
    output::key_values(&[
        ("ID", l.id.to_string()),
        ("Name", l.name.clone()),
        ("Devices", devices),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: LocationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LocationsCommand::List => {
            util::refresh(controller, global).await?;
            let snapshot = controller.snapshot();
            let locations = controller.locations();

            let out = output::render_list(
                &global.output,
                &locations,
                |l: &Location| LocationRow {
                    id: l.id,
                    name: l.display_name(),
                    devices: snapshot.devices.iter().filter(|d| d.location == l.id).count(),
                },
                |l| l.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LocationsCommand::Get { id } => {
            util::refresh(controller, global).await?;
            let location = controller.location(id)?;
            let view = LocationDetail {
                id: location.id,
                name: location.display_name(),
                devices: controller.devices_in(id),
            };

            let out = output::render_single(&global.output, &view, detail, |l| l.name.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
