//! Device command handlers.

use std::time::Duration;

use serde::Serialize;
use tabled::Tabled;

use nikoly_core::{Classifier, Controller, Device, DeviceKind, Setting, Snapshot};

use crate::cli::{AfterWrite, DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Views ───────────────────────────────────────────────────────────

/// A device plus everything derived from it, for output.
#[derive(Serialize)]
struct DeviceView {
    id: i64,
    name: String,
    kind: DeviceKind,
    state: String,
    value: i64,
    #[serde(rename = "type")]
    action_type: i64,
    location: i64,
    location_name: String,
}

impl DeviceView {
    fn new(device: &Device, classifier: &Classifier, snapshot: &Snapshot) -> Self {
        Self {
            id: device.id,
            name: device.name.clone(),
            kind: classifier.classify(device),
            state: classifier.state_text(device),
            value: device.value,
            action_type: device.action_type,
            location: device.location,
            location_name: snapshot
                .location(device.location)
                .map(nikoly_core::Location::display_name)
                .unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Location")]
    location: String,
}

fn row(v: &DeviceView) -> DeviceRow {
    DeviceRow {
        id: v.id,
        name: v.name.clone(),
        kind: v.kind.to_string(),
        state: v.state.clone(),
        location: if v.location_name.is_empty() {
            v.location.to_string()
        } else {
            v.location_name.clone()
        },
    }
}

fn detail(v: &DeviceView, color: bool) -> String {
    output::key_values(&[
        ("ID", v.id.to_string()),
        ("Name", v.name.clone()),
        ("Kind", v.kind.to_string()),
        ("State", output::paint_state(&v.state, color)),
        ("Value", v.value.to_string()),
        ("Type", v.action_type.to_string()),
        ("Location", format!("{} ({})", v.location_name, v.location)),
    ])
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::refresh(controller, global).await?;

    match args.command {
        DevicesCommand::List { location } => {
            let devices = match location {
                Some(id) => controller.devices_in(id),
                None => controller.devices(),
            };
            let classifier = controller.classifier().await;
            let snapshot = controller.snapshot();
            let views: Vec<DeviceView> = devices
                .iter()
                .map(|d| DeviceView::new(d, &classifier, &snapshot))
                .collect();

            let out = output::render_list(&global.output, &views, row, |v| v.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { id } => show(controller, id, global).await,

        DevicesCommand::On { id, after } => {
            write(controller, id, Setting::On, &after, global).await
        }
        DevicesCommand::Off { id, after } => {
            write(controller, id, Setting::Off, &after, global).await
        }
        DevicesCommand::Dim { id, percent, after } => {
            write(controller, id, Setting::Brightness(percent), &after, global).await
        }
        DevicesCommand::Set { id, value, after } => {
            write(controller, id, Setting::Raw(value), &after, global).await
        }
    }
}

async fn show(controller: &Controller, id: i64, global: &GlobalOpts) -> Result<(), CliError> {
    let device = controller.device(id)?;
    let classifier = controller.classifier().await;
    let view = DeviceView::new(&device, &classifier, &controller.snapshot());

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, color),
        |v| v.state.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Apply a setting, then (unless told not to) give the controller a
/// moment to settle and show the device as it now reports itself.
async fn write(
    controller: &Controller,
    id: i64,
    setting: Setting,
    after: &AfterWrite,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let device = controller.device(id)?;
    let value = controller.apply(&device, setting).await?;
    output::status(
        global,
        &format!("{} → {setting} (value1={value})", device.name),
    );

    if after.no_refresh {
        return Ok(());
    }
    tokio::time::sleep(Duration::from_millis(after.refresh_delay_ms)).await;
    util::refresh(controller, global).await?;
    show(controller, id, global).await
}
