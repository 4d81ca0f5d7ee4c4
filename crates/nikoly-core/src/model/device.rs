// ── Device domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::config::DEFAULT_SOCKET_KEYWORD;
use crate::error::CoreError;

/// Controller type code for binary (on/off) actions.
pub const TYPE_BINARY: i64 = 1;
/// Controller type code for dimmable actions.
pub const TYPE_DIMMER: i64 = 2;

/// Wire value for "on" on a binary action.
pub const BINARY_ON: i64 = 255;
/// Wire value for full brightness on a dimmer.
pub const DIMMER_MAX: i64 = 100;

/// A controllable action as last reported by the controller.
///
/// Immutable: every successful refresh produces fresh values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    /// The controller's `type` code.
    pub action_type: i64,
    /// Id of the owning location.
    pub location: i64,
    /// Primary value (`value1`): 0/255 for binary actions, 0-100 for dimmers.
    pub value: i64,
}

/// What a device is, as far as presentation and control go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    #[strum(serialize = "Dimmable")]
    Dimmer,
    Socket,
    Switch,
    Other,
}

// ── Classification ───────────────────────────────────────────────────

/// Classifies devices by type code and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    socket_keyword: String,
}

impl Classifier {
    pub fn new(socket_keyword: impl Into<String>) -> Self {
        Self {
            socket_keyword: socket_keyword.into().to_lowercase(),
        }
    }

    pub fn socket_keyword(&self) -> &str {
        &self.socket_keyword
    }

    pub fn is_dimmable(&self, device: &Device) -> bool {
        device.action_type == TYPE_DIMMER
    }

    /// A binary action whose name contains the socket keyword.
    pub fn is_socket(&self, device: &Device) -> bool {
        device.action_type == TYPE_BINARY
            && !self.socket_keyword.is_empty()
            && device.name.to_lowercase().contains(&self.socket_keyword)
    }

    pub fn is_switch(&self, device: &Device) -> bool {
        device.action_type == TYPE_BINARY && !self.is_socket(device)
    }

    pub fn classify(&self, device: &Device) -> DeviceKind {
        if self.is_dimmable(device) {
            DeviceKind::Dimmer
        } else if self.is_socket(device) {
            DeviceKind::Socket
        } else if self.is_switch(device) {
            DeviceKind::Switch
        } else {
            DeviceKind::Other
        }
    }

    /// Human-readable state, derived from the current value.
    pub fn state_text(&self, device: &Device) -> String {
        match self.classify(device) {
            DeviceKind::Dimmer => format!("{}%", device.value),
            DeviceKind::Socket | DeviceKind::Switch => {
                if device.value == 0 { "OFF" } else { "ON" }.to_owned()
            }
            DeviceKind::Other => device.value.to_string(),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_SOCKET_KEYWORD)
    }
}

// ── Settings ─────────────────────────────────────────────────────────

/// A user-level intent for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    On,
    Off,
    /// Percentage; anything above 100 is clamped.
    Brightness(u8),
    /// Sent as-is.
    Raw(i64),
}

impl Setting {
    /// The `value1` to send for a device of `kind`.
    pub fn wire_value(self, kind: DeviceKind) -> Result<i64, CoreError> {
        match (self, kind) {
            (Self::Raw(value), _) => Ok(value),
            (Self::Off, _) => Ok(0),
            (Self::On, DeviceKind::Dimmer) => Ok(DIMMER_MAX),
            (Self::On, _) => Ok(BINARY_ON),
            (Self::Brightness(percent), DeviceKind::Dimmer) => {
                Ok(i64::from(percent).min(DIMMER_MAX))
            }
            (Self::Brightness(_), _) => Err(CoreError::InvalidSetting {
                setting: self.to_string(),
                kind: kind.to_string(),
            }),
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Brightness(percent) => write!(f, "brightness {percent}%"),
            Self::Raw(value) => write!(f, "value {value}"),
        }
    }
}
