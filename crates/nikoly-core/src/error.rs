// ── Core error types ──
//
// User-facing errors from nikoly-core. Consumers never match on raw
// socket errors or JSON parse failures; the `From<nikoly_api::Error>`
// impl translates wire-level failures into domain variants.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },

    #[error("Controller did not answer within {timeout:?}")]
    Timeout { timeout: Duration },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("Controller rejected '{command}' with error {code}: {message}")]
    Controller {
        code: i64,
        command: String,
        message: String,
    },

    #[error("Unreadable controller response: {message}")]
    MalformedResponse { message: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found: {id}")]
    DeviceNotFound { id: i64 },

    #[error("Location not found: {id}")]
    LocationNotFound { id: i64 },

    #[error("{setting} does not apply to a {kind} device")]
    InvalidSetting { setting: String, kind: String },
}

// ── Conversion from wire-level errors ────────────────────────────────

impl From<nikoly_api::Error> for CoreError {
    fn from(err: nikoly_api::Error) -> Self {
        match err {
            nikoly_api::Error::InvalidRequest { reason } => CoreError::InvalidRequest { reason },
            nikoly_api::Error::Timeout { timeout } => CoreError::Timeout { timeout },
            nikoly_api::Error::Transport { address, source } => CoreError::ConnectionFailed {
                address,
                reason: source.to_string(),
            },
            nikoly_api::Error::MalformedResponse { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
            nikoly_api::Error::Protocol {
                code,
                command,
                message,
            } => CoreError::Controller {
                code,
                command,
                message,
            },
        }
    }
}

impl CoreError {
    /// The controller's numeric code, for protocol errors.
    pub fn controller_code(&self) -> Option<i64> {
        match self {
            Self::Controller { code, .. } => Some(*code),
            _ => None,
        }
    }
}
