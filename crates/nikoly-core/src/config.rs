// ── Runtime connection configuration ──
//
// Describes *where* the controller lives and how devices are classified.
// Never touches disk: the CLI builds a `ControllerConfig` from its
// profile and hands it in.

use std::time::Duration;

use nikoly_api::Endpoint;
pub use nikoly_api::{DEFAULT_PORT, DEFAULT_TIMEOUT};

use crate::model::Classifier;

/// Name fragment that marks a binary action as a wall socket.
pub const DEFAULT_SOCKET_KEYWORD: &str = "stopcontact";

/// Configuration for talking to a single controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Host name or IP address of the controller.
    pub address: String,
    pub port: u16,
    /// Bound for connect, write and each read.
    pub timeout: Duration,
    /// Case-insensitive name fragment identifying sockets.
    pub socket_keyword: String,
}

impl ControllerConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.address.clone())
            .with_port(self.port)
            .with_timeout(self.timeout)
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.socket_keyword.clone())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            address: "192.168.1.10".into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            socket_keyword: DEFAULT_SOCKET_KEYWORD.into(),
        }
    }
}
