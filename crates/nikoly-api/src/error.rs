use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `nikoly-api` crate.
///
/// Covers every failure mode of a single request/response exchange:
/// building the request, the TCP round trip, parsing the reply, and
/// controller-reported failures. `nikoly-core` maps these into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Request ─────────────────────────────────────────────────────
    /// Malformed outgoing command (missing or non-string `cmd`,
    /// non-coercible numeric field). Never worth retrying.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connect, write, or read exceeded the configured bound.
    #[error("Request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// Any other socket-level failure (refused, reset, DNS).
    #[error("Transport error talking to {address}: {source}")]
    Transport {
        address: String,
        #[source]
        source: std::io::Error,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// Bytes received could not be parsed as a UTF-8 JSON object,
    /// with the (lossy) raw body for debugging.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },

    // ── Controller ──────────────────────────────────────────────────
    /// The controller reported a non-zero error code in `data.error`.
    #[error("{message}")]
    Protocol {
        code: i64,
        command: String,
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Build a protocol error, generating the message when the controller
    /// supplied none.
    pub fn protocol(code: i64, command: impl Into<String>, message: Option<String>) -> Self {
        let command = command.into();
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_protocol_message(code, &command));
        Self::Protocol {
            code,
            command,
            message,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// The controller-assigned error code, if this is a protocol error.
    pub fn protocol_code(&self) -> Option<i64> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }
}

fn default_protocol_message(code: i64, command: &str) -> String {
    format!("controller error {code} (cmd={command})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_message_defaults_to_code_and_command() {
        let err = Error::protocol(5, "executeactions", None);
        assert_eq!(err.to_string(), "controller error 5 (cmd=executeactions)");
        assert_eq!(err.protocol_code(), Some(5));
    }

    #[test]
    fn protocol_message_prefers_controller_text() {
        let err = Error::protocol(12, "listactions", Some("busy".into()));
        assert_eq!(err.to_string(), "busy");

        let blank = Error::protocol(12, "listactions", Some("  ".into()));
        assert_eq!(blank.to_string(), "controller error 12 (cmd=listactions)");
    }

    #[test]
    fn timeouts_are_transient_but_protocol_errors_are_not() {
        assert!(Error::Timeout {
            timeout: Duration::from_secs(5)
        }.is_transient());
        assert!(!Error::protocol(1, "systeminfo", None).is_transient());
        assert!(!Error::invalid_request("nope").is_transient());
    }
}
