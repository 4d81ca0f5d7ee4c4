//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use nikoly_config::ConfigError;
use nikoly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PROTOCOL: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to controller at {address}")]
    #[diagnostic(
        code(nikoly::connection_failed),
        help(
            "Check that the controller is powered and reachable on your network.\n\
             Address: {address}\n\
             Try: nikoly system info --address <ip> --port 8000"
        )
    )]
    ConnectionFailed {
        address: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Controller did not answer within {timeout:?}")]
    #[diagnostic(
        code(nikoly::timeout),
        help("Increase the timeout with --timeout or check the controller's network link.")
    )]
    Timeout { timeout: std::time::Duration },

    // ── Protocol ─────────────────────────────────────────────────────

    #[error("Controller rejected '{command}' (error {code}): {message}")]
    #[diagnostic(code(nikoly::controller_error))]
    Controller {
        code: i64,
        command: String,
        message: String,
    },

    #[error("Unreadable controller response: {message}")]
    #[diagnostic(
        code(nikoly::malformed_response),
        help("Run with -vv to log the exchange. Is something else listening on that port?")
    )]
    MalformedResponse { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(nikoly::not_found),
        help("Run: nikoly {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nikoly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(nikoly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: nikoly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(nikoly::no_config),
        help(
            "Create a profile with: nikoly config init\n\
             Or pass --address / set NIKOLY_ADDRESS.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(nikoly::config))]
    Config(Box<figment::Error>),

    #[error("Failed to write configuration: {0}")]
    #[diagnostic(code(nikoly::config_write))]
    ConfigWrite(#[from] toml::ser::Error),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("'{action}' needs input that was not given on the command line")]
    #[diagnostic(
        code(nikoly::input_required),
        help("Pass the value as a flag when running non-interactively.")
    )]
    NonInteractive { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(nikoly::json))]
    Json(#[from] serde_json::Error),

    #[error("Could not render YAML: {0}")]
    #[diagnostic(code(nikoly::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Controller { .. } | Self::MalformedResponse { .. } => exit_code::PROTOCOL,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractive { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { address, reason } => CliError::ConnectionFailed {
                address,
                source: reason.into(),
            },

            CoreError::Timeout { timeout } => CliError::Timeout { timeout },

            CoreError::Controller {
                code,
                command,
                message,
            } => CliError::Controller {
                code,
                command,
                message,
            },

            CoreError::MalformedResponse { message } => CliError::MalformedResponse { message },

            CoreError::InvalidRequest { reason } => CliError::Validation {
                field: "request".into(),
                reason,
            },

            CoreError::DeviceNotFound { id } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: id.to_string(),
                list_command: "devices list".into(),
            },

            CoreError::LocationNotFound { id } => CliError::NotFound {
                resource_type: "location".into(),
                identifier: id.to_string(),
                list_command: "locations list".into(),
            },

            err @ CoreError::InvalidSetting { .. } => CliError::Validation {
                field: "setting".into(),
                reason: err.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Serialization(e) => CliError::ConfigWrite(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
