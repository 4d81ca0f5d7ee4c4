//! Clap derive structures for the `nikoly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// nikoly -- command-line control for Niko Home Control
#[derive(Debug, Parser)]
#[command(
    name = "nikoly",
    version,
    about = "Control Niko Home Control installations from the command line",
    long_about = "A CLI for Niko Home Control controllers.\n\n\
        Talks to the controller's line-delimited JSON interface over TCP\n\
        (port 8000 by default) to list locations, read device state, and\n\
        switch or dim actions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "NIKOLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller address (overrides profile)
    #[arg(long, short = 'a', env = "NIKOLY_ADDRESS", global = true)]
    pub address: Option<String>,

    /// Controller port (overrides profile)
    #[arg(long, env = "NIKOLY_PORT", global = true)]
    pub port: Option<u16>,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NIKOLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NIKOLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List rooms and zones
    #[command(alias = "loc")]
    Locations(LocationsArgs),

    /// Inspect and control actions (lights, sockets, dimmers)
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Controller information
    #[command(alias = "sys")]
    System(SystemArgs),

    /// Send an arbitrary controller command
    Raw(RawArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOCATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LocationsArgs {
    #[command(subcommand)]
    pub command: LocationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LocationsCommand {
    /// List locations
    #[command(alias = "ls")]
    List,

    /// Show one location and its devices
    Get {
        /// Location ID
        id: i64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List {
        /// Only devices in this location
        #[arg(long, short = 'l', value_name = "ID")]
        location: Option<i64>,
    },

    /// Show one device
    Get {
        /// Action ID
        id: i64,
    },

    /// Switch a device on (dimmers go to 100%)
    On {
        /// Action ID
        id: i64,

        #[command(flatten)]
        after: AfterWrite,
    },

    /// Switch a device off
    Off {
        /// Action ID
        id: i64,

        #[command(flatten)]
        after: AfterWrite,
    },

    /// Set a dimmer's brightness
    Dim {
        /// Action ID
        id: i64,

        /// Brightness in percent (0-100)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percent: u8,

        #[command(flatten)]
        after: AfterWrite,
    },

    /// Send a raw value1 to a device
    Set {
        /// Action ID
        id: i64,

        /// Value to send as-is
        #[arg(allow_negative_numbers = true)]
        value: i64,

        #[command(flatten)]
        after: AfterWrite,
    },
}

/// What to do once a write has been accepted.
#[derive(Debug, Args)]
pub struct AfterWrite {
    /// Wait this long before re-reading state
    #[arg(long, default_value = "400", value_name = "MS")]
    pub refresh_delay_ms: u64,

    /// Don't re-read state after the write
    #[arg(long)]
    pub no_refresh: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SYSTEM
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SystemArgs {
    #[command(subcommand)]
    pub command: SystemCommand,
}

#[derive(Debug, Subcommand)]
pub enum SystemCommand {
    /// Controller system information
    Info,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RAW
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RawArgs {
    /// Command name (e.g. "listactions")
    pub cmd: String,

    /// Extra top-level field; VALUE is parsed as JSON, else taken as a string
    #[arg(long = "field", short = 'f', value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// Extra top-level fields as one JSON object
    #[arg(long, value_name = "OBJECT")]
    pub json: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create a config file (prompts for anything not given)
    Init {
        /// Profile name
        #[arg(long)]
        name: Option<String>,

        /// Controller address
        #[arg(long = "controller", value_name = "ADDRESS")]
        controller: Option<String>,
    },

    /// Display current configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// One of: address, port, timeout, socket_keyword
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
