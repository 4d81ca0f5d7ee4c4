// nikoly-core: Domain model and session facade between nikoly-api and the CLI.

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ControllerConfig;
pub use controller::Controller;
pub use error::CoreError;
pub use store::{DataStore, Snapshot};

pub use model::{Classifier, Device, DeviceKind, Location, Setting};
