// nikoly-api: Async Rust client for the Niko Home Control JSON-over-TCP protocol

pub mod client;
pub mod codec;
pub mod error;
pub mod models;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::NikoClient;
pub use codec::{Data, Request, Response};
pub use error::Error;
pub use models::{ActionRecord, ActionValue, LocationRecord};
pub use transport::{DEFAULT_PORT, DEFAULT_TIMEOUT, Endpoint};
