// ── Snapshot store ──
//
// Lock-free storage for the last successful refresh.

mod data_store;

pub use data_store::{DataStore, Snapshot};
