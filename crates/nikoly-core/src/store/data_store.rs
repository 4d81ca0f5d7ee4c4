// ── Central snapshot store ──
//
// Holds the result of the last successful refresh. Readers get an
// `Arc<Snapshot>` without locking; a refresh builds a complete new
// snapshot and swaps it in as a whole, so readers never see devices
// from one refresh next to locations from another.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::model::{Device, Location};

/// Everything one refresh produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub system_info: Map<String, Value>,
    pub devices: Vec<Device>,
    /// All locations, the reserved one included.
    pub locations: Vec<Location>,
    /// `None` until the first successful refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn device(&self, id: i64) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn location(&self, id: i64) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Devices whose location is `location_id`, in controller order.
    pub fn devices_in(&self, location_id: i64) -> Vec<Device> {
        self.devices
            .iter()
            .filter(|d| d.location == location_id)
            .cloned()
            .collect()
    }

    /// Locations meant for users: the reserved id 0 is left out.
    pub fn user_locations(&self) -> Vec<Location> {
        self.locations
            .iter()
            .filter(|l| !l.is_reserved())
            .cloned()
            .collect()
    }
}

/// Atomic holder for the current [`Snapshot`].
pub struct DataStore {
    current: ArcSwap<Snapshot>,
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Snapshot::default()),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replace the whole snapshot at once.
    pub fn replace(&self, snapshot: Snapshot) {
        self.current.store(Arc::new(snapshot));
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.current.load().refreshed_at
    }

    pub fn device_count(&self) -> usize {
        self.current.load().devices.len()
    }

    pub fn location_count(&self) -> usize {
        self.current.load().locations.len()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
