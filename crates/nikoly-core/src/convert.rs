// ── Wire-to-domain conversions ──
//
// Bridges `nikoly_api` wire records into `nikoly_core::model` types.
// The wire records are already lenient, so these are total.

use nikoly_api::{ActionRecord, LocationRecord};

use crate::model::{Device, Location};

impl From<ActionRecord> for Device {
    fn from(record: ActionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            action_type: record.action_type,
            location: record.location,
            value: record.value1,
        }
    }
}

impl From<LocationRecord> for Location {
    fn from(record: LocationRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
        }
    }
}
