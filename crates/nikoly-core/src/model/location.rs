// ── Location domain type ──

use serde::{Deserialize, Serialize};

/// Id the controller uses for its synthetic catch-all location.
pub const RESERVED_LOCATION_ID: i64 = 0;

/// A room or zone grouping actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    /// May be empty; see [`Location::display_name`].
    pub name: String,
}

impl Location {
    /// The synthetic location is never shown to users.
    pub fn is_reserved(&self) -> bool {
        self.id == RESERVED_LOCATION_ID
    }

    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Location {}", self.id)
        } else {
            self.name.clone()
        }
    }
}
