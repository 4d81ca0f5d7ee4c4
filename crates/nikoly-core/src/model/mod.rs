// ── Domain model ──
//
// Canonical representations of controller actions and locations, plus
// the rules that classify actions and translate user intents into wire
// values.

pub mod device;
pub mod location;

pub use device::{Classifier, Device, DeviceKind, Setting};
pub use location::Location;
