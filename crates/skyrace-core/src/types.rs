//! Fundamental identifiers and geometric types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// World-space position in meters. `y` is up (altitude), `x`/`z` are horizontal.
pub type Position = glam::DVec3;

/// Seconds on the host's monotonic clock.
pub type Timestamp = f64;

/// Stable player identity (account id), independent of connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// Opaque handle to the vehicle a player is piloting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleHandle(pub u64);

/// Short identifier of a fly-through zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VehicleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vehicle#{}", self.0)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Seconds elapsed since `since`, clamped at zero so a clock that steps
/// backwards never yields a negative duration.
pub fn elapsed(now: Timestamp, since: Timestamp) -> f64 {
    (now - since).max(0.0)
}
