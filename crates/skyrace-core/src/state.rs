//! Flight snapshot: the live view of one session, for flight-info displays.

use serde::{Deserialize, Serialize};

use crate::enums::{LocationKind, StreakPhase};
use crate::types::{PlayerId, Position};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightSnapshot {
    pub player: Option<PlayerId>,
    pub position: Position,
    /// Speed (m/s).
    pub speed: f64,
    /// Distance to ground or water (meters).
    pub ground_distance: f64,
    pub location: LocationKind,
    pub speed_multiplier: f64,
    pub location_multiplier: f64,
    /// 1.0 unless a streak is active.
    pub streak_multiplier: f64,
    /// Product of the three multipliers above.
    pub total_multiplier: f64,
    pub flight_score: f64,
    pub streak: StreakView,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakView {
    pub phase: StreakPhase,
    /// Seconds in the current phase (qualifying or active).
    pub elapsed_secs: f64,
    pub points: f64,
    /// Seconds left on the "get low" countdown, if showing.
    pub altitude_countdown: Option<f64>,
    /// Seconds left on the "speed up" countdown, if showing.
    pub speed_countdown: Option<f64>,
    pub crash_cooldown_remaining: Option<f64>,
}
