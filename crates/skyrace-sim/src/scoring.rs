//! Score composition for one tick.
//!
//! Proximity points scaled by speed, location and the tick interval, plus the
//! zone bonus, all amplified by the streak multiplier when a streak is active.

use serde::{Deserialize, Serialize};

use skyrace_core::config::ScoringConfig;
use skyrace_core::constants::{NEUTRAL_MULTIPLIER, PROXIMITY_BASE_POINTS};

/// Points for flying `ground_distance` meters above ground or water.
pub fn proximity_score(ground_distance: f64, config: &ScoringConfig) -> f64 {
    if ground_distance > config.max_point_distance {
        return 0.0;
    }
    (PROXIMITY_BASE_POINTS - ground_distance * ground_distance).max(0.0) * config.proximity_modifier
}

/// Speed amplifier; never below 1.0.
pub fn speed_multiplier(speed: f64, config: &ScoringConfig) -> f64 {
    (speed / config.speed_multiplier_base).max(NEUTRAL_MULTIPLIER)
}

/// Sensed values and per-tick bonuses going into one composition.
#[derive(Debug, Clone, Copy)]
pub struct TickInputs {
    pub ground_distance: f64,
    pub speed: f64,
    /// Already neutral when location multipliers are switched off.
    pub location_multiplier: f64,
    pub zone_bonus: f64,
    /// `Some` only while a streak is active.
    pub streak_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickBreakdown {
    pub proximity: f64,
    pub speed_multiplier: f64,
    pub location_multiplier: f64,
    pub zone_bonus: f64,
    /// Proximity × speed × location × interval.
    pub base_points: f64,
    pub streak_multiplier: f64,
    pub total: f64,
}

pub fn compose(inputs: &TickInputs, config: &ScoringConfig) -> TickBreakdown {
    let proximity = proximity_score(inputs.ground_distance, config);
    let speed_multiplier = speed_multiplier(inputs.speed, config);
    let base_points =
        proximity * speed_multiplier * inputs.location_multiplier * config.interval_secs;
    let streak_multiplier = inputs.streak_multiplier.unwrap_or(NEUTRAL_MULTIPLIER);
    let total = (base_points + inputs.zone_bonus) * streak_multiplier;

    TickBreakdown {
        proximity,
        speed_multiplier,
        location_multiplier: inputs.location_multiplier,
        zone_bonus: inputs.zone_bonus,
        base_points,
        streak_multiplier,
        total,
    }
}
