//! Flip detector: inversion followed by a confirmed recovery.
//!
//! Pure state machine over per-tick readings. The reward scales with how
//! close to the ground the vehicle got while inverted.

use skyrace_core::config::FlipConfig;
use skyrace_core::enums::RiskCurve;
use skyrace_core::events::FlightEvent;
use skyrace_core::types::{elapsed, Timestamp};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum FlipState {
    #[default]
    Upright,
    Inverted {
        since: Timestamp,
    },
    RecoveryPending {
        since: Timestamp,
    },
}

/// Readings the detector needs for one tick.
#[derive(Debug, Clone, Copy)]
pub struct FlipInput {
    pub up_y: f64,
    pub speed: f64,
    pub ground_distance: f64,
    pub streak_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipAward {
    pub points: f64,
    pub closest_ground_distance: f64,
    pub risk_multiplier: f64,
}

/// Risk multiplier for a flip whose closest approach was `closest` meters.
pub fn risk_multiplier(closest: f64, config: &FlipConfig) -> f64 {
    let max_altitude = config.max_altitude_for_risk_bonus;
    let mut risk = 1.0 - closest.clamp(0.0, max_altitude) / max_altitude;
    if config.risk_curve == RiskCurve::Exponential {
        risk = risk.powf(config.exponential_risk_factor);
    }
    1.0 + risk * (config.max_risk_multiplier - 1.0)
}

#[derive(Debug, Clone)]
pub struct FlipDetector {
    state: FlipState,
    /// Closest ground distance since the flip started; +inf when upright.
    closest: f64,
}

impl Default for FlipDetector {
    fn default() -> Self {
        Self {
            state: FlipState::Upright,
            closest: f64::INFINITY,
        }
    }
}

impl FlipDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FlipState {
        self.state
    }

    pub fn closest_ground_distance(&self) -> f64 {
        self.closest
    }

    pub fn in_progress(&self) -> bool {
        self.state != FlipState::Upright
    }

    /// Back to upright with the distance tracker cleared. Returns whether a
    /// flip was in progress.
    pub fn reset(&mut self) -> bool {
        let was_in_progress = self.in_progress();
        *self = Self::default();
        was_in_progress
    }

    /// Advance one tick. Returns the award when a flip completes.
    pub fn update(
        &mut self,
        input: FlipInput,
        now: Timestamp,
        config: &FlipConfig,
        events: &mut Vec<FlightEvent>,
    ) -> Option<FlipAward> {
        if !config.enabled
            || input.ground_distance < config.min_altitude
            || input.speed < config.min_speed
        {
            return None;
        }

        let inverted = input.up_y < config.upside_down_threshold;
        match (self.state, inverted) {
            (FlipState::Upright, true) => {
                self.state = FlipState::Inverted { since: now };
                self.closest = input.ground_distance;
                events.push(FlightEvent::FlipStarted {
                    ground_distance: input.ground_distance,
                });
            }
            (FlipState::Inverted { .. }, true) => {
                self.closest = self.closest.min(input.ground_distance);
            }
            (FlipState::Inverted { .. }, false) => {
                self.state = FlipState::RecoveryPending { since: now };
                events.push(FlightEvent::FlipRecoveryStarted {
                    closest_ground_distance: self.closest,
                });
            }
            (FlipState::RecoveryPending { .. }, true) => {
                self.state = FlipState::Inverted { since: now };
                self.closest = self.closest.min(input.ground_distance);
                events.push(FlightEvent::FlipRecoveryFailed);
            }
            (FlipState::RecoveryPending { since }, false) => {
                if elapsed(now, since) >= config.recovery_confirmation_secs {
                    return self.complete(input.streak_active, config, events);
                }
            }
            (FlipState::Upright, false) => {}
        }
        None
    }

    fn complete(
        &mut self,
        streak_active: bool,
        config: &FlipConfig,
        events: &mut Vec<FlightEvent>,
    ) -> Option<FlipAward> {
        let closest = self.closest;
        *self = Self::default();

        if config.award_during_streak_only && !streak_active {
            events.push(FlightEvent::FlipWithheld {
                closest_ground_distance: closest,
            });
            return None;
        }

        let multiplier = risk_multiplier(closest, config);
        let award = FlipAward {
            points: config.base_points * multiplier,
            closest_ground_distance: closest,
            risk_multiplier: multiplier,
        };
        events.push(FlightEvent::FlipAwarded {
            points: award.points,
            closest_ground_distance: closest,
            risk_multiplier: multiplier,
        });
        tracing::info!(
            target: "skyrace::flip",
            points = award.points,
            closest,
            risk_multiplier = multiplier,
            "flip.awarded"
        );
        Some(award)
    }
}
