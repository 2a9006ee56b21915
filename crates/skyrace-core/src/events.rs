//! Events emitted by the engine for notification sinks.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{PlayerId, ZoneId};

/// Final numbers of a finished streak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub reason: StreakEndReason,
    /// Seconds the streak was active.
    pub duration_secs: f64,
    /// Multiplier in effect when it ended.
    pub final_multiplier: f64,
    /// Points earned during the streak, before any penalty.
    pub points: f64,
    /// Points taken back from the total score.
    pub penalty: f64,
    /// `points - penalty`.
    pub net_points: f64,
}

/// Something a player should be told about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FlightEvent {
    /// Points gained (or lost) this tick, for floating displays.
    ScoreDelta { points: f64, source: PointSource },
    /// Streak conditions met, qualification running.
    QualificationStarted,
    /// Conditions lost before the qualification period completed.
    QualificationLost,
    StreakStarted,
    /// A one-time multiplier milestone was crossed.
    StreakMilestone { multiplier: f64, super_streak: bool },
    StreakEnded(StreakSummary),
    NewStreakRecord { points: f64 },
    ForgivenessStarted { kind: ForgivenessKind, window_secs: f64 },
    /// `expired` is false when the condition recovered in time or the streak ended first.
    ForgivenessEnded { kind: ForgivenessKind, expired: bool },
    /// Both windows open: the altitude countdown is hidden while speed takes precedence.
    ForgivenessSuppressed { kind: ForgivenessKind },
    FlipStarted { ground_distance: f64 },
    FlipRecoveryStarted { closest_ground_distance: f64 },
    FlipRecoveryFailed,
    FlipAwarded {
        points: f64,
        closest_ground_distance: f64,
        risk_multiplier: f64,
    },
    /// Flip completed but points are only awarded during a streak.
    FlipWithheld { closest_ground_distance: f64 },
    FlipReset,
    ZoneTriggered {
        zone_id: ZoneId,
        name: String,
        difficulty: u8,
        bonus: f64,
        chain_multiplier: f64,
    },
    DamagePenalty {
        points: f64,
        damage: f64,
        in_tunnel: bool,
    },
    DestructionPenalty { points: f64 },
}

/// An event addressed to one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub player: PlayerId,
    pub event: FlightEvent,
}

impl Notification {
    pub fn new(player: PlayerId, event: FlightEvent) -> Self {
        Self { player, event }
    }
}
