//! Enumeration types used throughout the engine.

use serde::{Deserialize, Serialize};

/// Location classification reported by the terrain sensor.
///
/// Variants are listed in precedence order: a train tunnel wins over water,
/// water over monuments, and so on down to the biome kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    TrainTunnel,
    Water,
    Monument,
    Road,
    River,
    Forest,
    Arid,
    Temperate,
    Swamp,
    Tundra,
    Arctic,
    Alpine,
    #[default]
    Default,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::TrainTunnel => "train_tunnel",
            LocationKind::Water => "water",
            LocationKind::Monument => "monument",
            LocationKind::Road => "road",
            LocationKind::River => "river",
            LocationKind::Forest => "forest",
            LocationKind::Arid => "arid",
            LocationKind::Temperate => "temperate",
            LocationKind::Swamp => "swamp",
            LocationKind::Tundra => "tundra",
            LocationKind::Arctic => "arctic",
            LocationKind::Alpine => "alpine",
            LocationKind::Default => "default",
        }
    }
}

/// Primary streak state, as shown to the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakPhase {
    #[default]
    Idle,
    Qualifying,
    Active,
}

/// Why an active streak ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakEndReason {
    /// Speed dropped and the speed forgiveness window ran out.
    Speed,
    /// Altitude rose and the altitude forgiveness window ran out.
    Altitude,
    /// The vehicle took damage.
    Damage,
    /// The vehicle was destroyed.
    Destroyed,
    /// The pilot dismounted or disconnected.
    SessionEnded,
}

impl StreakEndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreakEndReason::Speed => "speed",
            StreakEndReason::Altitude => "altitude",
            StreakEndReason::Damage => "damage",
            StreakEndReason::Destroyed => "destroyed",
            StreakEndReason::SessionEnded => "session_ended",
        }
    }

    /// Damage and destruction endings cost a share of the streak's points.
    pub fn is_penalized(&self) -> bool {
        matches!(self, StreakEndReason::Damage | StreakEndReason::Destroyed)
    }
}

/// Which streak condition a forgiveness window covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForgivenessKind {
    /// "Get low" window.
    Altitude,
    /// "Speed up" window.
    Speed,
}

/// Shape of the flip risk curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCurve {
    #[default]
    Linear,
    Exponential,
}

/// Origin of a score change, used for floating point displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    /// Regular per-tick proximity scoring.
    Flight,
    /// Fly-through zone bonus, streak multiplier applied.
    Zone,
    Flip,
    Damage,
    Destruction,
    StreakPenalty,
}
