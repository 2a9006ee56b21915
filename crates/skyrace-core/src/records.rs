//! Persisted records: per-player aggregates, zones and the leaderboard.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::{PlayerId, Position, Timestamp, ZoneId};

/// Lifetime aggregate for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    #[serde(default)]
    pub display_name: String,
    /// Can go negative through penalties.
    #[serde(default)]
    pub total_score: f64,
    /// Best single-flight score.
    #[serde(default)]
    pub highest_score: f64,
    /// Best net streak points (after penalties).
    #[serde(default)]
    pub best_streak_points: f64,
    /// Engine clock value when the player last finished a flight.
    #[serde(default)]
    pub last_played: Option<Timestamp>,
}

impl PlayerRecord {
    pub fn new(player_id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            player_id,
            display_name: display_name.into(),
            total_score: 0.0,
            highest_score: 0.0,
            best_streak_points: 0.0,
            last_played: None,
        }
    }
}

/// A fly-through bonus volume. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub center: Position,
    /// Trigger radius in meters.
    pub radius: f64,
    /// Tier 1 (easy) to 5 (insane).
    pub difficulty: u8,
    #[serde(default)]
    pub created_by: String,
}

impl Zone {
    pub fn contains(&self, position: Position) -> bool {
        self.center.distance(position) <= self.radius
    }
}

pub fn difficulty_name(difficulty: u8) -> &'static str {
    match difficulty {
        1 => "Easy",
        2 => "Medium",
        3 => "Hard",
        4 => "Expert",
        5 => "Insane",
        _ => "Unknown",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based.
    pub rank: usize,
    pub player_id: PlayerId,
    pub display_name: String,
    pub total_score: f64,
}

/// Stats view for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub record: PlayerRecord,
    /// Score of the flight in progress, if piloting.
    pub current_flight_score: Option<f64>,
    /// Seconds into the active streak, if any.
    pub current_streak_secs: Option<f64>,
    pub rank: Option<usize>,
}

/// Leaderboard order: total score descending, then display name.
pub fn compare_records(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| a.display_name.cmp(&b.display_name))
        .then_with(|| a.player_id.cmp(&b.player_id))
}

/// Rank records and keep the first `size`.
pub fn leaderboard<'a>(
    records: impl IntoIterator<Item = &'a PlayerRecord>,
    size: usize,
) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&PlayerRecord> = records.into_iter().collect();
    sorted.sort_by(|a, b| compare_records(a, b));
    sorted
        .into_iter()
        .take(size)
        .enumerate()
        .map(|(i, record)| LeaderboardEntry {
            rank: i + 1,
            player_id: record.player_id,
            display_name: record.display_name.clone(),
            total_score: record.total_score,
        })
        .collect()
}

/// 1-based rank of `player` among `records`.
pub fn rank_of<'a>(
    records: impl IntoIterator<Item = &'a PlayerRecord>,
    player: PlayerId,
) -> Option<usize> {
    let mut sorted: Vec<&PlayerRecord> = records.into_iter().collect();
    sorted.sort_by(|a, b| compare_records(a, b));
    sorted
        .iter()
        .position(|record| record.player_id == player)
        .map(|i| i + 1)
}
