//! Engine configuration.
//!
//! Every section defaults independently, so a JSON file only needs the keys
//! it wants to change. Values that make no sense (non-positive intervals,
//! bases or ranges) are replaced by their defaults in [`SkillRaceConfig::sanitized`].

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::enums::{LocationKind, RiskCurve};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRaceConfig {
    pub scoring: ScoringConfig,
    pub streak: StreakConfig,
    pub flip: FlipConfig,
    pub zones: ZoneConfig,
    pub locations: LocationMultipliers,
    pub features: FeatureToggles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub interval_secs: f64,
    pub max_point_distance: f64,
    pub proximity_modifier: f64,
    pub speed_multiplier_base: f64,
    pub damage_multiplier: f64,
    pub destruction_penalty: f64,
    pub train_tunnel_y_threshold: f64,
    pub leaderboard_size: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            interval_secs: SCORING_INTERVAL_SECS,
            max_point_distance: MAX_POINT_DISTANCE,
            proximity_modifier: PROXIMITY_POINTS_MODIFIER,
            speed_multiplier_base: SPEED_MULTIPLIER_BASE,
            damage_multiplier: DAMAGE_POINTS_MULTIPLIER,
            destruction_penalty: DESTRUCTION_PENALTY,
            train_tunnel_y_threshold: TRAIN_TUNNEL_Y_THRESHOLD,
            leaderboard_size: LEADERBOARD_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakConfig {
    pub altitude_limit: f64,
    pub speed_threshold: f64,
    pub qualify_duration_secs: f64,
    pub forgiveness_window_secs: f64,
    /// Also the crash cooldown after a penalized ending.
    pub end_display_secs: f64,
    pub damage_penalty_rate: f64,
    pub destroyed_penalty_rate: f64,
    /// Apply the damage-point penalty and the streak-share penalty for the same hit.
    pub stack_damage_penalties: bool,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            altitude_limit: STREAK_ALTITUDE_LIMIT,
            speed_threshold: STREAK_SPEED_THRESHOLD,
            qualify_duration_secs: STREAK_QUALIFY_DURATION,
            forgiveness_window_secs: FORGIVENESS_WINDOW_SECS,
            end_display_secs: STREAK_END_DISPLAY_SECS,
            damage_penalty_rate: DAMAGE_STREAK_PENALTY_RATE,
            destroyed_penalty_rate: DESTROYED_STREAK_PENALTY_RATE,
            stack_damage_penalties: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipConfig {
    pub enabled: bool,
    pub base_points: f64,
    pub max_risk_multiplier: f64,
    pub recovery_confirmation_secs: f64,
    pub upside_down_threshold: f64,
    pub max_altitude_for_risk_bonus: f64,
    pub min_altitude: f64,
    pub min_speed: f64,
    pub risk_curve: RiskCurve,
    pub exponential_risk_factor: f64,
    pub award_during_streak_only: bool,
    pub reset_on_damage: bool,
}

impl Default for FlipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_points: FLIP_BASE_POINTS,
            max_risk_multiplier: FLIP_MAX_RISK_MULTIPLIER,
            recovery_confirmation_secs: FLIP_RECOVERY_CONFIRMATION_SECS,
            upside_down_threshold: FLIP_UPSIDE_DOWN_THRESHOLD,
            max_altitude_for_risk_bonus: FLIP_MAX_ALTITUDE_FOR_RISK_BONUS,
            min_altitude: FLIP_MIN_ALTITUDE,
            min_speed: FLIP_MIN_SPEED,
            risk_curve: RiskCurve::Linear,
            exponential_risk_factor: FLIP_EXPONENTIAL_RISK_FACTOR,
            award_during_streak_only: false,
            reset_on_damage: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub enabled: bool,
    pub bonus_multiplier: f64,
    /// Tiers listed in a config file override the defaults one by one.
    #[serde(deserialize_with = "merge_difficulty_tiers")]
    pub difficulty_multipliers: BTreeMap<u8, f64>,
    pub cooldown_secs: f64,
    pub min_speed: f64,
    pub chain_window_secs: f64,
    pub chain_max_multiplier: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bonus_multiplier: ZONE_BONUS_MULTIPLIER,
            difficulty_multipliers: ZONE_DIFFICULTY_MULTIPLIERS.into_iter().collect(),
            cooldown_secs: ZONE_COOLDOWN_SECS,
            min_speed: ZONE_MIN_SPEED,
            chain_window_secs: ZONE_CHAIN_WINDOW_SECS,
            chain_max_multiplier: ZONE_CHAIN_MAX_MULTIPLIER,
        }
    }
}

impl ZoneConfig {
    /// Multiplier for a difficulty tier, neutral for tiers the table doesn't know.
    pub fn difficulty_multiplier(&self, difficulty: u8) -> f64 {
        match self.difficulty_multipliers.get(&difficulty) {
            Some(value) => *value,
            None => {
                tracing::warn!(
                    target: "skyrace::config",
                    difficulty,
                    "zone.difficulty_unknown"
                );
                NEUTRAL_MULTIPLIER
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationMultipliers {
    pub train_tunnel: f64,
    pub water: f64,
    pub monument: f64,
    pub road: f64,
    pub river: f64,
    pub forest: f64,
    pub arid: f64,
    pub temperate: f64,
    pub swamp: f64,
    pub tundra: f64,
    pub arctic: f64,
    pub alpine: f64,
    pub default: f64,
}

impl Default for LocationMultipliers {
    fn default() -> Self {
        Self {
            train_tunnel: 2.5,
            water: 1.0,
            monument: 2.0,
            road: 1.2,
            river: 1.1,
            forest: 2.0,
            arid: 1.0,
            temperate: 1.1,
            swamp: 1.4,
            tundra: 1.2,
            arctic: 1.3,
            alpine: 1.5,
            default: NEUTRAL_MULTIPLIER,
        }
    }
}

impl LocationMultipliers {
    pub fn multiplier(&self, kind: LocationKind) -> f64 {
        match kind {
            LocationKind::TrainTunnel => self.train_tunnel,
            LocationKind::Water => self.water,
            LocationKind::Monument => self.monument,
            LocationKind::Road => self.road,
            LocationKind::River => self.river,
            LocationKind::Forest => self.forest,
            LocationKind::Arid => self.arid,
            LocationKind::Temperate => self.temperate,
            LocationKind::Swamp => self.swamp,
            LocationKind::Tundra => self.tundra,
            LocationKind::Arctic => self.arctic,
            LocationKind::Alpine => self.alpine,
            LocationKind::Default => self.default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub damage_penalties: bool,
    pub streak_system: bool,
    pub location_multipliers: bool,
    /// Credit the total score every tick instead of only at flight end.
    pub realtime_scoring: bool,
    pub train_tunnel_detection: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            damage_penalties: true,
            streak_system: true,
            location_multipliers: true,
            realtime_scoring: true,
            train_tunnel_detection: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse skill race config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read skill race config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SkillRaceConfig {
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: SkillRaceConfig = serde_json::from_str(data)?;
        Ok(config.sanitized())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Load `path` if given, falling back to the built-in defaults on any failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load_from_file(path) {
            Ok(config) => {
                tracing::info!(
                    target: "skyrace::config",
                    path = %path.display(),
                    "config.loaded"
                );
                config
            }
            Err(err) => {
                tracing::warn!(
                    target: "skyrace::config",
                    path = %path.display(),
                    error = %err,
                    "config.load_failed"
                );
                Self::default()
            }
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace values that would break the scoring math with their defaults.
    pub fn sanitized(mut self) -> Self {
        let scoring = ScoringConfig::default();
        self.scoring.interval_secs = positive_or(
            self.scoring.interval_secs,
            scoring.interval_secs,
            "scoring.interval_secs",
        );
        self.scoring.speed_multiplier_base = positive_or(
            self.scoring.speed_multiplier_base,
            scoring.speed_multiplier_base,
            "scoring.speed_multiplier_base",
        );
        self.scoring.max_point_distance = positive_or(
            self.scoring.max_point_distance,
            scoring.max_point_distance,
            "scoring.max_point_distance",
        );

        let streak = StreakConfig::default();
        self.streak.qualify_duration_secs = positive_or(
            self.streak.qualify_duration_secs,
            streak.qualify_duration_secs,
            "streak.qualify_duration_secs",
        );
        self.streak.forgiveness_window_secs = positive_or(
            self.streak.forgiveness_window_secs,
            streak.forgiveness_window_secs,
            "streak.forgiveness_window_secs",
        );
        self.streak.damage_penalty_rate = rate_or(
            self.streak.damage_penalty_rate,
            streak.damage_penalty_rate,
            "streak.damage_penalty_rate",
        );
        self.streak.destroyed_penalty_rate = rate_or(
            self.streak.destroyed_penalty_rate,
            streak.destroyed_penalty_rate,
            "streak.destroyed_penalty_rate",
        );

        let flip = FlipConfig::default();
        self.flip.max_altitude_for_risk_bonus = positive_or(
            self.flip.max_altitude_for_risk_bonus,
            flip.max_altitude_for_risk_bonus,
            "flip.max_altitude_for_risk_bonus",
        );
        self.flip.recovery_confirmation_secs = positive_or(
            self.flip.recovery_confirmation_secs,
            flip.recovery_confirmation_secs,
            "flip.recovery_confirmation_secs",
        );

        let zones = ZoneConfig::default();
        self.zones.chain_window_secs = positive_or(
            self.zones.chain_window_secs,
            zones.chain_window_secs,
            "zones.chain_window_secs",
        );
        self
    }
}

fn merge_difficulty_tiers<'de, D>(deserializer: D) -> Result<BTreeMap<u8, f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let overrides = BTreeMap::<u8, f64>::deserialize(deserializer)?;
    let mut tiers: BTreeMap<u8, f64> = ZONE_DIFFICULTY_MULTIPLIERS.into_iter().collect();
    tiers.extend(overrides);
    Ok(tiers)
}

fn positive_or(value: f64, default: f64, field: &'static str) -> f64 {
    if value.is_finite() && value > 0.0 {
        return value;
    }
    tracing::warn!(
        target: "skyrace::config",
        field,
        value,
        default,
        "config.value_replaced"
    );
    default
}

fn rate_or(value: f64, default: f64, field: &'static str) -> f64 {
    if (0.0..=1.0).contains(&value) {
        return value;
    }
    tracing::warn!(
        target: "skyrace::config",
        field,
        value,
        default,
        "config.value_replaced"
    );
    default
}
