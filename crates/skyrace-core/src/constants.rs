//! Scoring constants and tuning defaults.
//!
//! Every tunable here is also a field of [`crate::config::SkillRaceConfig`];
//! these values are what a fresh config starts with.

// --- Scheduling ---

/// Seconds between scoring passes.
pub const SCORING_INTERVAL_SECS: f64 = 0.5;

// --- Proximity / speed ---

/// Ground distance (meters) above which no proximity points are earned.
pub const MAX_POINT_DISTANCE: f64 = 10.0;

/// Scale applied to `100 - distance²`.
pub const PROXIMITY_POINTS_MODIFIER: f64 = 0.1;

/// Proximity base before the modifier is applied.
pub const PROXIMITY_BASE_POINTS: f64 = 100.0;

/// Speed (m/s) at which the speed multiplier reaches 1.0.
pub const SPEED_MULTIPLIER_BASE: f64 = 20.0;

/// Ground distance reported when nothing is found below the vehicle.
pub const NO_GROUND_DISTANCE: f64 = 200.0;

/// Height (y) below which a position counts as inside a train tunnel.
pub const TRAIN_TUNNEL_Y_THRESHOLD: f64 = -25.0;

// --- Streak ---

/// Maximum ground distance (meters) that still meets streak conditions.
pub const STREAK_ALTITUDE_LIMIT: f64 = 10.0;

/// Minimum speed (m/s) that still meets streak conditions.
pub const STREAK_SPEED_THRESHOLD: f64 = 10.0;

/// Seconds of sustained conditions before a streak starts.
pub const STREAK_QUALIFY_DURATION: f64 = 10.0;

/// Grace period for a single failing condition during an active streak.
pub const FORGIVENESS_WINDOW_SECS: f64 = 3.0;

/// End-summary display time; also the crash cooldown after a penalized end.
pub const STREAK_END_DISPLAY_SECS: f64 = 3.0;

/// Share of streak points lost when a streak ends through damage.
pub const DAMAGE_STREAK_PENALTY_RATE: f64 = 0.5;

/// Share of streak points lost when a streak ends through destruction.
pub const DESTROYED_STREAK_PENALTY_RATE: f64 = 0.75;

/// Watermark a fresh streak starts with.
pub const MILESTONE_WATERMARK_START: f64 = 1.0;

/// Raw streak durations (seconds) and the multiplier marks they unlock.
/// The last entry is the super streak.
pub const STREAK_MILESTONES: [(f64, f64); 3] = [(60.0, 2.0), (210.0, 2.5), (360.0, 3.0)];

/// Streak multiplier table: `(upper bound exclusive, multiplier)`.
/// Durations at or past the last bound use [`STREAK_MAX_MULTIPLIER`].
pub const STREAK_MULTIPLIER_TABLE: [(f64, f64); 15] = [
    (10.0, 1.0),
    (20.0, 1.2),
    (30.0, 1.4),
    (40.0, 1.6),
    (50.0, 1.8),
    (60.0, 2.0),
    (90.0, 2.1),
    (120.0, 2.2),
    (150.0, 2.3),
    (180.0, 2.4),
    (210.0, 2.5),
    (240.0, 2.6),
    (270.0, 2.7),
    (300.0, 2.8),
    (330.0, 2.9),
];

/// Multiplier once a streak outlasts the table.
pub const STREAK_MAX_MULTIPLIER: f64 = 3.0;

// --- Penalties ---

/// Penalty points per point of vehicle damage.
pub const DAMAGE_POINTS_MULTIPLIER: f64 = 1.0;

/// Extra factor on damage penalties inside a train tunnel.
pub const TUNNEL_DAMAGE_FACTOR: f64 = 2.0;

/// Flat penalty when the vehicle is destroyed.
pub const DESTRUCTION_PENALTY: f64 = 500.0;

// --- Flip detection ---

pub const FLIP_BASE_POINTS: f64 = 250.0;
pub const FLIP_MAX_RISK_MULTIPLIER: f64 = 10.0;
pub const FLIP_RECOVERY_CONFIRMATION_SECS: f64 = 3.0;

/// `up.y` below this counts as inverted.
pub const FLIP_UPSIDE_DOWN_THRESHOLD: f64 = -0.5;

/// Closest approach (meters) at or above which a flip earns base points only.
pub const FLIP_MAX_ALTITUDE_FOR_RISK_BONUS: f64 = 100.0;
pub const FLIP_MIN_ALTITUDE: f64 = 2.0;
pub const FLIP_MIN_SPEED: f64 = 5.0;
pub const FLIP_EXPONENTIAL_RISK_FACTOR: f64 = 2.0;

// --- Zones ---

pub const ZONE_BONUS_MULTIPLIER: f64 = 1.5;

/// Points per unit of zone bonus multiplier.
pub const ZONE_BASE_POINTS: f64 = 100.0;
pub const ZONE_COOLDOWN_SECS: f64 = 30.0;
pub const ZONE_MIN_SPEED: f64 = 10.0;

/// Gap (seconds) within which a different zone counts as a chain.
pub const ZONE_CHAIN_WINDOW_SECS: f64 = 30.0;

/// Chain multiplier for a zero-second gap.
pub const ZONE_CHAIN_MAX_MULTIPLIER: f64 = 3.0;

/// Difficulty multipliers for tiers 1 through 5.
pub const ZONE_DIFFICULTY_MULTIPLIERS: [(u8, f64); 5] =
    [(1, 1.0), (2, 1.5), (3, 2.0), (4, 3.0), (5, 5.0)];

pub const ZONE_MIN_DIFFICULTY: u8 = 1;
pub const ZONE_MAX_DIFFICULTY: u8 = 5;

/// Largest radius (meters) a zone may be created with.
pub const ZONE_MAX_RADIUS: f64 = 200.0;

/// Length of generated zone ids (hex digits).
pub const ZONE_ID_LENGTH: usize = 8;

// --- Records ---

pub const LEADERBOARD_SIZE: usize = 10;

/// Multiplier used for unknown tiers and unavailable terrain.
pub const NEUTRAL_MULTIPLIER: f64 = 1.0;
