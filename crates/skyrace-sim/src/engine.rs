//! Scoring engine: the session scheduler and the entry points hosts call.
//!
//! `SkillRaceEngine` owns every `FlightSession` (keyed by player), the zone
//! registry and a cache of player records. Sensors, the record store and the
//! notification sink are injected collaborators. Completely headless, so the
//! whole scoring loop can be driven from tests.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use skyrace_core::config::SkillRaceConfig;
use skyrace_core::constants::{TUNNEL_DAMAGE_FACTOR, ZONE_MAX_RADIUS};
use skyrace_core::enums::{PointSource, StreakEndReason};
use skyrace_core::events::{FlightEvent, Notification, StreakSummary};
use skyrace_core::records::{self, LeaderboardEntry, PlayerRecord, PlayerStats};
use skyrace_core::sensors::{TerrainReading, TerrainSensor, VehicleReading, VehicleSensor};
use skyrace_core::sinks::{NotificationSink, PersistenceStore};
use skyrace_core::state::FlightSnapshot;
use skyrace_core::types::{PlayerId, Position, Timestamp, VehicleHandle};

use crate::session::{FlightSession, TickContext};
use crate::zones::ZoneRegistry;

/// Configuration for starting an engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub rules: SkillRaceConfig,
    /// Seed for zone id generation. Same seed = same ids.
    pub zone_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: SkillRaceConfig::default(),
            zone_seed: 42,
        }
    }
}

/// The engine's external collaborators.
pub struct Collaborators {
    pub terrain: Box<dyn TerrainSensor>,
    pub vehicles: Box<dyn VehicleSensor>,
    pub store: Box<dyn PersistenceStore>,
    pub sink: Box<dyn NotificationSink>,
}

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("no player matches {0:?}")]
    PlayerNotFound(String),
    #[error("{count} players match {query:?}; be more specific")]
    AmbiguousPlayer { query: String, count: usize },
}

pub struct SkillRaceEngine {
    config: SkillRaceConfig,
    sessions: BTreeMap<PlayerId, FlightSession>,
    zones: ZoneRegistry,
    records: BTreeMap<PlayerId, PlayerRecord>,
    dirty: BTreeSet<PlayerId>,
    terrain: Box<dyn TerrainSensor>,
    vehicles: Box<dyn VehicleSensor>,
    store: Box<dyn PersistenceStore>,
    sink: Box<dyn NotificationSink>,
    clock: Timestamp,
}

impl SkillRaceEngine {
    /// Create an engine. Existing records are loaded from the store up front
    /// so the leaderboard is complete; a failing store starts empty.
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            terrain,
            vehicles,
            mut store,
            sink,
        } = collaborators;

        let records = match store.load_all() {
            Ok(records) => records
                .into_iter()
                .map(|record| (record.player_id, record))
                .collect(),
            Err(err) => {
                tracing::warn!(target: "skyrace::store", error = %err, "store.load_failed");
                BTreeMap::new()
            }
        };

        Self {
            config: config.rules,
            sessions: BTreeMap::new(),
            zones: ZoneRegistry::new(config.zone_seed),
            records,
            dirty: BTreeSet::new(),
            terrain,
            vehicles,
            store,
            sink,
            clock: 0.0,
        }
    }

    /// Replace the zone registry, e.g. with zones loaded from disk.
    pub fn with_zones(mut self, zones: ZoneRegistry) -> Self {
        self.zones = zones;
        self
    }

    pub fn config(&self) -> &SkillRaceConfig {
        &self.config
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    /// Exclusive access for zone administration; no tick can run meanwhile.
    pub fn zones_mut(&mut self) -> &mut ZoneRegistry {
        &mut self.zones
    }

    /// Time of the last tick.
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    pub fn is_tracking(&self, player: PlayerId) -> bool {
        self.sessions.contains_key(&player)
    }

    pub fn session(&self, player: PlayerId) -> Option<&FlightSession> {
        self.sessions.get(&player)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn record(&self, player: PlayerId) -> Option<&PlayerRecord> {
        self.records.get(&player)
    }

    /// Start scoring `player` in `vehicle`. A session already running for the
    /// player is ended first.
    pub fn begin_session(
        &mut self,
        player: PlayerId,
        display_name: &str,
        vehicle: VehicleHandle,
        now: Timestamp,
    ) {
        if self.sessions.contains_key(&player) {
            tracing::debug!(target: "skyrace::session", %player, "session.replaced");
            self.end_session(player, now);
        }

        self.ensure_record(player, display_name);
        let position = self
            .vehicles
            .read(vehicle)
            .map(|reading| reading.position)
            .unwrap_or(Position::ZERO);
        self.sessions.insert(
            player,
            FlightSession::new(player, display_name, vehicle, position, now),
        );
        self.flush();
        tracing::info!(
            target: "skyrace::session",
            %player,
            %vehicle,
            name = display_name,
            "session.started"
        );
    }

    /// Stop scoring `player`: tear down the streak without penalty, finalize
    /// the flight and persist. Returns the flight score, or `None` if the
    /// player wasn't piloting.
    pub fn end_session(&mut self, player: PlayerId, now: Timestamp) -> Option<f64> {
        let mut session = self.sessions.remove(&player)?;
        let mut events = Vec::new();

        let summary = session.end_streak(StreakEndReason::SessionEnded, now, &self.config, &mut events);
        session.flip.reset();

        let realtime = self.config.features.realtime_scoring;
        let record = record_entry(&mut self.records, &session);
        if let Some(summary) = &summary {
            settle_streak(record, summary, &mut events);
        }
        if !realtime {
            record.total_score += session.flight_score;
        }
        if session.flight_score > record.highest_score {
            record.highest_score = session.flight_score;
        }
        record.last_played = Some(now);
        self.dirty.insert(player);

        self.emit(player, events);
        self.flush();
        tracing::info!(
            target: "skyrace::session",
            %player,
            flight_score = session.flight_score,
            duration = now - session.started_at,
            "session.ended"
        );
        Some(session.flight_score)
    }

    /// Vehicle took `damage`: reset the flip if configured, end the streak
    /// with a penalty and charge the damage-point penalty.
    pub fn on_vehicle_damaged(&mut self, player: PlayerId, damage: f64, now: Timestamp) {
        let Some(session) = self.sessions.get_mut(&player) else {
            tracing::debug!(target: "skyrace::session", %player, "damage.untracked");
            return;
        };
        let config = &self.config;
        let mut events = Vec::new();

        if config.flip.reset_on_damage && session.flip.reset() {
            events.push(FlightEvent::FlipReset);
        }
        let summary = session.end_streak(StreakEndReason::Damage, now, config, &mut events);

        let streak_penalized = summary.as_ref().is_some_and(|s| s.penalty > 0.0);
        let in_tunnel = config.features.train_tunnel_detection
            && session.last_position.y < config.scoring.train_tunnel_y_threshold;
        let mut damage_penalty = 0.0;
        if config.features.damage_penalties
            && config.scoring.damage_multiplier > 0.0
            && damage > 0.0
            && (config.streak.stack_damage_penalties || !streak_penalized)
        {
            damage_penalty = damage * config.scoring.damage_multiplier;
            if in_tunnel {
                damage_penalty *= TUNNEL_DAMAGE_FACTOR;
            }
        }

        let record = record_entry(&mut self.records, session);
        if let Some(summary) = &summary {
            settle_streak(record, summary, &mut events);
        }
        if damage_penalty > 0.0 {
            record.total_score -= damage_penalty;
            events.push(FlightEvent::DamagePenalty {
                points: damage_penalty,
                damage,
                in_tunnel,
            });
            events.push(FlightEvent::ScoreDelta {
                points: -damage_penalty,
                source: PointSource::Damage,
            });
            tracing::info!(
                target: "skyrace::penalty",
                %player,
                damage,
                penalty = damage_penalty,
                in_tunnel,
                "penalty.damage"
            );
        }
        self.dirty.insert(player);

        self.emit(player, events);
        self.flush();
    }

    /// Vehicle destroyed: end the streak with the heavier penalty, charge the
    /// flat destruction penalty and end the session.
    pub fn on_vehicle_destroyed(&mut self, player: PlayerId, now: Timestamp) {
        let Some(session) = self.sessions.get_mut(&player) else {
            tracing::debug!(target: "skyrace::session", %player, "destroyed.untracked");
            return;
        };
        let config = &self.config;
        let mut events = Vec::new();
        let summary = session.end_streak(StreakEndReason::Destroyed, now, config, &mut events);
        let penalty = config.scoring.destruction_penalty;

        let record = record_entry(&mut self.records, session);
        if let Some(summary) = &summary {
            settle_streak(record, summary, &mut events);
        }
        if penalty > 0.0 {
            record.total_score -= penalty;
            events.push(FlightEvent::DestructionPenalty { points: penalty });
            events.push(FlightEvent::ScoreDelta {
                points: -penalty,
                source: PointSource::Destruction,
            });
        }
        self.dirty.insert(player);
        tracing::info!(target: "skyrace::penalty", %player, penalty, "penalty.destroyed");

        self.emit(player, events);
        self.end_session(player, now);
    }

    /// Run one scoring pass over every session.
    ///
    /// Sensor failures fall back to safe readings and a failing store is only
    /// logged, so a tick never aborts.
    pub fn tick(&mut self, now: Timestamp) {
        self.clock = now;
        let mut outbox: Vec<(PlayerId, Vec<FlightEvent>)> = Vec::new();

        for (player, session) in self.sessions.iter_mut() {
            // No fresh position, no terrain sample.
            let (vehicle, terrain) = match self.vehicles.read(session.vehicle) {
                Ok(vehicle) => match self.terrain.classify(vehicle.position) {
                    Ok(terrain) => (vehicle, terrain),
                    Err(err) => {
                        tracing::warn!(target: "skyrace::sensor", player = %player, error = %err, "sensor.terrain_unavailable");
                        (vehicle, TerrainReading::unavailable())
                    }
                },
                Err(err) => {
                    tracing::warn!(target: "skyrace::sensor", player = %player, error = %err, "sensor.vehicle_unavailable");
                    (
                        VehicleReading::unavailable(session.last_position),
                        TerrainReading::unavailable(),
                    )
                }
            };
            let ctx = TickContext {
                now,
                vehicle,
                terrain,
                zones: self.zones.nearby(vehicle.position, ZONE_MAX_RADIUS),
            };

            let mut events = Vec::new();
            let outcome = session.advance(&ctx, &self.config, &mut events);

            let record = record_entry(&mut self.records, session);
            if let Some(summary) = &outcome.streak_ended {
                settle_streak(record, summary, &mut events);
            }
            if self.config.features.realtime_scoring && outcome.earned != 0.0 {
                record.total_score += outcome.earned;
            }
            if outcome.earned != 0.0 || outcome.streak_ended.is_some() {
                self.dirty.insert(*player);
            }
            if !events.is_empty() {
                outbox.push((*player, events));
            }
        }

        for (player, events) in outbox {
            self.emit(player, events);
        }
        self.flush();
    }

    /// Flight-info view for a piloting player.
    pub fn snapshot(&self, player: PlayerId) -> Option<FlightSnapshot> {
        self.sessions
            .get(&player)
            .map(|session| session.snapshot(self.clock, &self.config))
    }

    /// Top players by total score, sized by config.
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        records::leaderboard(self.records.values(), self.config.scoring.leaderboard_size)
    }

    pub fn rank_of(&self, player: PlayerId) -> Option<usize> {
        records::rank_of(self.records.values(), player)
    }

    pub fn player_stats(&self, player: PlayerId) -> Option<PlayerStats> {
        let record = self.records.get(&player)?.clone();
        let session = self.sessions.get(&player);
        Some(PlayerStats {
            record,
            current_flight_score: session.map(|s| s.flight_score),
            current_streak_secs: session.and_then(|s| s.streak.active_duration(self.clock)),
            rank: self.rank_of(player),
        })
    }

    /// Delete the one record whose display name matches `query`
    /// (case-insensitive; an exact name wins over partial matches).
    pub fn remove_player_by_name(&mut self, query: &str) -> Result<PlayerRecord, EngineError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Err(EngineError::PlayerNotFound(query.to_string()));
        }
        let exact: Vec<PlayerId> = self
            .records
            .values()
            .filter(|r| r.display_name.to_lowercase() == needle)
            .map(|r| r.player_id)
            .collect();
        let matches: Vec<PlayerId> = if exact.is_empty() {
            self.records
                .values()
                .filter(|r| r.display_name.to_lowercase().contains(&needle))
                .map(|r| r.player_id)
                .collect()
        } else {
            exact
        };

        let player = match matches.as_slice() {
            [] => return Err(EngineError::PlayerNotFound(query.to_string())),
            [player] => *player,
            _ => {
                return Err(EngineError::AmbiguousPlayer {
                    query: query.to_string(),
                    count: matches.len(),
                })
            }
        };

        let record = self
            .records
            .remove(&player)
            .ok_or_else(|| EngineError::PlayerNotFound(query.to_string()))?;
        self.dirty.remove(&player);
        if let Err(err) = self.store.remove(player) {
            tracing::warn!(target: "skyrace::store", %player, error = %err, "store.remove_failed");
        }
        tracing::info!(target: "skyrace::admin", %player, name = %record.display_name, "player.removed");
        Ok(record)
    }

    /// Drop every player record. Returns how many were removed.
    pub fn reset_all_records(&mut self) -> usize {
        let count = self.records.len();
        self.records.clear();
        self.dirty.clear();
        if let Err(err) = self.store.clear() {
            tracing::warn!(target: "skyrace::store", error = %err, "store.clear_failed");
        }
        tracing::info!(target: "skyrace::admin", count, "records.reset");
        count
    }

    /// Load (or create) the record of a player about to fly.
    fn ensure_record(&mut self, player: PlayerId, display_name: &str) {
        if !self.records.contains_key(&player) {
            let loaded = match self.store.load(player) {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(target: "skyrace::store", %player, error = %err, "store.load_failed");
                    None
                }
            };
            let record = loaded.unwrap_or_else(|| PlayerRecord::new(player, display_name));
            self.records.insert(player, record);
        }
        if let Some(record) = self.records.get_mut(&player) {
            if !display_name.is_empty() {
                record.display_name = display_name.to_string();
            }
        }
        self.dirty.insert(player);
    }

    fn emit(&mut self, player: PlayerId, events: Vec<FlightEvent>) {
        for event in events {
            self.sink.emit(Notification::new(player, event));
        }
    }

    /// Save every record touched since the last flush in one batch.
    fn flush(&mut self) {
        if self.dirty.is_empty() {
            return;
        }
        let batch: Vec<PlayerRecord> = std::mem::take(&mut self.dirty)
            .into_iter()
            .filter_map(|player| self.records.get(&player).cloned())
            .collect();
        if let Err(err) = self.store.save_all(&batch) {
            tracing::warn!(
                target: "skyrace::store",
                records = batch.len(),
                error = %err,
                "store.save_failed"
            );
        }
    }
}

/// Record of a session's player, recreated if an admin removed it mid-flight.
fn record_entry<'a>(
    records: &'a mut BTreeMap<PlayerId, PlayerRecord>,
    session: &FlightSession,
) -> &'a mut PlayerRecord {
    records
        .entry(session.player)
        .or_insert_with(|| PlayerRecord::new(session.player, session.display_name.clone()))
}

/// Apply a finished streak to the player's record.
fn settle_streak(record: &mut PlayerRecord, summary: &StreakSummary, events: &mut Vec<FlightEvent>) {
    if summary.penalty > 0.0 {
        record.total_score -= summary.penalty;
        events.push(FlightEvent::ScoreDelta {
            points: -summary.penalty,
            source: PointSource::StreakPenalty,
        });
    }
    if summary.net_points > record.best_streak_points {
        record.best_streak_points = summary.net_points;
        events.push(FlightEvent::NewStreakRecord {
            points: summary.net_points,
        });
    }
}
