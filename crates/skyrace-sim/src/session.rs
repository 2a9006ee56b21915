//! FlightSession: everything tracked for one piloted vehicle.

use skyrace_core::config::SkillRaceConfig;
use skyrace_core::constants::NEUTRAL_MULTIPLIER;
use skyrace_core::enums::{PointSource, StreakEndReason};
use skyrace_core::events::{FlightEvent, StreakSummary};
use skyrace_core::records::Zone;
use skyrace_core::sensors::{TerrainReading, VehicleReading};
use skyrace_core::state::FlightSnapshot;
use skyrace_core::types::{PlayerId, Position, Timestamp, VehicleHandle};

use crate::flip::{FlipDetector, FlipInput};
use crate::scoring::{self, TickBreakdown, TickInputs};
use crate::streak::{StreakConditions, StreakTracker};
use crate::zones::ZoneTracker;

/// Sensor snapshot and zones in reach, taken at the start of a tick.
#[derive(Debug, Clone)]
pub struct TickContext<'a> {
    pub now: Timestamp,
    pub vehicle: VehicleReading,
    pub terrain: TerrainReading,
    pub zones: Vec<&'a Zone>,
}

/// What one tick changed outside the session.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub breakdown: TickBreakdown,
    /// Points earned this tick (composition plus any flip award).
    pub earned: f64,
    /// Streak that ended on this tick's conditions.
    pub streak_ended: Option<StreakSummary>,
}

/// Last sensed values, kept for the flight-info view.
#[derive(Debug, Clone, Copy)]
struct LastTick {
    vehicle: VehicleReading,
    terrain: TerrainReading,
    breakdown: TickBreakdown,
}

#[derive(Debug, Clone)]
pub struct FlightSession {
    pub player: PlayerId,
    pub display_name: String,
    pub vehicle: VehicleHandle,
    pub started_at: Timestamp,
    /// Points earned this flight. Penalties never touch it.
    pub flight_score: f64,
    pub streak: StreakTracker,
    pub flip: FlipDetector,
    pub zones: ZoneTracker,
    pub last_position: Position,
    last_tick: Option<LastTick>,
}

impl FlightSession {
    pub fn new(
        player: PlayerId,
        display_name: impl Into<String>,
        vehicle: VehicleHandle,
        position: Position,
        now: Timestamp,
    ) -> Self {
        Self {
            player,
            display_name: display_name.into(),
            vehicle,
            started_at: now,
            flight_score: 0.0,
            streak: StreakTracker::new(),
            flip: FlipDetector::new(),
            zones: ZoneTracker::new(),
            last_position: position,
            last_tick: None,
        }
    }

    /// Run one scoring pass.
    pub fn advance(
        &mut self,
        ctx: &TickContext<'_>,
        config: &SkillRaceConfig,
        events: &mut Vec<FlightEvent>,
    ) -> TickOutcome {
        let now = ctx.now;
        let speed = ctx.vehicle.speed;
        let ground_distance = ctx.terrain.ground_distance;
        self.last_position = ctx.vehicle.position;

        let conditions = StreakConditions::evaluate(ground_distance, speed, &config.streak);
        let streak_ended = self
            .streak
            .update(
                conditions,
                now,
                &config.streak,
                config.features.streak_system,
                events,
            )
            .and_then(|reason| self.end_streak(reason, now, config, events));

        let location_multiplier = if config.features.location_multipliers {
            ctx.terrain.multiplier
        } else {
            NEUTRAL_MULTIPLIER
        };
        let zone_bonus: f64 = self
            .zones
            .evaluate(
                ctx.zones.iter().copied(),
                ctx.vehicle.position,
                speed,
                now,
                &config.zones,
                events,
            )
            .iter()
            .map(|trigger| trigger.bonus)
            .sum();

        let streak_multiplier = if self.streak.is_active() {
            self.streak.check_milestones(now, events);
            Some(self.streak.multiplier(now))
        } else {
            None
        };

        let breakdown = scoring::compose(
            &TickInputs {
                ground_distance,
                speed,
                location_multiplier,
                zone_bonus,
                streak_multiplier,
            },
            &config.scoring,
        );
        let mut earned = breakdown.total;
        self.flight_score += breakdown.total;
        self.streak.add_points(breakdown.total);
        let parts = [
            (breakdown.base_points, PointSource::Flight),
            (breakdown.zone_bonus, PointSource::Zone),
        ];
        for (points, source) in parts {
            let points = points * breakdown.streak_multiplier;
            if points > 0.0 {
                events.push(FlightEvent::ScoreDelta { points, source });
            }
        }

        let flip_input = FlipInput {
            up_y: ctx.vehicle.up_y,
            speed,
            ground_distance,
            streak_active: self.streak.is_active(),
        };
        if let Some(award) = self.flip.update(flip_input, now, &config.flip, events) {
            earned += award.points;
            self.flight_score += award.points;
            self.streak.add_points(award.points);
            events.push(FlightEvent::ScoreDelta {
                points: award.points,
                source: PointSource::Flip,
            });
        }

        tracing::trace!(
            target: "skyrace::tick",
            player = %self.player,
            ground_distance,
            speed,
            location = ctx.terrain.location.as_str(),
            total = breakdown.total,
            earned,
            "tick.scored"
        );

        self.last_tick = Some(LastTick {
            vehicle: ctx.vehicle,
            terrain: ctx.terrain,
            breakdown,
        });

        TickOutcome {
            breakdown,
            earned,
            streak_ended,
        }
    }

    /// End the active streak, if any, and reset the flip detector with it.
    pub fn end_streak(
        &mut self,
        reason: StreakEndReason,
        now: Timestamp,
        config: &SkillRaceConfig,
        events: &mut Vec<FlightEvent>,
    ) -> Option<StreakSummary> {
        let summary = self.streak.terminate(reason, now, &config.streak, events)?;
        events.push(FlightEvent::StreakEnded(summary.clone()));
        if self.flip.reset() {
            events.push(FlightEvent::FlipReset);
        }
        Some(summary)
    }

    /// Flight-info view as of `now`.
    pub fn snapshot(&self, now: Timestamp, config: &SkillRaceConfig) -> FlightSnapshot {
        let streak_multiplier = self.streak.multiplier(now);
        let mut snapshot = FlightSnapshot {
            player: Some(self.player),
            position: self.last_position,
            streak_multiplier,
            flight_score: self.flight_score,
            streak: self.streak.view(now, &config.streak),
            speed_multiplier: NEUTRAL_MULTIPLIER,
            location_multiplier: NEUTRAL_MULTIPLIER,
            ..FlightSnapshot::default()
        };
        if let Some(last) = &self.last_tick {
            snapshot.speed = last.vehicle.speed;
            snapshot.ground_distance = last.terrain.ground_distance;
            snapshot.location = last.terrain.location;
            snapshot.speed_multiplier = last.breakdown.speed_multiplier;
            snapshot.location_multiplier = last.breakdown.location_multiplier;
        }
        snapshot.total_multiplier =
            snapshot.speed_multiplier * snapshot.location_multiplier * streak_multiplier;
        snapshot
    }
}
