//! Engine tests: full scoring passes driven through scripted sensors.

use skyrace_core::config::SkillRaceConfig;
use skyrace_core::enums::*;
use skyrace_core::events::FlightEvent;
use skyrace_core::records::{PlayerRecord, Zone};
use skyrace_core::sensors::{FlatTerrain, TerrainSensor, VehicleBoard, VehicleReading};
use skyrace_core::sinks::SharedSink;
use skyrace_core::types::{PlayerId, Position, VehicleHandle, ZoneId};
use skyrace_store::MemoryStore;
use skyrace_terrain::{TerrainGrid, TerrainHeader};

use crate::engine::{Collaborators, EngineConfig, EngineError, SkillRaceEngine};
use crate::zones::{NewZone, ZoneRegistry};

const PILOT: PlayerId = PlayerId(76561198000000001);
const WINGMAN: PlayerId = PlayerId(76561198000000002);
const HELI: VehicleHandle = VehicleHandle(1);
const HELI_2: VehicleHandle = VehicleHandle(2);

struct Harness {
    engine: SkillRaceEngine,
    board: VehicleBoard,
    sink: SharedSink,
    store: MemoryStore,
}

fn harness_full(rules: SkillRaceConfig, store: MemoryStore, terrain: Box<dyn TerrainSensor>) -> Harness {
    let board = VehicleBoard::new();
    let sink = SharedSink::new();
    let engine = SkillRaceEngine::new(
        EngineConfig {
            rules,
            zone_seed: 7,
        },
        Collaborators {
            terrain,
            vehicles: Box::new(board.clone()),
            store: Box::new(store.clone()),
            sink: Box::new(sink.clone()),
        },
    );
    Harness {
        engine,
        board,
        sink,
        store,
    }
}

fn harness_with(rules: SkillRaceConfig) -> Harness {
    harness_full(rules, MemoryStore::new(), Box::new(FlatTerrain::new(0.0)))
}

fn harness() -> Harness {
    harness_with(SkillRaceConfig::default())
}

impl Harness {
    /// Publish a reading at `altitude` meters above the flat ground.
    fn fly(&self, vehicle: VehicleHandle, altitude: f64, speed: f64, up_y: f64) {
        self.board.publish(
            vehicle,
            VehicleReading {
                speed,
                up_y,
                position: Position::new(0.0, altitude, 0.0),
            },
        );
    }

    /// Tick every 0.5 s from `from` through `to`.
    fn run(&mut self, from: f64, to: f64) {
        let mut t = from;
        while t <= to + 1e-9 {
            self.engine.tick(t);
            t += 0.5;
        }
    }

    fn total(&self, player: PlayerId) -> f64 {
        self.engine.record(player).map_or(0.0, |r| r.total_score)
    }

    fn events(&self) -> Vec<FlightEvent> {
        self.sink.drain().into_iter().map(|n| n.event).collect()
    }

    fn streak_points(&self, player: PlayerId) -> f64 {
        self.engine
            .snapshot(player)
            .map_or(0.0, |snapshot| snapshot.streak.points)
    }

    fn phase(&self, player: PlayerId) -> Option<StreakPhase> {
        self.engine.snapshot(player).map(|s| s.streak.phase)
    }

    /// Fly low and fast until the streak has run for a while.
    fn active_streak(&mut self) {
        self.engine.begin_session(PILOT, "ace", HELI, 0.0);
        self.fly(HELI, 5.0, 15.0, 1.0);
        self.run(0.0, 30.0);
        assert_eq!(self.phase(PILOT), Some(StreakPhase::Active));
    }
}

fn count(events: &[FlightEvent], pred: impl Fn(&FlightEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

// ---- Streak lifecycle ----

#[test]
fn test_streak_qualifies_then_escalates() {
    let mut h = harness();
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.fly(HELI, 5.0, 15.0, 1.0);

    h.run(0.0, 9.5);
    assert_eq!(h.phase(PILOT), Some(StreakPhase::Qualifying));
    // 20 ticks of 7.5 proximity × 1.0 speed × 1.0 location × 0.5 s.
    assert!((h.total(PILOT) - 75.0).abs() < 1e-6);

    h.engine.tick(10.0);
    let snapshot = h.engine.snapshot(PILOT).unwrap();
    assert_eq!(snapshot.streak.phase, StreakPhase::Active);
    assert_eq!(snapshot.streak_multiplier, 1.0);

    h.run(10.5, 60.0);
    let snapshot = h.engine.snapshot(PILOT).unwrap();
    assert_eq!(snapshot.streak_multiplier, 2.0);
    assert!((snapshot.streak.elapsed_secs - 50.0).abs() < 1e-9);

    h.run(60.5, 70.0);
    let events = h.events();
    assert_eq!(count(&events, |e| matches!(e, FlightEvent::StreakStarted)), 1);
    assert_eq!(
        count(&events, |e| matches!(
            e,
            FlightEvent::StreakMilestone { multiplier, .. } if *multiplier == 2.0
        )),
        1
    );
}

#[test]
fn test_qualification_lost_before_duration() {
    let mut h = harness();
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.fly(HELI, 5.0, 15.0, 1.0);
    h.run(0.0, 9.5);

    h.fly(HELI, 50.0, 15.0, 1.0);
    h.engine.tick(10.0);
    assert_eq!(h.phase(PILOT), Some(StreakPhase::Idle));

    let events = h.events();
    assert!(events.contains(&FlightEvent::QualificationLost));
    assert!(!events.contains(&FlightEvent::StreakStarted));
}

#[test]
fn test_short_climb_is_forgiven() {
    let mut h = harness();
    h.active_streak();
    h.events();

    h.fly(HELI, 40.0, 15.0, 1.0);
    h.run(30.5, 32.0);
    assert_eq!(h.phase(PILOT), Some(StreakPhase::Active));
    let countdown = h.engine.snapshot(PILOT).unwrap().streak.altitude_countdown;
    assert!((countdown.unwrap() - 1.5).abs() < 1e-9);

    h.fly(HELI, 5.0, 15.0, 1.0);
    h.engine.tick(32.5);
    assert_eq!(h.phase(PILOT), Some(StreakPhase::Active));
    let events = h.events();
    assert!(events.contains(&FlightEvent::ForgivenessEnded {
        kind: ForgivenessKind::Altitude,
        expired: false,
    }));
}

#[test]
fn test_damage_mid_climb_closes_forgiveness() {
    let mut h = harness();
    h.active_streak();
    h.fly(HELI, 40.0, 15.0, 1.0);
    h.engine.tick(30.5);
    h.events();

    h.engine.on_vehicle_damaged(PILOT, 10.0, 31.0);
    let events = h.events();
    let closed = events
        .iter()
        .position(|e| {
            *e == FlightEvent::ForgivenessEnded {
                kind: ForgivenessKind::Altitude,
                expired: false,
            }
        })
        .unwrap();
    let ended = events
        .iter()
        .position(|e| matches!(e, FlightEvent::StreakEnded(_)))
        .unwrap();
    assert!(closed < ended);
    assert_eq!(h.engine.snapshot(PILOT).unwrap().streak.altitude_countdown, None);
}

#[test]
fn test_slow_flight_ends_streak_without_penalty() {
    let mut h = harness();
    h.active_streak();
    let points = h.streak_points(PILOT);
    let total = h.total(PILOT);
    h.events();

    h.fly(HELI, 5.0, 3.0, 1.0);
    h.run(30.5, 34.0);
    assert_eq!(h.phase(PILOT), Some(StreakPhase::Idle));

    let ended: Vec<_> = h
        .events()
        .into_iter()
        .filter_map(|e| match e {
            FlightEvent::StreakEnded(summary) => Some(summary),
            _ => None,
        })
        .collect();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].reason, StreakEndReason::Speed);
    assert_eq!(ended[0].penalty, 0.0);
    assert!(ended[0].points >= points);

    // Nothing was taken back; only more points were earned.
    assert!(h.total(PILOT) >= total);
    assert_eq!(
        h.engine.record(PILOT).unwrap().best_streak_points,
        ended[0].net_points
    );
}

// ---- Penalties ----

#[test]
fn test_damage_takes_half_the_streak() {
    let mut rules = SkillRaceConfig::default();
    rules.features.damage_penalties = false;
    let mut h = harness_with(rules);
    h.active_streak();

    let points = h.streak_points(PILOT);
    assert!(points > 0.0);
    let before = h.total(PILOT);
    h.events();

    h.engine.on_vehicle_damaged(PILOT, 40.0, 30.2);
    assert!((before - h.total(PILOT) - 0.5 * points).abs() < 1e-6);
    assert_eq!(h.phase(PILOT), Some(StreakPhase::Idle));

    let events = h.events();
    let summary = events
        .iter()
        .find_map(|e| match e {
            FlightEvent::StreakEnded(summary) => Some(summary.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(summary.reason, StreakEndReason::Damage);
    assert!((summary.net_points - 0.5 * points).abs() < 1e-6);
    assert!((h.engine.record(PILOT).unwrap().best_streak_points - 0.5 * points).abs() < 1e-6);

    // Second hit: the streak is gone, nothing more is taken.
    let after = h.total(PILOT);
    h.engine.on_vehicle_damaged(PILOT, 40.0, 30.3);
    assert_eq!(h.total(PILOT), after);

    // Crash cooldown blocks qualifying for the end-display duration.
    h.engine.tick(31.0);
    assert_eq!(h.phase(PILOT), Some(StreakPhase::Idle));
    h.engine.tick(33.5);
    assert_eq!(h.phase(PILOT), Some(StreakPhase::Qualifying));
}

#[test]
fn test_damage_penalties_stack_by_default() {
    let mut h = harness();
    h.active_streak();
    let points = h.streak_points(PILOT);
    let before = h.total(PILOT);

    h.engine.on_vehicle_damaged(PILOT, 40.0, 30.2);
    assert!((before - h.total(PILOT) - (0.5 * points + 40.0)).abs() < 1e-6);
}

#[test]
fn test_exclusive_damage_penalties() {
    let mut rules = SkillRaceConfig::default();
    rules.streak.stack_damage_penalties = false;
    let mut h = harness_with(rules);
    h.active_streak();
    let points = h.streak_points(PILOT);
    let before = h.total(PILOT);

    h.engine.on_vehicle_damaged(PILOT, 40.0, 30.2);
    assert!((before - h.total(PILOT) - 0.5 * points).abs() < 1e-6);

    // Without a streak to forfeit, the damage-point penalty applies.
    let before = h.total(PILOT);
    h.engine.on_vehicle_damaged(PILOT, 40.0, 30.4);
    assert!((before - h.total(PILOT) - 40.0).abs() < 1e-6);
}

#[test]
fn test_tunnel_damage_is_doubled() {
    let mut h = harness();
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.fly(HELI, -30.0, 15.0, 1.0);
    h.engine.tick(0.0);
    let before = h.total(PILOT);

    h.engine.on_vehicle_damaged(PILOT, 10.0, 0.1);
    assert!((before - h.total(PILOT) - 20.0).abs() < 1e-6);
    assert!(h.events().contains(&FlightEvent::DamagePenalty {
        points: 20.0,
        damage: 10.0,
        in_tunnel: true,
    }));
}

#[test]
fn test_destruction_penalties_and_teardown() {
    let mut rules = SkillRaceConfig::default();
    rules.features.damage_penalties = false;
    let mut h = harness_with(rules);
    h.active_streak();
    let points = h.streak_points(PILOT);
    let before = h.total(PILOT);
    let flight_score = h.engine.session(PILOT).unwrap().flight_score;

    h.engine.on_vehicle_destroyed(PILOT, 30.2);
    assert!((before - h.total(PILOT) - (0.75 * points + 500.0)).abs() < 1e-6);
    assert!(!h.engine.is_tracking(PILOT));

    let record = h.engine.record(PILOT).unwrap();
    assert_eq!(record.highest_score, flight_score);
    assert_eq!(record.last_played, Some(30.2));

    let events = h.events();
    assert!(events.contains(&FlightEvent::DestructionPenalty { points: 500.0 }));
    assert_eq!(
        count(&events, |e| matches!(e, FlightEvent::StreakEnded(_))),
        1
    );
}

#[test]
fn test_untracked_player_events_are_ignored() {
    let mut h = harness();
    h.engine.on_vehicle_damaged(PlayerId(999), 50.0, 1.0);
    h.engine.on_vehicle_destroyed(PlayerId(999), 1.0);
    assert_eq!(h.engine.end_session(PlayerId(999), 1.0), None);
    assert!(h.events().is_empty());
    assert!(h.engine.record(PlayerId(999)).is_none());
}

// ---- Flips ----

#[test]
fn test_flip_award_uses_closest_approach() {
    let mut h = harness();
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);

    let script = [
        (0.0, 80.0, -0.9),
        (0.5, 40.0, -0.9),
        (1.0, 12.0, -0.9),
        (1.5, 30.0, 0.9),
        (2.0, 60.0, 0.9),
        (2.5, 60.0, 0.9),
        (3.0, 60.0, 0.9),
        (3.5, 60.0, 0.9),
        (4.0, 60.0, 0.9),
        (4.5, 60.0, 0.9),
        (5.0, 60.0, 0.9),
    ];
    for (t, altitude, up_y) in script {
        h.fly(HELI, altitude, 20.0, up_y);
        h.engine.tick(t);
    }

    let events = h.events();
    let awards: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            FlightEvent::FlipAwarded {
                points,
                closest_ground_distance,
                risk_multiplier,
            } => Some((*points, *closest_ground_distance, *risk_multiplier)),
            _ => None,
        })
        .collect();
    assert_eq!(awards.len(), 1);
    let (points, closest, multiplier) = awards[0];
    assert_eq!(closest, 12.0);
    assert!((multiplier - 8.92).abs() < 1e-9);
    assert!((points - 2230.0).abs() < 1e-6);

    // High flight earns nothing else, so the flip is the whole score.
    assert!((h.engine.session(PILOT).unwrap().flight_score - 2230.0).abs() < 1e-6);
    assert!((h.total(PILOT) - 2230.0).abs() < 1e-6);
}

#[test]
fn test_damage_resets_flip_in_progress() {
    let mut h = harness();
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.fly(HELI, 50.0, 20.0, -0.9);
    h.engine.tick(0.0);
    assert!(h.engine.session(PILOT).unwrap().flip.in_progress());

    h.engine.on_vehicle_damaged(PILOT, 1.0, 0.2);
    assert!(!h.engine.session(PILOT).unwrap().flip.in_progress());
    assert!(h.events().contains(&FlightEvent::FlipReset));
}

// ---- Zones ----

#[test]
fn test_zone_cooldown_through_engine() {
    let mut h = harness();
    h.engine
        .zones_mut()
        .create(NewZone {
            name: Some("Gate".into()),
            center: Position::new(0.0, 5.0, 0.0),
            radius: 20.0,
            difficulty: 2,
            created_by: "admin".into(),
        })
        .unwrap();
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.fly(HELI, 5.0, 20.0, 1.0);

    h.engine.tick(0.0);
    // 3.75 base + 1.5 × 1.5 × 100 zone bonus.
    assert!((h.total(PILOT) - 228.75).abs() < 1e-6);

    h.run(0.5, 29.5);
    let triggered = |events: &[FlightEvent]| {
        count(events, |e| matches!(e, FlightEvent::ZoneTriggered { .. }))
    };
    assert_eq!(triggered(&h.events()), 1);

    h.engine.tick(30.0);
    assert_eq!(triggered(&h.events()), 1);
}

#[test]
fn test_loaded_zones_score_together() {
    let mut h = harness();
    let saved = |id: &str, x: f64, radius: f64| Zone {
        id: ZoneId::new(id),
        name: id.into(),
        center: Position::new(x, 5.0, 0.0),
        radius,
        difficulty: 1,
        created_by: "import".into(),
    };
    *h.engine.zones_mut() = ZoneRegistry::from_zones(
        [
            saved("000000aa", 190.0, 200.0),
            saved("000000bb", 0.0, 20.0),
            saved("000000cc", 250.0, 300.0),
        ],
        7,
    );
    assert_eq!(h.engine.zones().len(), 2);

    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.fly(HELI, 5.0, 20.0, 1.0);
    h.engine.tick(0.0);

    // 3.75 base + 150 for the first zone + 150 × 3.0 for the chained second.
    assert!((h.total(PILOT) - 603.75).abs() < 1e-6);
    let events = h.events();
    assert_eq!(
        count(&events, |e| matches!(e, FlightEvent::ZoneTriggered { .. })),
        2
    );
    let delta = |wanted: PointSource| {
        events.iter().find_map(|e| match e {
            FlightEvent::ScoreDelta { points, source } if *source == wanted => Some(*points),
            _ => None,
        })
    };
    assert!((delta(PointSource::Zone).unwrap() - 600.0).abs() < 1e-6);
    assert!((delta(PointSource::Flight).unwrap() - 3.75).abs() < 1e-6);
}

// ---- Session lifecycle ----

#[test]
fn test_end_session_finalizes_flight() {
    let mut h = harness();
    h.active_streak();
    let points = h.streak_points(PILOT);
    h.events();

    let flight_score = h.engine.end_session(PILOT, 30.2).unwrap();
    assert!(!h.engine.is_tracking(PILOT));

    let record = h.engine.record(PILOT).unwrap();
    assert_eq!(record.highest_score, flight_score);
    assert_eq!(record.best_streak_points, points);
    assert_eq!(record.last_played, Some(30.2));
    assert_eq!(record.display_name, "ace");

    let events = h.events();
    assert!(events.iter().any(|e| matches!(
        e,
        FlightEvent::StreakEnded(summary)
            if summary.reason == StreakEndReason::SessionEnded && summary.penalty == 0.0
    )));
    assert!(events.contains(&FlightEvent::NewStreakRecord { points }));

    // Persisted.
    assert_eq!(h.store.get(PILOT).unwrap().highest_score, flight_score);
    assert_eq!(h.engine.end_session(PILOT, 31.0), None);
}

#[test]
fn test_deferred_scoring_credits_at_flight_end() {
    let mut rules = SkillRaceConfig::default();
    rules.features.realtime_scoring = false;
    let mut h = harness_with(rules);
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.fly(HELI, 5.0, 15.0, 1.0);
    h.run(0.0, 5.0);
    assert_eq!(h.total(PILOT), 0.0);

    let flight_score = h.engine.end_session(PILOT, 5.2).unwrap();
    assert!(flight_score > 0.0);
    assert_eq!(h.total(PILOT), flight_score);
}

#[test]
fn test_location_multiplier_toggle() {
    let forest = FlatTerrain {
        location: LocationKind::Forest,
        multiplier: 2.0,
        ..FlatTerrain::new(0.0)
    };
    let mut on = harness_full(SkillRaceConfig::default(), MemoryStore::new(), Box::new(forest));
    let mut rules = SkillRaceConfig::default();
    rules.features.location_multipliers = false;
    let mut off = harness_full(rules, MemoryStore::new(), Box::new(forest));

    for h in [&mut on, &mut off] {
        h.engine.begin_session(PILOT, "ace", HELI, 0.0);
        h.fly(HELI, 5.0, 15.0, 1.0);
        h.engine.tick(0.0);
    }
    assert!((on.total(PILOT) - 7.5).abs() < 1e-6);
    assert!((off.total(PILOT) - 3.75).abs() < 1e-6);
    assert_eq!(
        on.engine.snapshot(PILOT).unwrap().location,
        LocationKind::Forest
    );
}

// ---- Failure handling ----

#[test]
fn test_missing_vehicle_reading_scores_nothing() {
    let mut h = harness();
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.run(0.0, 5.0);
    assert!(h.engine.is_tracking(PILOT));
    assert_eq!(h.engine.session(PILOT).unwrap().flight_score, 0.0);
    assert_eq!(h.phase(PILOT), Some(StreakPhase::Idle));
}

#[test]
fn test_terrain_outside_grid_means_no_ground() {
    let grid = TerrainGrid::new(
        TerrainHeader {
            origin_x: 1000.0,
            origin_z: 1000.0,
            cell_size: 10.0,
            width: 4,
            height: 4,
            water_level: 0.0,
        },
        vec![0.0; 16],
    );
    let mut h = harness_full(SkillRaceConfig::default(), MemoryStore::new(), Box::new(grid));
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.fly(HELI, 5.0, 15.0, 1.0);
    h.engine.tick(0.0);

    let snapshot = h.engine.snapshot(PILOT).unwrap();
    assert_eq!(snapshot.ground_distance, 200.0);
    assert_eq!(snapshot.location_multiplier, 1.0);
    assert_eq!(snapshot.flight_score, 0.0);
}

#[test]
fn test_store_outage_keeps_scoring_in_memory() {
    let store = MemoryStore::new();
    store.set_offline(true);
    let mut h = harness_full(
        SkillRaceConfig::default(),
        store,
        Box::new(FlatTerrain::new(0.0)),
    );
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.fly(HELI, 5.0, 15.0, 1.0);
    h.run(0.0, 2.0);
    assert!(h.total(PILOT) > 0.0);
    assert!(h.store.get(PILOT).is_none());

    h.store.set_offline(false);
    h.engine.tick(2.5);
    assert_eq!(h.store.get(PILOT).unwrap().total_score, h.total(PILOT));
}

#[test]
fn test_one_write_per_tick() {
    let mut h = harness();
    h.engine.begin_session(PILOT, "ace", HELI, 0.0);
    h.engine.begin_session(WINGMAN, "wing", HELI_2, 0.0);
    h.fly(HELI, 5.0, 15.0, 1.0);
    h.fly(HELI_2, 3.0, 25.0, 1.0);

    let writes = h.store.writes();
    h.engine.tick(0.0);
    assert_eq!(h.store.writes(), writes + 1);
    assert!(h.store.get(PILOT).unwrap().total_score > 0.0);
    assert!(h.store.get(WINGMAN).unwrap().total_score > 0.0);
}

// ---- Records ----

fn seeded_records() -> MemoryStore {
    let make = |id: u64, name: &str, total: f64| {
        let mut record = PlayerRecord::new(PlayerId(id), name);
        record.total_score = total;
        record
    };
    MemoryStore::with_records([
        make(10, "alpha", 500.0),
        make(11, "bravo", 300.0),
        make(12, "Bravo Two", 100.0),
    ])
}

#[test]
fn test_leaderboard_and_stats() {
    let mut h = harness_full(
        SkillRaceConfig::default(),
        seeded_records(),
        Box::new(FlatTerrain::new(0.0)),
    );
    let names: Vec<String> = h
        .engine
        .leaderboard()
        .into_iter()
        .map(|e| e.display_name)
        .collect();
    assert_eq!(names, vec!["alpha", "bravo", "Bravo Two"]);
    assert_eq!(h.engine.rank_of(PlayerId(11)), Some(2));

    h.engine.begin_session(PlayerId(12), "Bravo Two", HELI, 0.0);
    h.fly(HELI, 5.0, 15.0, 1.0);
    h.run(0.0, 10.0);
    let stats = h.engine.player_stats(PlayerId(12)).unwrap();
    assert!(stats.current_flight_score.unwrap() > 0.0);
    assert_eq!(stats.current_streak_secs, Some(0.0));
    assert_eq!(stats.rank, Some(3));
    assert!(h.engine.player_stats(PlayerId(404)).is_none());
}

#[test]
fn test_remove_player_by_name() {
    let mut h = harness_full(
        SkillRaceConfig::default(),
        seeded_records(),
        Box::new(FlatTerrain::new(0.0)),
    );
    assert_eq!(
        h.engine.remove_player_by_name("o").unwrap_err(),
        EngineError::AmbiguousPlayer {
            query: "o".into(),
            count: 2
        }
    );
    assert_eq!(
        h.engine.remove_player_by_name("zulu").unwrap_err(),
        EngineError::PlayerNotFound("zulu".into())
    );

    // Exact (case-insensitive) name wins over the partial match.
    let removed = h.engine.remove_player_by_name("BRAVO").unwrap();
    assert_eq!(removed.player_id, PlayerId(11));
    assert!(h.store.get(PlayerId(11)).is_none());

    let removed = h.engine.remove_player_by_name("two").unwrap();
    assert_eq!(removed.player_id, PlayerId(12));

    assert_eq!(h.engine.reset_all_records(), 1);
    assert!(h.engine.leaderboard().is_empty());
    assert!(h.store.get(PlayerId(10)).is_none());
}

// ---- Determinism ----

#[test]
fn test_same_script_same_notifications() {
    let script = |h: &mut Harness| {
        h.engine
            .zones_mut()
            .create(NewZone {
                name: None,
                center: Position::new(0.0, 5.0, 0.0),
                radius: 30.0,
                difficulty: 5,
                created_by: "admin".into(),
            })
            .unwrap();
        h.engine.begin_session(PILOT, "ace", HELI, 0.0);
        for i in 0..200 {
            let t = i as f64 * 0.5;
            let altitude = 4.0 + (i % 7) as f64;
            let up_y = if i % 40 < 6 { -0.9 } else { 1.0 };
            h.fly(HELI, altitude, 12.0 + (i % 5) as f64, up_y);
            h.engine.tick(t);
        }
        h.engine.end_session(PILOT, 100.0);
        serde_json::to_string(&h.sink.drain()).unwrap()
    };

    let mut a = harness();
    let mut b = harness();
    assert_eq!(script(&mut a), script(&mut b));
}
