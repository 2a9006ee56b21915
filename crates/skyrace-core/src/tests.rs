#[cfg(test)]
mod tests {
    use crate::config::{ConfigError, SkillRaceConfig};
    use crate::constants::*;
    use crate::enums::*;
    use crate::events::{FlightEvent, Notification, StreakSummary};
    use crate::records::{difficulty_name, leaderboard, rank_of, PlayerRecord, Zone};
    use crate::sensors::{
        FlatTerrain, TerrainReading, TerrainSensor, VehicleBoard, VehicleReading, VehicleSensor,
    };
    use crate::sinks::{NotificationSink, SharedSink};
    use crate::types::{elapsed, PlayerId, Position, VehicleHandle, ZoneId};

    fn record(id: u64, name: &str, total: f64) -> PlayerRecord {
        let mut record = PlayerRecord::new(PlayerId(id), name);
        record.total_score = total;
        record
    }

    // ---- Config ----

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SkillRaceConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SkillRaceConfig::default());
        assert_eq!(config.scoring.interval_secs, SCORING_INTERVAL_SECS);
        assert_eq!(config.streak.qualify_duration_secs, STREAK_QUALIFY_DURATION);
        assert_eq!(config.flip.risk_curve, RiskCurve::Linear);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let json = r#"{
            "flip": { "risk_curve": "exponential", "base_points": 400.0 },
            "zones": { "difficulty_multipliers": { "1": 1.25 } }
        }"#;
        let config = SkillRaceConfig::from_json_str(json).unwrap();
        assert_eq!(config.flip.risk_curve, RiskCurve::Exponential);
        assert_eq!(config.flip.base_points, 400.0);
        assert_eq!(config.flip.min_speed, FLIP_MIN_SPEED);
        assert_eq!(config.zones.difficulty_multiplier(1), 1.25);
        // Tiers left out of the override map keep their defaults.
        assert_eq!(config.zones.difficulty_multiplier(2), 1.5);
        assert_eq!(config.zones.difficulty_multiplier(3), 2.0);
        assert_eq!(config.zones.difficulty_multiplier(4), 3.0);
        assert_eq!(config.zones.difficulty_multiplier(5), 5.0);
        assert_eq!(config.zones.difficulty_multipliers.len(), 5);
        assert_eq!(config.scoring.speed_multiplier_base, SPEED_MULTIPLIER_BASE);
    }

    #[test]
    fn test_unknown_difficulty_is_neutral() {
        let config = SkillRaceConfig::default();
        assert_eq!(config.zones.difficulty_multiplier(5), 5.0);
        assert_eq!(config.zones.difficulty_multiplier(9), NEUTRAL_MULTIPLIER);
    }

    #[test]
    fn test_sanitized_replaces_invalid_values() {
        let json = r#"{
            "scoring": { "interval_secs": 0.0, "speed_multiplier_base": -4.0 },
            "streak": { "damage_penalty_rate": 1.7 },
            "flip": { "max_altitude_for_risk_bonus": 0.0 }
        }"#;
        let config = SkillRaceConfig::from_json_str(json).unwrap();
        assert_eq!(config.scoring.interval_secs, SCORING_INTERVAL_SECS);
        assert_eq!(config.scoring.speed_multiplier_base, SPEED_MULTIPLIER_BASE);
        assert_eq!(config.streak.damage_penalty_rate, DAMAGE_STREAK_PENALTY_RATE);
        assert_eq!(
            config.flip.max_altitude_for_risk_bonus,
            FLIP_MAX_ALTITUDE_FOR_RISK_BONUS
        );
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let err = SkillRaceConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_config_file_falls_back() {
        let path = std::env::temp_dir().join("skyrace_missing_config_file.json");
        let _ = std::fs::remove_file(&path);
        let err = SkillRaceConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(
            SkillRaceConfig::load_or_default(Some(&path)),
            SkillRaceConfig::default()
        );
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = std::env::temp_dir().join("skyrace_test_config_file");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = SkillRaceConfig::default();
        config.scoring.destruction_penalty = 750.0;
        config.features.realtime_scoring = false;
        std::fs::write(&path, config.to_json_pretty().unwrap()).unwrap();

        let loaded = SkillRaceConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_location_multiplier_lookup() {
        let config = SkillRaceConfig::default();
        assert_eq!(config.locations.multiplier(LocationKind::TrainTunnel), 2.5);
        assert_eq!(config.locations.multiplier(LocationKind::Forest), 2.0);
        assert_eq!(config.locations.multiplier(LocationKind::Default), 1.0);
    }

    // ---- Records ----

    #[test]
    fn test_leaderboard_orders_by_score_then_name() {
        let records = vec![
            record(1, "charlie", 50.0),
            record(2, "alpha", 120.0),
            record(3, "bravo", 50.0),
            record(4, "delta", -30.0),
        ];
        let board = leaderboard(&records, 10);
        let names: Vec<&str> = board.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "bravo", "charlie", "delta"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[3].rank, 4);
    }

    #[test]
    fn test_leaderboard_truncates() {
        let records: Vec<PlayerRecord> = (0..15)
            .map(|i| record(i, &format!("p{i:02}"), i as f64))
            .collect();
        let board = leaderboard(&records, LEADERBOARD_SIZE);
        assert_eq!(board.len(), LEADERBOARD_SIZE);
        assert_eq!(board[0].player_id, PlayerId(14));
    }

    #[test]
    fn test_rank_of() {
        let records = vec![record(1, "a", 10.0), record(2, "b", 30.0)];
        assert_eq!(rank_of(&records, PlayerId(2)), Some(1));
        assert_eq!(rank_of(&records, PlayerId(1)), Some(2));
        assert_eq!(rank_of(&records, PlayerId(3)), None);
    }

    #[test]
    fn test_player_record_tolerates_missing_fields() {
        let json = r#"{ "player_id": 76561198000000001, "total_score": 12.5 }"#;
        let record: PlayerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.player_id, PlayerId(76561198000000001));
        assert_eq!(record.total_score, 12.5);
        assert_eq!(record.best_streak_points, 0.0);
        assert!(record.display_name.is_empty());
    }

    #[test]
    fn test_zone_contains() {
        let zone = Zone {
            id: ZoneId::new("abcd1234"),
            name: "Gate".into(),
            center: Position::new(0.0, 10.0, 0.0),
            radius: 15.0,
            difficulty: 3,
            created_by: "admin".into(),
        };
        assert!(zone.contains(Position::new(10.0, 10.0, 10.0)));
        assert!(!zone.contains(Position::new(20.0, 10.0, 0.0)));
    }

    #[test]
    fn test_difficulty_names() {
        assert_eq!(difficulty_name(1), "Easy");
        assert_eq!(difficulty_name(5), "Insane");
        assert_eq!(difficulty_name(0), "Unknown");
    }

    // ---- Events ----

    #[test]
    fn test_event_json_is_tagged() {
        let event = FlightEvent::StreakEnded(StreakSummary {
            reason: StreakEndReason::Damage,
            duration_secs: 42.0,
            final_multiplier: 1.6,
            points: 400.0,
            penalty: 200.0,
            net_points: 200.0,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StreakEnded");
        assert_eq!(json["reason"], "damage");

        let zone = FlightEvent::ZoneTriggered {
            zone_id: ZoneId::new("00ff00ff"),
            name: "Arch".into(),
            difficulty: 2,
            bonus: 225.0,
            chain_multiplier: 1.0,
        };
        let json = serde_json::to_string(&zone).unwrap();
        let back: FlightEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zone);
    }

    #[test]
    fn test_penalized_reasons() {
        assert!(StreakEndReason::Damage.is_penalized());
        assert!(StreakEndReason::Destroyed.is_penalized());
        assert!(!StreakEndReason::Speed.is_penalized());
        assert!(!StreakEndReason::Altitude.is_penalized());
        assert!(!StreakEndReason::SessionEnded.is_penalized());
    }

    // ---- Sensors / sinks ----

    #[test]
    fn test_vehicle_board_shares_readings() {
        let board = VehicleBoard::new();
        let engine_side = board.clone();
        let handle = VehicleHandle(7);
        assert!(engine_side.read(handle).is_err());

        let reading = VehicleReading {
            speed: 22.0,
            up_y: 0.9,
            position: Position::new(1.0, 5.0, 2.0),
        };
        board.publish(handle, reading);
        assert_eq!(engine_side.read(handle).unwrap(), reading);

        board.remove(handle);
        assert!(engine_side.read(handle).is_err());
    }

    #[test]
    fn test_vehicle_upright_threshold() {
        let mut reading = VehicleReading::unavailable(Position::ZERO);
        assert!(reading.is_upright(FLIP_UPSIDE_DOWN_THRESHOLD));
        reading.up_y = -0.8;
        assert!(!reading.is_upright(FLIP_UPSIDE_DOWN_THRESHOLD));
    }

    #[test]
    fn test_flat_terrain_distance() {
        let terrain = FlatTerrain::new(0.0);
        let reading = terrain.classify(Position::new(0.0, 6.5, 0.0)).unwrap();
        assert_eq!(reading.ground_distance, 6.5);
        let high = terrain.classify(Position::new(0.0, 900.0, 0.0)).unwrap();
        assert_eq!(high.ground_distance, NO_GROUND_DISTANCE);
        assert_eq!(TerrainReading::unavailable().multiplier, NEUTRAL_MULTIPLIER);
    }

    #[test]
    fn test_shared_sink_drains() {
        let sink = SharedSink::new();
        let mut engine_side = sink.clone();
        engine_side.emit(Notification::new(PlayerId(1), FlightEvent::StreakStarted));
        engine_side.emit(Notification::new(PlayerId(1), FlightEvent::FlipReset));
        assert_eq!(sink.drain().len(), 2);
        assert!(sink.drain().is_empty());
    }

    #[test]
    fn test_elapsed_never_negative() {
        assert_eq!(elapsed(10.0, 4.0), 6.0);
        assert_eq!(elapsed(3.0, 4.0), 0.0);
    }
}
