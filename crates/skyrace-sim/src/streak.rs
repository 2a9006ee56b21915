//! Streak lifecycle: qualification, activation, forgiveness, milestones and
//! termination.
//!
//! The primary state is an explicit enum; the two forgiveness windows are
//! orthogonal sub-states that only exist while a streak is active. All timers
//! are "seconds since a stored timestamp", evaluated fresh on every update.

use skyrace_core::config::StreakConfig;
use skyrace_core::constants::*;
use skyrace_core::enums::{ForgivenessKind, StreakEndReason, StreakPhase};
use skyrace_core::events::{FlightEvent, StreakSummary};
use skyrace_core::state::StreakView;
use skyrace_core::types::{elapsed, Timestamp};

/// Streak multiplier for `duration` seconds of active streak.
///
/// Step function over [`STREAK_MULTIPLIER_TABLE`]; each bound is exclusive.
pub fn streak_multiplier(duration: f64) -> f64 {
    STREAK_MULTIPLIER_TABLE
        .iter()
        .find(|(bound, _)| duration < *bound)
        .map_or(STREAK_MAX_MULTIPLIER, |(_, multiplier)| *multiplier)
}

/// Raw pass/fail of the two base conditions for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakConditions {
    pub altitude_ok: bool,
    pub speed_ok: bool,
}

impl StreakConditions {
    pub fn evaluate(ground_distance: f64, speed: f64, config: &StreakConfig) -> Self {
        Self {
            altitude_ok: ground_distance <= config.altitude_limit,
            speed_ok: speed >= config.speed_threshold,
        }
    }
}

/// One grace window for a failing condition.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForgivenessWindow {
    since: Option<Timestamp>,
}

impl ForgivenessWindow {
    pub fn is_open(&self) -> bool {
        self.since.is_some()
    }

    /// Seconds left, if the window is open.
    pub fn remaining(&self, now: Timestamp, window_secs: f64) -> Option<f64> {
        self.since
            .map(|since| (window_secs - elapsed(now, since)).max(0.0))
    }

    /// Close the window without waiting for the condition, e.g. when the
    /// streak ends while it is open.
    fn close(&mut self, kind: ForgivenessKind, events: &mut Vec<FlightEvent>) {
        if self.since.take().is_some() {
            events.push(FlightEvent::ForgivenessEnded {
                kind,
                expired: false,
            });
        }
    }

    /// Advance one tick. Returns true while the failing condition is forgiven.
    fn step(
        &mut self,
        kind: ForgivenessKind,
        ok: bool,
        now: Timestamp,
        window_secs: f64,
        events: &mut Vec<FlightEvent>,
    ) -> bool {
        match (self.since, ok) {
            (None, false) => {
                self.since = Some(now);
                events.push(FlightEvent::ForgivenessStarted {
                    kind,
                    window_secs,
                });
            }
            (Some(_), true) => {
                self.since = None;
                events.push(FlightEvent::ForgivenessEnded {
                    kind,
                    expired: false,
                });
                return false;
            }
            _ => {}
        }

        let Some(since) = self.since else {
            return false;
        };
        if elapsed(now, since) >= window_secs {
            self.since = None;
            events.push(FlightEvent::ForgivenessEnded {
                kind,
                expired: true,
            });
            return false;
        }
        true
    }
}

/// Bookkeeping of a running streak.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStreak {
    pub started_at: Timestamp,
    /// Points earned since the streak started. Never decreases.
    pub points: f64,
    /// Highest milestone mark reached so far.
    pub watermark: f64,
    pub altitude: ForgivenessWindow,
    pub speed: ForgivenessWindow,
    /// Both windows are open and the altitude countdown is hidden.
    pub altitude_suppressed: bool,
}

impl ActiveStreak {
    fn new(now: Timestamp) -> Self {
        Self {
            started_at: now,
            points: 0.0,
            watermark: MILESTONE_WATERMARK_START,
            altitude: ForgivenessWindow::default(),
            speed: ForgivenessWindow::default(),
            altitude_suppressed: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum StreakState {
    #[default]
    Idle,
    Qualifying {
        since: Timestamp,
    },
    Active(ActiveStreak),
}

/// Per-session streak engine.
#[derive(Debug, Clone, Default)]
pub struct StreakTracker {
    state: StreakState,
    /// Set when a penalized ending took points back; blocks re-qualification.
    crashed_at: Option<Timestamp>,
}

impl StreakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &StreakState {
        &self.state
    }

    pub fn phase(&self) -> StreakPhase {
        match self.state {
            StreakState::Idle => StreakPhase::Idle,
            StreakState::Qualifying { .. } => StreakPhase::Qualifying,
            StreakState::Active(_) => StreakPhase::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, StreakState::Active(_))
    }

    /// Seconds since the active streak started.
    pub fn active_duration(&self, now: Timestamp) -> Option<f64> {
        match &self.state {
            StreakState::Active(active) => Some(elapsed(now, active.started_at)),
            _ => None,
        }
    }

    /// Current multiplier, 1.0 unless a streak is active.
    pub fn multiplier(&self, now: Timestamp) -> f64 {
        self.active_duration(now)
            .map_or(NEUTRAL_MULTIPLIER, streak_multiplier)
    }

    pub fn points(&self) -> f64 {
        match &self.state {
            StreakState::Active(active) => active.points,
            _ => 0.0,
        }
    }

    /// Seconds left on the crash cooldown, if one is running.
    pub fn crash_cooldown_remaining(&self, now: Timestamp, config: &StreakConfig) -> Option<f64> {
        let crashed_at = self.crashed_at?;
        let remaining = config.end_display_secs - elapsed(now, crashed_at);
        (remaining > 0.0).then_some(remaining)
    }

    /// Evaluate this tick's conditions.
    ///
    /// Returns the reason the active streak must end, if it must. The caller
    /// ends it through [`StreakTracker::terminate`] so penalties and records
    /// go through one path.
    pub fn update(
        &mut self,
        conditions: StreakConditions,
        now: Timestamp,
        config: &StreakConfig,
        enabled: bool,
        events: &mut Vec<FlightEvent>,
    ) -> Option<StreakEndReason> {
        let window = config.forgiveness_window_secs;
        let mut altitude_forgiven = false;
        let mut speed_forgiven = false;

        if let StreakState::Active(active) = &mut self.state {
            altitude_forgiven = active.altitude.step(
                ForgivenessKind::Altitude,
                conditions.altitude_ok,
                now,
                window,
                events,
            );
            speed_forgiven =
                active
                    .speed
                    .step(ForgivenessKind::Speed, conditions.speed_ok, now, window, events);

            // Speed takes precedence: the altitude countdown is hidden, its timer keeps running.
            let both = altitude_forgiven && speed_forgiven;
            if both && !active.altitude_suppressed {
                events.push(FlightEvent::ForgivenessSuppressed {
                    kind: ForgivenessKind::Altitude,
                });
            }
            active.altitude_suppressed = both;
        }

        let meeting = (conditions.altitude_ok || altitude_forgiven)
            && (conditions.speed_ok || speed_forgiven);

        if !enabled || self.crash_cooldown_remaining(now, config).is_some() {
            return None;
        }

        match self.state {
            StreakState::Idle if meeting => {
                self.state = StreakState::Qualifying { since: now };
                events.push(FlightEvent::QualificationStarted);
                tracing::debug!(target: "skyrace::streak", now, "streak.qualifying");
            }
            StreakState::Qualifying { since } if meeting => {
                if elapsed(now, since) >= config.qualify_duration_secs {
                    self.state = StreakState::Active(ActiveStreak::new(now));
                    self.crashed_at = None;
                    events.push(FlightEvent::StreakStarted);
                    tracing::info!(target: "skyrace::streak", now, "streak.started");
                }
            }
            StreakState::Qualifying { .. } => {
                self.state = StreakState::Idle;
                events.push(FlightEvent::QualificationLost);
                tracing::debug!(target: "skyrace::streak", now, "streak.qualification_lost");
            }
            StreakState::Active(_) if !meeting => {
                let reason = if !conditions.speed_ok && !speed_forgiven {
                    StreakEndReason::Speed
                } else {
                    StreakEndReason::Altitude
                };
                return Some(reason);
            }
            _ => {}
        }
        None
    }

    /// Credit points to the active streak. Non-positive amounts are ignored.
    pub fn add_points(&mut self, points: f64) {
        if let StreakState::Active(active) = &mut self.state {
            if points > 0.0 {
                active.points += points;
            }
        }
    }

    /// Fire every milestone the active streak has newly crossed.
    pub fn check_milestones(&mut self, now: Timestamp, events: &mut Vec<FlightEvent>) {
        let StreakState::Active(active) = &mut self.state else {
            return;
        };
        let duration = elapsed(now, active.started_at);
        let super_mark = STREAK_MILESTONES[STREAK_MILESTONES.len() - 1].1;
        for (threshold, mark) in STREAK_MILESTONES {
            if duration >= threshold && active.watermark < mark {
                active.watermark = mark;
                events.push(FlightEvent::StreakMilestone {
                    multiplier: mark,
                    super_streak: mark >= super_mark,
                });
                tracing::info!(
                    target: "skyrace::streak",
                    multiplier = mark,
                    duration,
                    "streak.milestone"
                );
            }
        }
    }

    /// End the active streak. Returns `None` when there is nothing to end,
    /// so a second call for the same streak changes nothing.
    ///
    /// The returned summary carries the penalty; the caller takes it off the
    /// player's total score.
    pub fn terminate(
        &mut self,
        reason: StreakEndReason,
        now: Timestamp,
        config: &StreakConfig,
        events: &mut Vec<FlightEvent>,
    ) -> Option<StreakSummary> {
        let mut active = match std::mem::take(&mut self.state) {
            StreakState::Active(active) => active,
            other => {
                self.state = other;
                return None;
            }
        };

        active.altitude.close(ForgivenessKind::Altitude, events);
        active.speed.close(ForgivenessKind::Speed, events);

        let duration = elapsed(now, active.started_at);
        let points = active.points;
        let mut penalty = 0.0;
        if reason.is_penalized() && points > 0.0 {
            let rate = match reason {
                StreakEndReason::Damage => config.damage_penalty_rate,
                _ => config.destroyed_penalty_rate,
            };
            penalty = points * rate;
            self.crashed_at = Some(now);
        }

        tracing::info!(
            target: "skyrace::streak",
            reason = reason.as_str(),
            duration,
            points,
            penalty,
            "streak.ended"
        );

        Some(StreakSummary {
            reason,
            duration_secs: duration,
            final_multiplier: streak_multiplier(duration),
            points,
            penalty,
            net_points: points - penalty,
        })
    }

    /// Display view of the streak at `now`.
    pub fn view(&self, now: Timestamp, config: &StreakConfig) -> StreakView {
        let window = config.forgiveness_window_secs;
        let mut view = StreakView {
            phase: self.phase(),
            crash_cooldown_remaining: self.crash_cooldown_remaining(now, config),
            ..StreakView::default()
        };
        match &self.state {
            StreakState::Idle => {}
            StreakState::Qualifying { since } => view.elapsed_secs = elapsed(now, *since),
            StreakState::Active(active) => {
                view.elapsed_secs = elapsed(now, active.started_at);
                view.points = active.points;
                view.speed_countdown = active.speed.remaining(now, window);
                if !active.altitude_suppressed {
                    view.altitude_countdown = active.altitude.remaining(now, window);
                }
            }
        }
        view
    }
}
