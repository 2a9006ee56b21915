//! Scoring engine for SKYRACE.
//!
//! Streak, flip and zone state machines per flight session, the per-tick
//! score composer, and the `SkillRaceEngine` scheduler that drives them.

pub mod engine;
pub mod flip;
pub mod scoring;
pub mod session;
pub mod streak;
pub mod zones;

pub use engine::{Collaborators, EngineConfig, EngineError, SkillRaceEngine};
pub use skyrace_core as core;

#[cfg(test)]
mod tests;
