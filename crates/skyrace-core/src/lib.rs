//! Core types and definitions for the SKYRACE scoring engine.
//!
//! This crate defines the vocabulary shared across all other crates:
//! identifiers, constants, configuration, events, persisted records and the
//! collaborator traits the engine reads from and writes to.
//! It has no dependency on any host runtime.

pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod records;
pub mod sensors;
pub mod sinks;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
