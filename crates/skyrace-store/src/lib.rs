//! Persistence for SKYRACE: player records and zones as human-diffable JSON.

pub mod json_file;
pub mod memory;
pub mod zones_file;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use zones_file::{load_zones, save_zones};
