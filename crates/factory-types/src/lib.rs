//! Shared type definitions for the robot factory simulation.
//!
//! This crate is the single source of truth for the records used across the
//! workspace. Types flow downstream to `TypeScript` via `ts-rs` for any
//! presentation front end.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and the item [`Serial`]
//! - [`enums`] -- Action kinds, item kinds, robot status
//! - [`structs`] -- Robots, items, counts, and presentation payloads

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ItemKind, MinedKind, RobotAction, RobotStatus};
pub use ids::{FoobarId, ItemId, RobotId, Serial};
pub use structs::{
    ConsumedItem, Counts, CraftedItem, MinedItem, Robot, RobotPhase, RobotView, TraceEntry,
};
