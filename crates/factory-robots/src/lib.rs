//! Robot behaviour for the robot factory.
//!
//! This crate owns everything a single robot does: the phase state machine,
//! the catalog of actions with their timing policies, and the effect each
//! action has on the shared ledger. It holds no fleet-level state; the fleet
//! controller in `factory-core` supplies the ledger transaction and the
//! randomness source for every tick.
//!
//! # Modules
//!
//! - [`robot`] -- `change_action`, `tick`, `progress`.
//! - [`actions`] -- Action catalog and completion effects.
//! - [`draws`] -- Injectable randomness ([`Draws`], [`RngDraws`], [`FixedDraws`]).
//! - [`config`] -- [`EconomyConfig`]: durations, odds and prices.
//! - [`error`] -- [`RobotError`].

pub mod actions;
pub mod config;
pub mod draws;
pub mod error;
pub mod robot;

pub use actions::catalog::{ActionSpec, DurationPolicy, spec_for};
pub use actions::effects::{EffectContext, EffectOutcome};
pub use config::EconomyConfig;
pub use draws::{Draws, FixedDraws, RngDraws};
pub use error::RobotError;
pub use robot::{TickReport, Transition, change_action, progress, tick};
