//! Fleet orchestration for the robot factory.
//!
//! This crate owns the fleet controller and everything around it that a
//! running factory needs: configuration, time, name supply, presentation
//! views, the command seam and the async run loop.
//!
//! # Modules
//!
//! - [`fleet`] -- [`Fleet`]: robots, ledger, per-robot transactional update.
//! - [`shared`] -- [`SharedFleet`]: the fleet behind an async mutex.
//! - [`runner`] -- [`run_factory`] loop with stop and tick-limit control.
//! - [`command`] -- [`CommandSource`] trait for external `change_action` orders.
//! - [`view`] -- Robot, inventory and traceability payloads.
//! - [`names`] -- [`NameSource`] trait and built-in name pools.
//! - [`clock`] -- [`Clock`] trait, system and manual clocks.
//! - [`config`] -- Configuration loading from `factory-config.yaml`.
//!
//! [`Fleet`]: fleet::Fleet
//! [`SharedFleet`]: shared::SharedFleet
//! [`run_factory`]: runner::run_factory
//! [`CommandSource`]: command::CommandSource
//! [`NameSource`]: names::NameSource
//! [`Clock`]: clock::Clock

pub mod clock;
pub mod command;
pub mod config;
pub mod fleet;
pub mod names;
pub mod runner;
pub mod shared;
pub mod view;
