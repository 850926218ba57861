//! What each robot action costs in time and does to the ledger.
//!
//! # Submodules
//!
//! - [`catalog`] -- Duration policy and effect handler per action.
//! - [`effects`] -- The completion effect of each action.

pub mod catalog;
pub mod effects;
