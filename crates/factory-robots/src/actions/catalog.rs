//! The action catalog: one [`ActionSpec`] per [`RobotAction`].
//!
//! | Action | Duration | Effect |
//! |--------|----------|--------|
//! | `MiningFoo` | fixed 2 s | +1 Foo, restart |
//! | `MiningBar` | uniform 0.5-2 s | +1 Bar, restart |
//! | `MakingFoobar` | fixed 2 s | -1 Foo; 60 %: -1 Bar +1 Foobar; restart |
//! | `SellingFoobar` | fixed 10 s | sell 1-5 Foobar, +1 currency each, restart |
//! | `BuyingRobot` | instant | -6 Foo -3 currency +1 robot, never restarts |
//!
//! Values shown are the [`EconomyConfig`] defaults.

use chrono::TimeDelta;

use factory_types::RobotAction;

use crate::config::{EconomyConfig, millis};
use crate::draws::Draws;
use crate::error::RobotError;

use super::effects::{self, EffectContext, EffectOutcome};

/// Signature shared by every completion effect.
pub type EffectFn = fn(&mut EffectContext<'_, '_>) -> Result<EffectOutcome, RobotError>;

/// How long one run of an action takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationPolicy {
    /// Always the same number of milliseconds.
    Fixed {
        /// Run length in milliseconds.
        ms: u64,
    },
    /// Drawn uniformly per run, bounds inclusive.
    Uniform {
        /// Shortest run in milliseconds.
        min_ms: u32,
        /// Longest run in milliseconds.
        max_ms: u32,
    },
    /// The effect runs as soon as the action starts.
    Instant,
}

impl DurationPolicy {
    /// Whether the action completes the moment it starts.
    pub const fn is_instant(&self) -> bool {
        matches!(self, Self::Instant)
    }

    /// Pick the length of the next run.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::TimeOverflow`] if the length does not fit a
    /// [`TimeDelta`].
    pub fn sample(&self, draws: &mut dyn Draws) -> Result<TimeDelta, RobotError> {
        match *self {
            Self::Fixed { ms } => millis(ms),
            Self::Uniform { min_ms, max_ms } => millis(u64::from(draws.between(min_ms, max_ms))),
            Self::Instant => Ok(TimeDelta::zero()),
        }
    }
}

/// Duration and completion effect of one action.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    /// The action described.
    pub action: RobotAction,
    /// How long one run takes.
    pub duration: DurationPolicy,
    /// What happens when a run completes.
    pub effect: EffectFn,
}

/// Look up the catalog entry for `action`.
pub const fn spec_for(action: RobotAction, config: &EconomyConfig) -> ActionSpec {
    let (duration, effect): (DurationPolicy, EffectFn) = match action {
        RobotAction::MiningFoo => (
            DurationPolicy::Fixed {
                ms: config.mining_foo_ms,
            },
            effects::mine_foo,
        ),
        RobotAction::MiningBar => (
            DurationPolicy::Uniform {
                min_ms: config.mining_bar_min_ms,
                max_ms: config.mining_bar_max_ms,
            },
            effects::mine_bar,
        ),
        RobotAction::MakingFoobar => (
            DurationPolicy::Fixed {
                ms: config.making_foobar_ms,
            },
            effects::make_foobar,
        ),
        RobotAction::SellingFoobar => (
            DurationPolicy::Fixed {
                ms: config.selling_foobar_ms,
            },
            effects::sell_foobar,
        ),
        RobotAction::BuyingRobot => (DurationPolicy::Instant, effects::buy_robot),
    };
    ActionSpec {
        action,
        duration,
        effect,
    }
}
