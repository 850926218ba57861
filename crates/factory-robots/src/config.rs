//! Timing and pricing parameters for the action catalog.
//!
//! These values correspond to the `economy` key of `factory-config.yaml`.
//! The [`EconomyConfig`] struct bundles every tunable so that callers (fleet,
//! tests) can override defaults.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::RobotError;

/// Configuration for action durations, odds, and prices.
///
/// Durations are whole milliseconds. Probabilities are whole percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Delay between ordering an action and its start (default: 5000).
    #[serde(default = "default_transition_delay_ms")]
    pub transition_delay_ms: u64,

    /// Time to mine one Foo (default: 2000).
    #[serde(default = "default_mining_foo_ms")]
    pub mining_foo_ms: u64,

    /// Shortest time to mine one Bar (default: 500).
    #[serde(default = "default_mining_bar_min_ms")]
    pub mining_bar_min_ms: u32,

    /// Longest time to mine one Bar (default: 2000).
    #[serde(default = "default_mining_bar_max_ms")]
    pub mining_bar_max_ms: u32,

    /// Time to attempt one Foobar (default: 2000).
    #[serde(default = "default_making_foobar_ms")]
    pub making_foobar_ms: u64,

    /// Chance that an assembly attempt succeeds, in percent (default: 60).
    ///
    /// A draw in `1..=100` strictly above this value is a failure.
    #[serde(default = "default_foobar_success_pct")]
    pub foobar_success_pct: u32,

    /// Time to sell one batch of Foobars (default: 10000).
    #[serde(default = "default_selling_foobar_ms")]
    pub selling_foobar_ms: u64,

    /// Smallest batch a sale tries to move (default: 1).
    #[serde(default = "default_sale_batch_min")]
    pub sale_batch_min: u32,

    /// Largest batch a sale tries to move (default: 5).
    #[serde(default = "default_sale_batch_max")]
    pub sale_batch_max: u32,

    /// Foo spent on one new robot (default: 6).
    #[serde(default = "default_robot_price_foo")]
    pub robot_price_foo: u32,

    /// Currency spent on one new robot (default: 3).
    #[serde(default = "default_robot_price_currency")]
    pub robot_price_currency: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            transition_delay_ms: default_transition_delay_ms(),
            mining_foo_ms: default_mining_foo_ms(),
            mining_bar_min_ms: default_mining_bar_min_ms(),
            mining_bar_max_ms: default_mining_bar_max_ms(),
            making_foobar_ms: default_making_foobar_ms(),
            foobar_success_pct: default_foobar_success_pct(),
            selling_foobar_ms: default_selling_foobar_ms(),
            sale_batch_min: default_sale_batch_min(),
            sale_batch_max: default_sale_batch_max(),
            robot_price_foo: default_robot_price_foo(),
            robot_price_currency: default_robot_price_currency(),
        }
    }
}

impl EconomyConfig {
    /// Check the configuration for impossible ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<(), RobotError> {
        if self.mining_bar_min_ms > self.mining_bar_max_ms {
            return Err(RobotError::InvalidConfig {
                reason: format!(
                    "mining_bar_min_ms ({}) exceeds mining_bar_max_ms ({})",
                    self.mining_bar_min_ms, self.mining_bar_max_ms
                ),
            });
        }
        if self.sale_batch_min > self.sale_batch_max {
            return Err(RobotError::InvalidConfig {
                reason: format!(
                    "sale_batch_min ({}) exceeds sale_batch_max ({})",
                    self.sale_batch_min, self.sale_batch_max
                ),
            });
        }
        if self.foobar_success_pct > 100 {
            return Err(RobotError::InvalidConfig {
                reason: format!(
                    "foobar_success_pct must be at most 100, got {}",
                    self.foobar_success_pct
                ),
            });
        }
        for (name, ms) in [
            ("transition_delay_ms", self.transition_delay_ms),
            ("mining_foo_ms", self.mining_foo_ms),
            ("making_foobar_ms", self.making_foobar_ms),
            ("selling_foobar_ms", self.selling_foobar_ms),
        ] {
            millis(ms).map_err(|_err| RobotError::InvalidConfig {
                reason: format!("{name} ({ms}) is out of range"),
            })?;
        }
        Ok(())
    }

    /// The fixed delay applied by every `change_action`.
    ///
    /// # Errors
    ///
    /// Returns [`RobotError::TimeOverflow`] if the delay is out of range.
    pub fn transition_delay(&self) -> Result<TimeDelta, RobotError> {
        millis(self.transition_delay_ms)
    }
}

/// Convert whole milliseconds to a [`TimeDelta`].
///
/// # Errors
///
/// Returns [`RobotError::TimeOverflow`] if `ms` does not fit a `TimeDelta`.
pub fn millis(ms: u64) -> Result<TimeDelta, RobotError> {
    i64::try_from(ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .ok_or_else(|| RobotError::TimeOverflow {
            context: format!("{ms}ms does not fit a time delta"),
        })
}

const fn default_transition_delay_ms() -> u64 {
    5_000
}

const fn default_mining_foo_ms() -> u64 {
    2_000
}

const fn default_mining_bar_min_ms() -> u32 {
    500
}

const fn default_mining_bar_max_ms() -> u32 {
    2_000
}

const fn default_making_foobar_ms() -> u64 {
    2_000
}

const fn default_foobar_success_pct() -> u32 {
    60
}

const fn default_selling_foobar_ms() -> u64 {
    10_000
}

const fn default_sale_batch_min() -> u32 {
    1
}

const fn default_sale_batch_max() -> u32 {
    5
}

const fn default_robot_price_foo() -> u32 {
    6
}

const fn default_robot_price_currency() -> u32 {
    3
}
