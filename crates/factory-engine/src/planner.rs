//! Automatic command source for unattended runs.
//!
//! [`AutoPlanner`] plays the factory the way a patient operator would: it
//! keeps idle robots busy, pulls miners off a material once enough of it is
//! stocked, and spends surplus on new robots until the fleet reaches its
//! goal size.
//!
//! Robots that are already transitioning are never redirected; a second
//! order would only restart their delay.

use chrono::{DateTime, Utc};
use factory_core::command::{Command, CommandError, CommandSource};
use factory_core::fleet::Fleet;
use factory_robots::EconomyConfig;
use factory_types::{Counts, RobotAction, RobotPhase};

/// Foo stock above which foo miners are reassigned.
const DEFAULT_FOO_TARGET: u32 = 12;

/// Bar stock above which bar miners are reassigned.
const DEFAULT_BAR_TARGET: u32 = 6;

/// Fleet size after which the planner stops buying robots.
const DEFAULT_ROBOT_GOAL: usize = 30;

/// Greedy planner that issues `change_action` orders between updates.
#[derive(Debug, Clone, Copy)]
pub struct AutoPlanner {
    foo_target: u32,
    bar_target: u32,
    robot_goal: usize,
}

impl Default for AutoPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_FOO_TARGET, DEFAULT_BAR_TARGET, DEFAULT_ROBOT_GOAL)
    }
}

impl AutoPlanner {
    /// Create a planner with explicit stock targets and fleet goal.
    pub const fn new(foo_target: u32, bar_target: u32, robot_goal: usize) -> Self {
        Self {
            foo_target,
            bar_target,
            robot_goal,
        }
    }

    /// Replace the fleet size at which purchases stop.
    #[must_use]
    pub const fn with_robot_goal(mut self, robot_goal: usize) -> Self {
        self.robot_goal = robot_goal;
        self
    }

    /// Pick the next action for a robot given the stock left after the
    /// orders already issued this round, and reserve what it will use.
    fn choose(&self, budget: &mut Counts, fleet_size: usize, economy: &EconomyConfig) -> RobotAction {
        let can_buy = budget.foo >= economy.robot_price_foo
            && budget.currency >= i64::from(economy.robot_price_currency);
        if can_buy && fleet_size < self.robot_goal {
            budget.foo = budget.foo.saturating_sub(economy.robot_price_foo);
            budget.currency = budget
                .currency
                .saturating_sub(i64::from(economy.robot_price_currency));
            return RobotAction::BuyingRobot;
        }
        if budget.foobar > 0 {
            budget.foobar = budget.foobar.saturating_sub(economy.sale_batch_max);
            return RobotAction::SellingFoobar;
        }
        if budget.foo > 0 && budget.bar > 0 {
            budget.foo = budget.foo.saturating_sub(1);
            budget.bar = budget.bar.saturating_sub(1);
            return RobotAction::MakingFoobar;
        }
        // Count the expected yield so consecutive miners alternate.
        if budget.foo <= budget.bar {
            budget.foo = budget.foo.saturating_add(1);
            RobotAction::MiningFoo
        } else {
            budget.bar = budget.bar.saturating_add(1);
            RobotAction::MiningBar
        }
    }

    /// Whether a robot's current run should be abandoned.
    const fn needs_orders(&self, phase: &RobotPhase, counts: &Counts) -> bool {
        match phase {
            RobotPhase::Idle => true,
            RobotPhase::Transitioning { .. } => false,
            RobotPhase::Active { action, .. } => match action {
                RobotAction::MiningFoo => counts.foo >= self.foo_target,
                RobotAction::MiningBar => counts.bar >= self.bar_target,
                RobotAction::MakingFoobar
                | RobotAction::SellingFoobar
                | RobotAction::BuyingRobot => false,
            },
        }
    }
}

impl CommandSource for AutoPlanner {
    fn commands(&mut self, fleet: &Fleet, _now: DateTime<Utc>) -> Result<Vec<Command>, CommandError> {
        let counts = fleet.counts();
        let mut budget = counts;
        let mut fleet_size = fleet.len();
        let mut commands = Vec::new();

        for robot in fleet.robots() {
            if !self.needs_orders(&robot.phase, &counts) {
                continue;
            }
            let action = self.choose(&mut budget, fleet_size, fleet.economy());
            if action == RobotAction::BuyingRobot {
                fleet_size = fleet_size.saturating_add(1);
            }
            if robot.action() != Some(action) {
                commands.push(Command {
                    robot_id: robot.id,
                    action,
                });
            }
        }

        Ok(commands)
    }
}
