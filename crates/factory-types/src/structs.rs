//! Core entity structs for the robot factory.
//!
//! Covers the [`Robot`] record and its [`RobotPhase`], the two item shapes
//! held by the ledger ([`MinedItem`] and [`CraftedItem`]), and the payloads
//! handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{MinedKind, RobotAction, RobotStatus};
use crate::ids::{FoobarId, ItemId, RobotId, Serial};

// ---------------------------------------------------------------------------
// Robot
// ---------------------------------------------------------------------------

/// Where a robot is in its action lifecycle.
///
/// The timestamps live inside the variants, so an action can never be set
/// without its timing markers and the transition/active deadlines can never
/// both be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "phase", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RobotPhase {
    /// Doing nothing.
    Idle,
    /// Switching to `action`; it starts at `available_at`.
    Transitioning {
        /// The action being switched to.
        action: RobotAction,
        /// When the switch was ordered.
        started_at: DateTime<Utc>,
        /// When the action itself starts running.
        available_at: DateTime<Utc>,
    },
    /// Running `action`; its effect fires at `done_at`.
    Active {
        /// The action being performed.
        action: RobotAction,
        /// When the current run started.
        started_at: DateTime<Utc>,
        /// When the current run completes.
        done_at: DateTime<Utc>,
    },
}

/// A single autonomous unit of the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Robot {
    /// Unique, immutable identifier.
    pub id: RobotId,
    /// Display name, unique within the fleet.
    pub name: String,
    /// Current lifecycle phase.
    pub phase: RobotPhase,
}

impl Robot {
    /// Create an idle robot with a fresh identifier.
    pub fn new(name: String) -> Self {
        Self {
            id: RobotId::new(),
            name,
            phase: RobotPhase::Idle,
        }
    }

    /// The action the robot is switching to or performing.
    pub const fn action(&self) -> Option<RobotAction> {
        match self.phase {
            RobotPhase::Idle => None,
            RobotPhase::Transitioning { action, .. } | RobotPhase::Active { action, .. } => {
                Some(action)
            }
        }
    }

    /// When the current phase started.
    pub const fn time_started(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            RobotPhase::Idle => None,
            RobotPhase::Transitioning { started_at, .. }
            | RobotPhase::Active { started_at, .. } => Some(started_at),
        }
    }

    /// When the pending action becomes available (transition phase only).
    pub const fn time_when_available(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            RobotPhase::Transitioning { available_at, .. } => Some(available_at),
            RobotPhase::Idle | RobotPhase::Active { .. } => None,
        }
    }

    /// When the running action completes (active phase only).
    pub const fn time_when_done(&self) -> Option<DateTime<Utc>> {
        match self.phase {
            RobotPhase::Active { done_at, .. } => Some(done_at),
            RobotPhase::Idle | RobotPhase::Transitioning { .. } => None,
        }
    }

    /// Coarse status for display.
    pub const fn status(&self) -> RobotStatus {
        match self.phase {
            RobotPhase::Idle => RobotStatus::Idle,
            RobotPhase::Transitioning { .. } => RobotStatus::Transitioning,
            RobotPhase::Active { .. } => RobotStatus::Active,
        }
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A Foo or a Bar.
///
/// `used` only ever goes from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MinedItem {
    /// Unique identifier.
    pub id: ItemId,
    /// Foo or Bar.
    pub kind: MinedKind,
    /// Traceability token.
    pub serial: Serial,
    /// Whether the item has been consumed.
    pub used: bool,
    /// The robot that mined it, if any (seeded stock has none).
    pub producer_id: Option<RobotId>,
}

/// A Foobar. `used` doubles as the "sold" flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CraftedItem {
    /// Unique identifier.
    pub id: FoobarId,
    /// Traceability token.
    pub serial: Serial,
    /// Whether the Foobar has been sold.
    pub used: bool,
    /// The Foo consumed to make it.
    pub foo_used: ItemId,
    /// The Bar consumed to make it.
    pub bar_used: ItemId,
    /// The robot that assembled it, if any (seeded stock has none).
    pub producer_id: Option<RobotId>,
}

/// Identity of an item that was just consumed from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConsumedItem {
    /// The consumed item's id (as a raw UUID, since kinds differ).
    pub id: uuid::Uuid,
    /// The consumed item's serial.
    pub serial: Serial,
}

// ---------------------------------------------------------------------------
// Presentation payloads
// ---------------------------------------------------------------------------

/// Unused item counts plus currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Counts {
    /// Unused Foo.
    pub foo: u32,
    /// Unused Bar.
    pub bar: u32,
    /// Unsold Foobars.
    pub foobar: u32,
    /// Currency balance. May be negative.
    pub currency: i64,
}

/// One sold Foobar with the serials of the materials it was made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TraceEntry {
    /// The sold Foobar.
    pub foobar_id: FoobarId,
    /// Serial of the sold Foobar.
    pub foobar_serial: Serial,
    /// Serial of the Foo it consumed.
    pub foo_serial: Serial,
    /// Serial of the Bar it consumed.
    pub bar_serial: Serial,
}

/// What the presentation layer shows for one robot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RobotView {
    /// The robot's id.
    pub id: RobotId,
    /// Display name.
    pub name: String,
    /// Lifecycle phase.
    pub status: RobotStatus,
    /// Assigned action, if any.
    pub action: Option<RobotAction>,
    /// Status line, e.g. `"Changing to: Mining foo"`.
    pub label: String,
    /// Whole-percent progress through the current phase (0 when idle).
    pub progress: u8,
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn new_robot_is_idle_without_timestamps() {
        let robot = Robot::new("Ada".to_owned());
        assert_eq!(robot.status(), RobotStatus::Idle);
        assert!(robot.action().is_none());
        assert!(robot.time_started().is_none());
        assert!(robot.time_when_available().is_none());
        assert!(robot.time_when_done().is_none());
    }

    #[test]
    fn transitioning_exposes_only_available_deadline() {
        let now = Utc::now();
        let later = now.checked_add_signed(TimeDelta::seconds(5)).unwrap_or(now);
        let mut robot = Robot::new("Ada".to_owned());
        robot.phase = RobotPhase::Transitioning {
            action: RobotAction::MiningBar,
            started_at: now,
            available_at: later,
        };
        assert_eq!(robot.action(), Some(RobotAction::MiningBar));
        assert_eq!(robot.time_started(), Some(now));
        assert_eq!(robot.time_when_available(), Some(later));
        assert!(robot.time_when_done().is_none());
    }

    #[test]
    fn active_exposes_only_done_deadline() {
        let now = Utc::now();
        let later = now.checked_add_signed(TimeDelta::seconds(2)).unwrap_or(now);
        let mut robot = Robot::new("Ada".to_owned());
        robot.phase = RobotPhase::Active {
            action: RobotAction::MiningFoo,
            started_at: now,
            done_at: later,
        };
        assert_eq!(robot.status(), RobotStatus::Active);
        assert!(robot.time_when_available().is_none());
        assert_eq!(robot.time_when_done(), Some(later));
    }

    #[test]
    fn phase_serializes_with_tag() {
        let robot = Robot::new("Ada".to_owned());
        let json = serde_json::to_value(&robot).unwrap_or_default();
        assert_eq!(json["phase"]["phase"], "idle");
    }
}
