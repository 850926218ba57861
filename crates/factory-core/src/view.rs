//! Read-only payloads for a presentation layer.
//!
//! Nothing here mutates the fleet. [`robot_view`] renders one robot's status
//! line and progress, [`InventoryView`] renders the ledger counts, and
//! [`TraceFeed`] hands out each sold Foobar exactly once.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use factory_ledger::Ledger;
use factory_types::{Counts, FoobarId, Robot, RobotPhase, RobotView, TraceEntry};

use crate::fleet::Fleet;

/// Status line for a robot.
///
/// `"Idle"`, `"Changing to: <action>"` or `"Current action: <action>"`.
pub fn status_label(robot: &Robot) -> String {
    match robot.phase {
        RobotPhase::Idle => String::from("Idle"),
        RobotPhase::Transitioning { action, .. } => format!("Changing to: {}", action.label()),
        RobotPhase::Active { action, .. } => format!("Current action: {}", action.label()),
    }
}

/// Render one robot at `now`. Progress is truncated to a whole percent and
/// is 0 while idle.
pub fn robot_view(robot: &Robot, now: DateTime<Utc>) -> RobotView {
    let progress = factory_robots::progress(robot, now)
        .and_then(|pct| pct.trunc().to_u8())
        .unwrap_or(0);
    RobotView {
        id: robot.id,
        name: robot.name.clone(),
        status: robot.status(),
        action: robot.action(),
        label: status_label(robot),
        progress,
    }
}

/// Render every robot in the fleet, in creation order.
pub fn robot_views(fleet: &Fleet, now: DateTime<Utc>) -> Vec<RobotView> {
    fleet
        .robots()
        .iter()
        .map(|robot| robot_view(robot, now))
        .collect()
}

/// Inventory panel contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryView {
    /// Raw counts.
    pub counts: Counts,
    /// `"Foos: <n>"`.
    pub foo: String,
    /// `"Bars: <n>"`.
    pub bar: String,
    /// `"Foobars: <n>"`.
    pub foobar: String,
    /// `"Money: <n>€"`.
    pub money: String,
}

impl From<Counts> for InventoryView {
    fn from(counts: Counts) -> Self {
        Self {
            counts,
            foo: format!("Foos: {}", counts.foo),
            bar: format!("Bars: {}", counts.bar),
            foobar: format!("Foobars: {}", counts.foobar),
            money: format!("Money: {}€", counts.currency),
        }
    }
}

/// Append-only feed of sold Foobars.
///
/// Each call to [`poll`](Self::poll) returns the Foobars sold since the
/// previous call. An entry is never returned twice.
#[derive(Debug, Clone, Default)]
pub struct TraceFeed {
    seen: BTreeSet<FoobarId>,
}

impl TraceFeed {
    /// Create an empty feed.
    pub const fn new() -> Self {
        Self {
            seen: BTreeSet::new(),
        }
    }

    /// Sold Foobars not yet returned, in ledger order.
    pub fn poll(&mut self, ledger: &Ledger) -> Vec<TraceEntry> {
        let mut fresh = Vec::new();
        for foobar in ledger.sold_foobars() {
            if !self.seen.insert(foobar.id) {
                continue;
            }
            let (Some(foo), Some(bar)) = (
                ledger.mined_item(foobar.foo_used),
                ledger.mined_item(foobar.bar_used),
            ) else {
                continue;
            };
            fresh.push(TraceEntry {
                foobar_id: foobar.id,
                foobar_serial: foobar.serial,
                foo_serial: foo.serial,
                bar_serial: bar.serial,
            });
        }
        fresh
    }

    /// Number of entries handed out so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether nothing has been handed out yet.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
