//! Enumeration types for the robot factory.
//!
//! Action kinds, item kinds, and the coarse robot status shown to the
//! presentation layer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// One of the five long-running tasks a robot can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RobotAction {
    /// Dig up one Foo per cycle.
    MiningFoo,
    /// Dig up one Bar per cycle.
    MiningBar,
    /// Assemble a Foobar from one Foo and one Bar.
    MakingFoobar,
    /// Sell a batch of Foobars for currency.
    SellingFoobar,
    /// Spend Foo and currency on a new robot.
    BuyingRobot,
}

impl RobotAction {
    /// Every action kind, in display order.
    pub const ALL: [Self; 5] = [
        Self::MiningFoo,
        Self::MiningBar,
        Self::MakingFoobar,
        Self::SellingFoobar,
        Self::BuyingRobot,
    ];

    /// Human-readable label used by the presentation layer.
    pub const fn label(self) -> &'static str {
        match self {
            Self::MiningFoo => "Mining foo",
            Self::MiningBar => "Mining bar",
            Self::MakingFoobar => "Making foobar",
            Self::SellingFoobar => "Selling foobar",
            Self::BuyingRobot => "Buying robot",
        }
    }
}

impl core::fmt::Display for RobotAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Every kind of countable item held in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ItemKind {
    /// Raw material mined by `MiningFoo`.
    Foo,
    /// Raw material mined by `MiningBar`.
    Bar,
    /// Crafted product of one Foo and one Bar.
    Foobar,
}

/// The subset of [`ItemKind`] that can be mined from nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MinedKind {
    /// See [`ItemKind::Foo`].
    Foo,
    /// See [`ItemKind::Bar`].
    Bar,
}

impl From<MinedKind> for ItemKind {
    fn from(kind: MinedKind) -> Self {
        match kind {
            MinedKind::Foo => Self::Foo,
            MinedKind::Bar => Self::Bar,
        }
    }
}

// ---------------------------------------------------------------------------
// Robot status
// ---------------------------------------------------------------------------

/// Which phase of the state machine a robot is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RobotStatus {
    /// No action assigned.
    Idle,
    /// Waiting out the fixed delay before a newly assigned action starts.
    Transitioning,
    /// Running the action's timer.
    Active,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_distinct() {
        let labels: std::collections::BTreeSet<&str> =
            RobotAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels.len(), RobotAction::ALL.len());
    }

    #[test]
    fn action_serializes_snake_case() {
        let json = serde_json::to_string(&RobotAction::MakingFoobar).unwrap_or_default();
        assert_eq!(json, "\"making_foobar\"");
    }

    #[test]
    fn mined_kind_maps_to_item_kind() {
        assert_eq!(ItemKind::from(MinedKind::Foo), ItemKind::Foo);
        assert_eq!(ItemKind::from(MinedKind::Bar), ItemKind::Bar);
    }
}
