//! Tick callback that reports factory activity through `tracing`.
//!
//! Every tick with something to say (a robot bought, a rolled-back robot,
//! newly sold foobars) is logged at `info`; a full inventory line follows
//! every `inventory_every` ticks.

use factory_core::fleet::{Fleet, UpdateSummary};
use factory_core::runner::TickCallback;
use factory_core::view::{InventoryView, TraceFeed};
use tracing::{debug, info, warn};

/// Callback that turns update summaries into log lines.
#[derive(Debug)]
pub struct ReportCallback {
    feed: TraceFeed,
    inventory_every: u64,
}

impl ReportCallback {
    /// Create a reporter that prints inventory every `inventory_every` ticks
    /// (0 disables the periodic line).
    pub const fn new(inventory_every: u64) -> Self {
        Self {
            feed: TraceFeed::new(),
            inventory_every,
        }
    }
}

impl TickCallback for ReportCallback {
    fn on_tick(&mut self, tick: u64, summary: &UpdateSummary, fleet: &Fleet) {
        debug!(
            tick,
            started = summary.started,
            restarted = summary.restarted,
            finished = summary.finished,
            "Tick processed"
        );

        for robot_id in &summary.bought {
            let name = fleet.robot(*robot_id).map_or("?", |r| r.name.as_str());
            info!(tick, robot_id = %robot_id, name, fleet_size = fleet.len(), "Robot bought");
        }

        for robot_id in &summary.failed {
            warn!(tick, robot_id = %robot_id, "Robot tick rolled back");
        }

        if !summary.audit_clean {
            warn!(tick, "Ledger audit found anomalies");
        }

        for entry in self.feed.poll(fleet.ledger()) {
            info!(
                tick,
                foobar = %entry.foobar_serial,
                foo = %entry.foo_serial,
                bar = %entry.bar_serial,
                "Foobar sold"
            );
        }

        if tick.checked_rem(self.inventory_every) == Some(0) {
            let inventory = InventoryView::from(summary.counts);
            info!(
                tick,
                robots = fleet.len(),
                foo = inventory.foo,
                bar = inventory.bar,
                foobar = inventory.foobar,
                money = inventory.money,
                "Inventory"
            );
        }
    }
}
