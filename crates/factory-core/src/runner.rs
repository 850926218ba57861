//! Factory run loop with stop control.
//!
//! [`run_factory`] drives the fleet at a fixed cadence:
//!
//! 1. Read `now` from the [`Clock`].
//! 2. Under the fleet lock, apply the [`CommandSource`]'s orders, then
//!    [`Fleet::update`], then notify the [`TickCallback`].
//! 3. Stop on request, on victory (if enabled) or after `max_ticks`;
//!    otherwise sleep.
//!
//! Commands and the update share one lock acquisition, so no order can land
//! in the middle of an update.
//!
//! [`Fleet::update`]: crate::fleet::Fleet::update

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Notify;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::command::{CommandError, CommandSource};
use crate::fleet::{Fleet, FleetError, UpdateSummary};
use crate::shared::SharedFleet;

/// Errors that can end a run early.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The command source failed.
    #[error("command error: {source}")]
    Command {
        /// The underlying command error.
        #[from]
        source: CommandError,
    },

    /// A fleet operation failed.
    #[error("fleet error: {source}")]
    Fleet {
        /// The underlying fleet error.
        #[from]
        source: FleetError,
    },
}

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// The fleet reached its victory size and the run was set to stop on it.
    Victory,
    /// [`RunControl::request_stop`] was called.
    Stopped,
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult {
    /// Why the run ended.
    pub end_reason: RunEndReason,
    /// Number of updates executed.
    pub total_ticks: u64,
    /// The last update's summary, if any update ran.
    pub final_summary: Option<UpdateSummary>,
}

/// Shared run-loop controls.
#[derive(Debug)]
pub struct RunControl {
    stop_requested: AtomicBool,
    stop_notify: Notify,
    tick_interval_ms: AtomicU64,
    max_ticks: u64,
    stop_on_victory: bool,
}

impl RunControl {
    /// Create controls. `max_ticks` of 0 means unlimited.
    pub fn new(tick_interval_ms: u64, max_ticks: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            tick_interval_ms: AtomicU64::new(tick_interval_ms),
            max_ticks,
            stop_on_victory: false,
        }
    }

    /// End the run with [`RunEndReason::Victory`] when an update reports
    /// victory.
    #[must_use]
    pub const fn with_stop_on_victory(mut self, stop: bool) -> Self {
        self.stop_on_victory = stop;
        self
    }

    /// Whether victory ends the run.
    pub const fn stop_on_victory(&self) -> bool {
        self.stop_on_victory
    }

    /// Ask the loop to stop before its next update.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Current update interval.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the update interval from the next sleep on.
    pub fn set_tick_interval_ms(&self, ms: u64) {
        self.tick_interval_ms.store(ms, Ordering::Release);
    }

    /// Configured tick limit (0 = unlimited).
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    const fn tick_limit_reached(&self, total_ticks: u64) -> bool {
        self.max_ticks > 0 && total_ticks >= self.max_ticks
    }
}

/// Callback invoked after each update.
pub trait TickCallback: Send {
    /// Called with the fleet still locked.
    fn on_tick(&mut self, tick: u64, summary: &UpdateSummary, fleet: &Fleet);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _tick: u64, _summary: &UpdateSummary, _fleet: &Fleet) {}
}

/// Run the fleet until stopped or `max_ticks` is reached.
///
/// # Errors
///
/// Returns [`RunnerError`] if the command source fails or issues an order
/// for an unknown robot.
pub async fn run_factory(
    fleet: &SharedFleet,
    clock: &dyn Clock,
    commands: &mut dyn CommandSource,
    control: &Arc<RunControl>,
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    let mut total_ticks: u64 = 0;
    let mut last_summary: Option<UpdateSummary> = None;

    info!(
        tick_interval_ms = control.tick_interval_ms(),
        max_ticks = control.max_ticks(),
        "Factory starting"
    );

    loop {
        if control.is_stop_requested() {
            info!(total_ticks, "Stop requested");
            return Ok(RunResult {
                end_reason: RunEndReason::Stopped,
                total_ticks,
                final_summary: last_summary,
            });
        }

        let summary = {
            let mut guard = fleet.lock().await;
            let now = clock.now();
            for command in commands.commands(&guard, now)? {
                guard.change_action(command.robot_id, command.action, now)?;
            }
            let summary = guard.update(now);
            total_ticks = total_ticks.saturating_add(1);
            callback.on_tick(total_ticks, &summary, &guard);
            summary
        };

        if !summary.failed.is_empty() {
            warn!(tick = total_ticks, failed = summary.failed.len(), "Some robot ticks were rolled back");
        }

        if summary.victory && control.stop_on_victory() {
            info!(total_ticks, "Victory reached, ending run");
            return Ok(RunResult {
                end_reason: RunEndReason::Victory,
                total_ticks,
                final_summary: Some(summary),
            });
        }

        if control.tick_limit_reached(total_ticks) {
            info!(total_ticks, "Tick limit reached");
            return Ok(RunResult {
                end_reason: RunEndReason::MaxTicksReached,
                total_ticks,
                final_summary: Some(summary),
            });
        }
        last_summary = Some(summary);

        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::select! {
                () = tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)) => {}
                () = control.stop_notify.notified() => {}
            }
        }
    }
}

/// Log how a run ended.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        counts = ?result.final_summary.as_ref().map(|s| s.counts),
        "Factory stopped"
    );
}
