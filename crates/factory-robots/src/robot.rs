//! The per-robot state machine.
//!
//! A robot is always in exactly one [`RobotPhase`]:
//!
//! ```text
//!            change_action              available_at <= now
//!   Idle ──────────────────▶ Transitioning ─────────────────▶ Active
//!    ▲                          ▲    │ instant action              │ done_at <= now
//!    │                          │    ▼                             ▼
//!    └──────────────────────────┴── effect ◀───────────────── effect
//!                  no restart          restart ──▶ Active (fresh run)
//! ```
//!
//! `change_action` is accepted from any phase and overwrites whatever was in
//! flight. `tick` advances at most one phase boundary per call and is a
//! no-op when no deadline has passed.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use factory_types::{Robot, RobotAction, RobotPhase};

use crate::actions::catalog::{ActionSpec, spec_for};
use crate::actions::effects::{EffectContext, EffectOutcome};
use crate::config::EconomyConfig;
use crate::error::RobotError;

/// What a single `tick` did to the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No deadline had passed.
    Unchanged,
    /// The transition delay elapsed and the action began its first run.
    Started(RobotAction),
    /// A run completed and the same action began a fresh run.
    Restarted(RobotAction),
    /// The action's effect ran and the robot went idle.
    Finished(RobotAction),
}

/// Outcome of one `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// The phase change that happened.
    pub transition: Transition,
    /// The effect paid for a new robot; the fleet must create it.
    pub robot_bought: bool,
}

impl TickReport {
    const fn unchanged() -> Self {
        Self {
            transition: Transition::Unchanged,
            robot_bought: false,
        }
    }

    /// Whether the tick changed the robot in any way.
    pub const fn changed(&self) -> bool {
        !matches!(self.transition, Transition::Unchanged)
    }
}

/// Order `robot` to switch to `action`.
///
/// Valid from any phase. The robot enters `Transitioning` with
/// `time_started = now` and `time_when_available = now + transition delay`.
///
/// # Errors
///
/// Returns [`RobotError::TimeOverflow`] if the deadline is unrepresentable.
pub fn change_action(
    robot: &mut Robot,
    action: RobotAction,
    now: DateTime<Utc>,
    config: &EconomyConfig,
) -> Result<(), RobotError> {
    let available_at = after(now, config.transition_delay()?)?;
    debug!(
        robot_id = %robot.id,
        from = ?robot.action(),
        to = %action,
        %available_at,
        "Changing action"
    );
    robot.phase = RobotPhase::Transitioning {
        action,
        started_at: now,
        available_at,
    };
    Ok(())
}

/// Advance `robot` to `now`.
///
/// `ctx.robot_id` must be `robot.id`. Ledger changes go through
/// `ctx.ledger`; the caller commits them only if this returns `Ok`.
///
/// # Errors
///
/// Returns [`RobotError`] if an effect fails or a deadline overflows. The
/// robot may be partially updated; callers should discard it.
pub fn tick(
    robot: &mut Robot,
    now: DateTime<Utc>,
    ctx: &mut EffectContext<'_, '_>,
) -> Result<TickReport, RobotError> {
    match robot.phase {
        RobotPhase::Idle => Ok(TickReport::unchanged()),
        RobotPhase::Transitioning {
            action,
            available_at,
            ..
        } => {
            if available_at > now {
                return Ok(TickReport::unchanged());
            }
            start(robot, action, now, ctx)
        }
        RobotPhase::Active {
            action, done_at, ..
        } => {
            if done_at > now {
                return Ok(TickReport::unchanged());
            }
            complete(robot, action, now, ctx)
        }
    }
}

/// Percentage of the current phase that has elapsed, in `[0, 100]`.
///
/// Returns `None` while the robot is idle.
pub fn progress(robot: &Robot, now: DateTime<Utc>) -> Option<Decimal> {
    let (started_at, deadline) = match robot.phase {
        RobotPhase::Idle => return None,
        RobotPhase::Transitioning {
            started_at,
            available_at,
            ..
        } => (started_at, available_at),
        RobotPhase::Active {
            started_at,
            done_at,
            ..
        } => (started_at, done_at),
    };

    let total = deadline.signed_duration_since(started_at).num_milliseconds();
    if total <= 0 {
        return Some(Decimal::ONE_HUNDRED);
    }
    let elapsed = now.signed_duration_since(started_at).num_milliseconds();

    let pct = Decimal::from(elapsed)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(Decimal::from(total))?;
    Some(pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
}

fn start(
    robot: &mut Robot,
    action: RobotAction,
    now: DateTime<Utc>,
    ctx: &mut EffectContext<'_, '_>,
) -> Result<TickReport, RobotError> {
    let spec = spec_for(action, ctx.config);

    if spec.duration.is_instant() {
        let outcome = (spec.effect)(ctx)?;
        robot.phase = RobotPhase::Idle;
        debug!(robot_id = %robot.id, %action, "Instant action finished");
        return Ok(report(Transition::Finished(action), outcome));
    }

    begin_run(robot, &spec, now, ctx)?;
    debug!(robot_id = %robot.id, %action, done_at = ?robot.time_when_done(), "Action started");
    Ok(TickReport {
        transition: Transition::Started(action),
        robot_bought: false,
    })
}

fn complete(
    robot: &mut Robot,
    action: RobotAction,
    now: DateTime<Utc>,
    ctx: &mut EffectContext<'_, '_>,
) -> Result<TickReport, RobotError> {
    let spec = spec_for(action, ctx.config);
    let outcome = (spec.effect)(ctx)?;

    if outcome.restart && !spec.duration.is_instant() {
        begin_run(robot, &spec, now, ctx)?;
        return Ok(report(Transition::Restarted(action), outcome));
    }

    robot.phase = RobotPhase::Idle;
    debug!(robot_id = %robot.id, %action, "Action finished");
    Ok(report(Transition::Finished(action), outcome))
}

fn begin_run(
    robot: &mut Robot,
    spec: &ActionSpec,
    now: DateTime<Utc>,
    ctx: &mut EffectContext<'_, '_>,
) -> Result<(), RobotError> {
    let duration = spec.duration.sample(ctx.draws)?;
    robot.phase = RobotPhase::Active {
        action: spec.action,
        started_at: now,
        done_at: after(now, duration)?,
    };
    Ok(())
}

const fn report(transition: Transition, outcome: EffectOutcome) -> TickReport {
    TickReport {
        transition,
        robot_bought: outcome.robot_bought,
    }
}

fn after(now: DateTime<Utc>, delta: TimeDelta) -> Result<DateTime<Utc>, RobotError> {
    now.checked_add_signed(delta)
        .ok_or_else(|| RobotError::TimeOverflow {
            context: format!("{now} + {delta}"),
        })
}
