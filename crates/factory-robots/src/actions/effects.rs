//! Completion effects for each robot action.
//!
//! An effect runs when an action's run completes (or immediately, for
//! instant actions). It reads and mutates the ledger through an open
//! [`LedgerTxn`], so a failure anywhere in the caller's tick undoes it.
//! Each effect returns an [`EffectOutcome`] saying whether the robot should
//! start another run of the same action.

use tracing::debug;

use factory_ledger::LedgerTxn;
use factory_types::{ConsumedItem, ItemKind, MinedKind, RobotId};

use crate::config::EconomyConfig;
use crate::draws::Draws;
use crate::error::RobotError;

/// Everything an effect may touch.
pub struct EffectContext<'t, 'l> {
    /// The robot whose action completed.
    pub robot_id: RobotId,
    /// Open ledger transaction for this robot's tick.
    pub ledger: &'t mut LedgerTxn<'l>,
    /// Source of random outcomes.
    pub draws: &'t mut dyn Draws,
    /// Economy parameters.
    pub config: &'t EconomyConfig,
}

impl core::fmt::Debug for EffectContext<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EffectContext")
            .field("robot_id", &self.robot_id)
            .field("pending", &self.ledger.pending())
            .finish_non_exhaustive()
    }
}

/// Result of running an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectOutcome {
    /// Start another run of the same action immediately.
    pub restart: bool,
    /// The effect paid for a new robot; the caller must create it.
    pub robot_bought: bool,
}

impl EffectOutcome {
    /// Keep going with the same action.
    pub const fn restart() -> Self {
        Self {
            restart: true,
            robot_bought: false,
        }
    }

    /// Stop and go idle.
    pub const fn stop() -> Self {
        Self {
            restart: false,
            robot_bought: false,
        }
    }
}

/// Add one Foo produced by the robot.
///
/// # Errors
///
/// Never fails; the signature matches [`EffectFn`](super::catalog::EffectFn).
pub fn mine_foo(ctx: &mut EffectContext<'_, '_>) -> Result<EffectOutcome, RobotError> {
    Ok(mine(ctx, MinedKind::Foo))
}

/// Add one Bar produced by the robot.
///
/// # Errors
///
/// Never fails; the signature matches [`EffectFn`](super::catalog::EffectFn).
pub fn mine_bar(ctx: &mut EffectContext<'_, '_>) -> Result<EffectOutcome, RobotError> {
    Ok(mine(ctx, MinedKind::Bar))
}

fn mine(ctx: &mut EffectContext<'_, '_>, kind: MinedKind) -> EffectOutcome {
    let item_id = ctx.ledger.mine(kind, Some(ctx.robot_id));
    debug!(robot_id = %ctx.robot_id, %item_id, ?kind, "Mined");
    EffectOutcome::restart()
}

/// Attempt to assemble one Foobar.
///
/// Needs one unused Foo and one unused Bar; otherwise nothing is consumed
/// and the robot stops. The Foo is always consumed. A draw in `1..=100`
/// above `foobar_success_pct` is a failure and keeps the Bar. On success
/// the Bar is consumed and a Foobar linked to both is added.
///
/// # Errors
///
/// Returns [`RobotError::MaterialVanished`] if material counted as
/// available cannot be taken.
pub fn make_foobar(ctx: &mut EffectContext<'_, '_>) -> Result<EffectOutcome, RobotError> {
    if ctx.ledger.count_unused(ItemKind::Foo) == 0 || ctx.ledger.count_unused(ItemKind::Bar) == 0 {
        debug!(robot_id = %ctx.robot_id, "Not enough material to make foobar");
        return Ok(EffectOutcome::stop());
    }

    let foo = take(ctx, ItemKind::Foo)?;
    let draw = ctx.draws.between(1, 100);
    if draw > ctx.config.foobar_success_pct {
        debug!(robot_id = %ctx.robot_id, draw, foo = %foo.serial, "Foobar assembly failed");
        return Ok(EffectOutcome::restart());
    }

    let bar = take(ctx, ItemKind::Bar)?;
    let foobar_id = ctx.ledger.craft_foobar(foo, bar, Some(ctx.robot_id));
    debug!(robot_id = %ctx.robot_id, draw, %foobar_id, "Foobar assembled");
    Ok(EffectOutcome::restart())
}

fn take(
    ctx: &mut EffectContext<'_, '_>,
    kind: ItemKind,
) -> Result<ConsumedItem, RobotError> {
    ctx.ledger
        .use_one(kind)
        .ok_or(RobotError::MaterialVanished { kind })
}

/// Sell a batch of Foobars.
///
/// Stops if none are unsold. Otherwise draws a batch size, sells as many as
/// are available up to that size, and credits one currency per Foobar
/// actually sold.
///
/// # Errors
///
/// Returns [`RobotError::Ledger`] if the currency balance overflows.
pub fn sell_foobar(ctx: &mut EffectContext<'_, '_>) -> Result<EffectOutcome, RobotError> {
    if ctx.ledger.count_unused(ItemKind::Foobar) == 0 {
        debug!(robot_id = %ctx.robot_id, "Nothing to sell");
        return Ok(EffectOutcome::stop());
    }

    let wanted = ctx
        .draws
        .between(ctx.config.sale_batch_min, ctx.config.sale_batch_max);
    let sold = ctx.ledger.use_up_to(ItemKind::Foobar, wanted);
    let balance = ctx.ledger.add_currency(sold)?;
    debug!(robot_id = %ctx.robot_id, wanted, sold, balance, "Sold foobars");
    Ok(EffectOutcome::restart())
}

/// Buy one robot if the fleet can afford it.
///
/// Requires at least `robot_price_foo` unused Foo and `robot_price_currency`
/// currency. On purchase both are spent and the outcome asks the caller to
/// create the robot. Never restarts.
///
/// # Errors
///
/// Returns [`RobotError::Ledger`] if the currency balance overflows.
pub fn buy_robot(ctx: &mut EffectContext<'_, '_>) -> Result<EffectOutcome, RobotError> {
    let price_foo = ctx.config.robot_price_foo;
    let price_currency = ctx.config.robot_price_currency;
    let foo = ctx.ledger.count_unused(ItemKind::Foo);
    let currency = ctx.ledger.currency();

    if foo < price_foo || currency < i64::from(price_currency) {
        debug!(robot_id = %ctx.robot_id, foo, currency, "Cannot afford robot");
        return Ok(EffectOutcome::stop());
    }

    let spent = ctx.ledger.use_up_to(ItemKind::Foo, price_foo);
    let balance = ctx.ledger.sub_currency(price_currency)?;
    debug!(robot_id = %ctx.robot_id, spent, balance, "Robot purchased");
    Ok(EffectOutcome {
        restart: false,
        robot_bought: true,
    })
}
