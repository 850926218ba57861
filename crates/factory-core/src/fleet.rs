//! The fleet controller.
//!
//! [`Fleet`] owns every robot, the shared [`Ledger`], the economy config and
//! the randomness and name sources. All robot operations go through it, so
//! a robot never needs a reference back to its fleet: callers hold a
//! [`RobotId`] and the fleet resolves it.
//!
//! # Update cycle
//!
//! [`Fleet::update`] ticks every robot in creation order. Each robot's tick
//! runs in its own ledger transaction against a copy of the robot record:
//!
//! 1. Clone the robot and open a ledger transaction.
//! 2. Run the state machine (`factory_robots::tick`).
//! 3. If the effect bought a robot, pick its unique name.
//! 4. Commit the transaction, write the robot back, add any new robot.
//!
//! A failure in steps 2-3 drops the transaction, which undoes every ledger
//! change that robot made, and leaves the stored robot untouched. Later
//! robots in the same update see all earlier robots' committed changes.
//!
//! The id index grows with the fleet and is never pruned; robots are never
//! removed.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use factory_ledger::{AuditResult, Ledger, LedgerError};
use factory_robots::{
    Draws, EconomyConfig, EffectContext, RngDraws, RobotError, TickReport, Transition,
};
use factory_types::{Counts, Robot, RobotAction, RobotId};

use crate::config::FactoryConfig;
use crate::names::{NameSource, PoolNameSource};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from fleet operations.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// No robot has this id.
    #[error("robot not found: {robot_id}")]
    RobotNotFound {
        /// The id that was looked up.
        robot_id: RobotId,
    },

    /// The name source produced only colliding names.
    #[error("no unique robot name after {attempts} attempts")]
    NameSupplyExhausted {
        /// How many candidates were tried.
        attempts: u32,
    },

    /// A robot operation failed.
    #[error("robot {robot_id}: {source}")]
    Robot {
        /// The robot involved.
        robot_id: RobotId,
        /// The underlying error.
        source: RobotError,
    },

    /// The economy configuration is unusable.
    #[error("invalid economy config: {source}")]
    Config {
        /// The validation failure.
        source: RobotError,
    },

    /// A snapshot cannot be restored.
    #[error("corrupt snapshot: {reason}")]
    CorruptSnapshot {
        /// What is wrong with it.
        reason: String,
    },

    /// The ledger rejected a change.
    #[error("ledger error: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },
}

// ---------------------------------------------------------------------------
// Update summary
// ---------------------------------------------------------------------------

/// What one [`Fleet::update`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Robots whose action began its first run.
    pub started: u32,
    /// Robots that completed a run and began another.
    pub restarted: u32,
    /// Robots that completed their action and went idle.
    pub finished: u32,
    /// Robots created by purchases during this update.
    pub bought: Vec<RobotId>,
    /// Robots whose tick failed and was rolled back.
    pub failed: Vec<RobotId>,
    /// Counts after the update.
    pub counts: Counts,
    /// Whether the post-update ledger audit passed.
    pub audit_clean: bool,
    /// The fleet reached its victory size during this update. Reported
    /// once per fleet.
    pub victory: bool,
}

impl UpdateSummary {
    fn record(&mut self, report: TickReport) {
        let slot = match report.transition {
            Transition::Unchanged => return,
            Transition::Started(_) => &mut self.started,
            Transition::Restarted(_) => &mut self.restarted,
            Transition::Finished(_) => &mut self.finished,
        };
        *slot = slot.saturating_add(1);
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Serializable fleet state for persistence hooks.
///
/// Holds robots and the ledger. Economy config, randomness and names are
/// supplied again on restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Every robot in creation order.
    pub robots: Vec<Robot>,
    /// The full ledger.
    pub ledger: Ledger,
}

// ---------------------------------------------------------------------------
// Fleet
// ---------------------------------------------------------------------------

/// The fleet controller.
pub struct Fleet {
    robots: Vec<Robot>,
    index: BTreeMap<RobotId, usize>,
    names_taken: BTreeSet<String>,
    ledger: Ledger,
    economy: EconomyConfig,
    draws: Box<dyn Draws + Send>,
    names: Box<dyn NameSource>,
    max_name_attempts: Option<u32>,
    victory_robots: Option<usize>,
    victory_reached: bool,
}

impl core::fmt::Debug for Fleet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fleet")
            .field("robots", &self.robots.len())
            .field("counts", &self.ledger.counts())
            .field("max_name_attempts", &self.max_name_attempts)
            .field("victory_reached", &self.victory_reached)
            .finish_non_exhaustive()
    }
}

impl Fleet {
    /// Create an empty fleet with an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::Config`] if `economy` fails validation.
    pub fn new(
        economy: EconomyConfig,
        draws: Box<dyn Draws + Send>,
        names: Box<dyn NameSource>,
    ) -> Result<Self, FleetError> {
        economy
            .validate()
            .map_err(|source| FleetError::Config { source })?;
        Ok(Self {
            robots: Vec::new(),
            index: BTreeMap::new(),
            names_taken: BTreeSet::new(),
            ledger: Ledger::new(),
            economy,
            draws,
            names,
            max_name_attempts: None,
            victory_robots: None,
            victory_reached: false,
        })
    }

    /// Build a fleet from configuration: seeded randomness, starting stock
    /// and seed robots.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError`] if the economy is invalid, the starting stock
    /// cannot be created, or seed robots cannot be named.
    pub fn from_config(config: &FactoryConfig) -> Result<Self, FleetError> {
        let (draw_rng, name_rng) = match config.factory.rng_seed {
            Some(seed) => (
                SmallRng::seed_from_u64(seed),
                SmallRng::seed_from_u64(seed.wrapping_add(1)),
            ),
            None => (SmallRng::from_os_rng(), SmallRng::from_os_rng()),
        };

        let stock = config.starting_stock;
        let ledger = Ledger::with_stock(stock.foo, stock.bar, stock.foobar, stock.currency)?;

        let mut fleet = Self::new(
            config.economy.clone(),
            Box::new(RngDraws::new(draw_rng)),
            Box::new(PoolNameSource::new(name_rng)),
        )?
        .with_ledger(ledger)
        .with_max_name_attempts(config.factory.max_name_attempts)
        .with_victory_robots(match config.factory.victory_robots {
            0 => None,
            n => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        });

        let seeded = fleet.seed_robots(config.factory.seed_robots)?;
        info!(
            factory = %config.factory.name,
            robots = seeded.len(),
            counts = ?fleet.counts(),
            "Fleet initialized"
        );
        Ok(fleet)
    }

    /// Restore a fleet from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::CorruptSnapshot`] if robot ids or names repeat,
    /// or [`FleetError::Config`] if `economy` fails validation.
    pub fn from_snapshot(
        snapshot: FleetSnapshot,
        economy: EconomyConfig,
        draws: Box<dyn Draws + Send>,
        names: Box<dyn NameSource>,
    ) -> Result<Self, FleetError> {
        let mut fleet = Self::new(economy, draws, names)?.with_ledger(snapshot.ledger);
        for robot in snapshot.robots {
            if fleet.index.contains_key(&robot.id) {
                return Err(FleetError::CorruptSnapshot {
                    reason: format!("robot id {} appears twice", robot.id),
                });
            }
            if fleet.names_taken.contains(&robot.name) {
                return Err(FleetError::CorruptSnapshot {
                    reason: format!("robot name {:?} appears twice", robot.name),
                });
            }
            fleet.insert(robot);
        }
        if let AuditResult::Anomaly(anomaly) = fleet.ledger.audit() {
            return Err(FleetError::CorruptSnapshot {
                reason: anomaly.message,
            });
        }
        Ok(fleet)
    }

    /// Replace the ledger.
    #[must_use]
    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = ledger;
        self
    }

    /// Bound the number of name candidates tried per new robot.
    #[must_use]
    pub const fn with_max_name_attempts(mut self, max: Option<u32>) -> Self {
        self.max_name_attempts = max;
        self
    }

    /// Fleet size that wins the game. `None` disables the check.
    #[must_use]
    pub const fn with_victory_robots(mut self, robots: Option<usize>) -> Self {
        self.victory_robots = robots;
        self
    }

    /// Whether an update has already reported victory.
    pub const fn victory_reached(&self) -> bool {
        self.victory_reached
    }

    // -----------------------------------------------------------------------
    // Robots
    // -----------------------------------------------------------------------

    /// Create an idle robot with a name no other robot has.
    ///
    /// Asks the name source until a candidate does not collide. Unbounded
    /// unless `max_name_attempts` is set.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::NameSupplyExhausted`] if the attempt bound is
    /// reached.
    pub fn new_robot(&mut self) -> Result<RobotId, FleetError> {
        let name = unique_name(
            self.names.as_mut(),
            &self.names_taken,
            self.max_name_attempts,
        )?;
        let robot_id = self.insert(Robot::new(name));
        Ok(robot_id)
    }

    /// Create `count` idle robots.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::NameSupplyExhausted`] if naming fails; robots
    /// created before the failure remain.
    pub fn seed_robots(&mut self, count: u32) -> Result<Vec<RobotId>, FleetError> {
        (0..count).map(|_| self.new_robot()).collect()
    }

    /// Every robot id in creation order. Ids are stable for the fleet's
    /// lifetime.
    pub fn list_robots(&self) -> Vec<RobotId> {
        self.robots.iter().map(|robot| robot.id).collect()
    }

    /// Every robot record in creation order.
    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    /// Number of robots.
    pub fn len(&self) -> usize {
        self.robots.len()
    }

    /// Whether the fleet has no robots.
    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    /// Look up a robot.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::RobotNotFound`] for an unknown id.
    pub fn robot(&self, robot_id: RobotId) -> Result<&Robot, FleetError> {
        self.index
            .get(&robot_id)
            .and_then(|&position| self.robots.get(position))
            .ok_or(FleetError::RobotNotFound { robot_id })
    }

    /// Order a robot to switch to `action`. Overwrites any action in flight.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::RobotNotFound`] for an unknown id, or
    /// [`FleetError::Robot`] if the deadline overflows.
    pub fn change_action(
        &mut self,
        robot_id: RobotId,
        action: RobotAction,
        now: DateTime<Utc>,
    ) -> Result<(), FleetError> {
        let robot = self
            .index
            .get(&robot_id)
            .and_then(|&position| self.robots.get_mut(position))
            .ok_or(FleetError::RobotNotFound { robot_id })?;
        factory_robots::change_action(robot, action, now, &self.economy)
            .map_err(|source| FleetError::Robot { robot_id, source })
    }

    /// Percentage of a robot's current phase elapsed at `now`.
    ///
    /// `None` while the robot is idle.
    ///
    /// # Errors
    ///
    /// Returns [`FleetError::RobotNotFound`] for an unknown id.
    pub fn progress(
        &self,
        robot_id: RobotId,
        now: DateTime<Utc>,
    ) -> Result<Option<Decimal>, FleetError> {
        Ok(factory_robots::progress(self.robot(robot_id)?, now))
    }

    // -----------------------------------------------------------------------
    // Ledger
    // -----------------------------------------------------------------------

    /// Unused Foo, Bar, Foobar and the currency balance.
    pub fn counts(&self) -> Counts {
        self.ledger.counts()
    }

    /// Read-only ledger access.
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The economy in force.
    pub const fn economy(&self) -> &EconomyConfig {
        &self.economy
    }

    /// Capture robots and ledger for persistence.
    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            robots: self.robots.clone(),
            ledger: self.ledger.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Tick every robot at `now`, in creation order.
    ///
    /// A robot whose tick fails is left as it was, its ledger changes are
    /// rolled back, and it is listed in [`UpdateSummary::failed`]. Robots
    /// bought during this update are not ticked until the next one.
    pub fn update(&mut self, now: DateTime<Utc>) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        let ticking = self.robots.len();

        for position in 0..ticking {
            match self.tick_one(position, now) {
                Ok((report, bought)) => {
                    summary.record(report);
                    summary.bought.extend(bought);
                }
                Err(err) => {
                    let robot_id = self.robots.get(position).map(|robot| robot.id);
                    warn!(?robot_id, %err, "Robot tick rolled back");
                    summary.failed.extend(robot_id);
                }
            }
        }

        summary.victory = self.check_victory();
        summary.counts = self.ledger.counts();
        summary.audit_clean = match self.ledger.audit() {
            AuditResult::Consistent => true,
            AuditResult::Anomaly(anomaly) => {
                warn!(problems = anomaly.problems.len(), %anomaly, "Ledger audit failed");
                false
            }
        };

        debug!(
            started = summary.started,
            restarted = summary.restarted,
            finished = summary.finished,
            bought = summary.bought.len(),
            failed = summary.failed.len(),
            "Fleet updated"
        );
        summary
    }

    fn tick_one(
        &mut self,
        position: usize,
        now: DateTime<Utc>,
    ) -> Result<(TickReport, Option<RobotId>), FleetError> {
        let mut robot = self
            .robots
            .get(position)
            .cloned()
            .ok_or(LedgerError::InternalError("robot position out of range"))?;
        let robot_id = robot.id;

        let mut txn = self.ledger.begin();
        let mut ctx = EffectContext {
            robot_id,
            ledger: &mut txn,
            draws: self.draws.as_mut(),
            config: &self.economy,
        };
        let report = factory_robots::tick(&mut robot, now, &mut ctx)
            .map_err(|source| FleetError::Robot { robot_id, source })?;

        let new_name = if report.robot_bought {
            Some(unique_name(
                self.names.as_mut(),
                &self.names_taken,
                self.max_name_attempts,
            )?)
        } else {
            None
        };
        txn.commit();

        if let Some(slot) = self.robots.get_mut(position) {
            *slot = robot;
        }
        let bought = new_name.map(|name| {
            let new_id = self.insert(Robot::new(name));
            info!(buyer = %robot_id, robot_id = %new_id, "Robot bought");
            new_id
        });
        Ok((report, bought))
    }

    fn check_victory(&mut self) -> bool {
        let Some(goal) = self.victory_robots else {
            return false;
        };
        if self.victory_reached || self.robots.len() < goal {
            return false;
        }
        self.victory_reached = true;
        info!(robots = self.robots.len(), goal, "Victory! The fleet reached its goal size");
        true
    }

    fn insert(&mut self, robot: Robot) -> RobotId {
        let robot_id = robot.id;
        debug!(%robot_id, name = %robot.name, "Robot added");
        self.index.insert(robot_id, self.robots.len());
        self.names_taken.insert(robot.name.clone());
        self.robots.push(robot);
        robot_id
    }
}

fn unique_name(
    names: &mut dyn NameSource,
    taken: &BTreeSet<String>,
    max_attempts: Option<u32>,
) -> Result<String, FleetError> {
    let mut attempts: u32 = 0;
    loop {
        if max_attempts.is_some_and(|max| attempts >= max) {
            warn!(attempts, "Name supply exhausted");
            return Err(FleetError::NameSupplyExhausted { attempts });
        }
        attempts = attempts.saturating_add(1);
        let candidate = names.candidate();
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
        debug!(%candidate, attempts, "Name collision, retrying");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use factory_robots::FixedDraws;
    use factory_types::{ItemKind, RobotPhase, RobotStatus};

    use crate::names::ScriptedNames;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        t0() + TimeDelta::milliseconds(ms)
    }

    fn fleet_with(draws: FixedDraws, ledger: Ledger) -> Fleet {
        Fleet::new(
            EconomyConfig::default(),
            Box::new(draws),
            Box::new(ScriptedNames::new([
                "Ada Lovelace",
                "Alan Turing",
                "Grace Hopper",
                "Ken Thompson",
            ])),
        )
        .unwrap()
        .with_ledger(ledger)
    }

    #[test]
    fn new_robots_are_idle_and_uniquely_named() {
        let mut fleet = fleet_with(FixedDraws::default(), Ledger::new());
        let ids = fleet.seed_robots(3).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(fleet.list_robots(), ids);

        let names: BTreeSet<&str> = fleet.robots().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), 3);
        assert!(fleet.robots().iter().all(|r| r.phase == RobotPhase::Idle));
    }

    #[test]
    fn name_collisions_are_retried() {
        let mut fleet = Fleet::new(
            EconomyConfig::default(),
            Box::new(FixedDraws::default()),
            Box::new(ScriptedNames::new(["Dup", "Dup", "Dup", "Fresh"])),
        )
        .unwrap();
        fleet.new_robot().unwrap();
        let second = fleet.new_robot().unwrap();
        assert_eq!(fleet.robot(second).unwrap().name, "Fresh");
    }

    #[test]
    fn bounded_name_attempts_give_up() {
        let mut fleet = Fleet::new(
            EconomyConfig::default(),
            Box::new(FixedDraws::default()),
            Box::new(ScriptedNames::new(["Only"])),
        )
        .unwrap()
        .with_max_name_attempts(Some(5));
        fleet.new_robot().unwrap();
        assert!(matches!(
            fleet.new_robot(),
            Err(FleetError::NameSupplyExhausted { attempts: 5 })
        ));
        assert_eq!(fleet.len(), 1);
    }

    #[test]
    fn list_robots_is_stable() {
        let mut fleet = fleet_with(FixedDraws::default(), Ledger::new());
        fleet.seed_robots(2).unwrap();
        let before = fleet.list_robots();
        let _ = fleet.update(at(1_000));
        let _ = fleet.update(at(2_000));
        assert_eq!(fleet.list_robots(), before);
    }

    #[test]
    fn unknown_robot_is_not_found() {
        let mut fleet = fleet_with(FixedDraws::default(), Ledger::new());
        let ghost = RobotId::new();
        assert!(matches!(
            fleet.change_action(ghost, RobotAction::MiningFoo, t0()),
            Err(FleetError::RobotNotFound { .. })
        ));
        assert!(fleet.progress(ghost, t0()).is_err());
    }

    #[test]
    fn change_action_then_update_runs_mining() {
        let mut fleet = fleet_with(FixedDraws::default(), Ledger::new());
        let id = fleet.new_robot().unwrap();
        fleet.change_action(id, RobotAction::MiningFoo, t0()).unwrap();
        assert_eq!(
            fleet.progress(id, at(2_500)).unwrap(),
            Some(Decimal::from(50))
        );

        let summary = fleet.update(at(5_000));
        assert_eq!(summary.started, 1);
        assert_eq!(fleet.robot(id).unwrap().status(), RobotStatus::Active);

        let summary = fleet.update(at(7_000));
        assert_eq!(summary.restarted, 1);
        assert_eq!(summary.counts.foo, 1);
        assert!(summary.audit_clean);
    }

    #[test]
    fn buying_adds_exactly_one_robot() {
        let mut fleet = fleet_with(
            FixedDraws::default(),
            Ledger::with_stock(6, 0, 0, 3).unwrap(),
        );
        let buyer = fleet.new_robot().unwrap();
        fleet
            .change_action(buyer, RobotAction::BuyingRobot, t0())
            .unwrap();

        let summary = fleet.update(at(5_000));
        assert_eq!(summary.bought.len(), 1);
        assert_eq!(summary.finished, 1);
        assert_eq!(fleet.len(), 2);
        assert_eq!(fleet.counts().foo, 0);
        assert_eq!(fleet.counts().currency, 0);
        assert_eq!(fleet.robot(buyer).unwrap().phase, RobotPhase::Idle);

        let bought = summary.bought.first().copied().unwrap();
        assert_eq!(fleet.robot(bought).unwrap().phase, RobotPhase::Idle);
        assert_ne!(
            fleet.robot(bought).unwrap().name,
            fleet.robot(buyer).unwrap().name
        );
    }

    #[test]
    fn failed_naming_rolls_back_purchase() {
        let mut fleet = Fleet::new(
            EconomyConfig::default(),
            Box::new(FixedDraws::default()),
            Box::new(ScriptedNames::new(["Solo"])),
        )
        .unwrap()
        .with_ledger(Ledger::with_stock(6, 0, 0, 3).unwrap())
        .with_max_name_attempts(Some(3));
        let buyer = fleet.new_robot().unwrap();
        fleet
            .change_action(buyer, RobotAction::BuyingRobot, t0())
            .unwrap();
        let ledger_before = fleet.ledger().clone();
        let robot_before = fleet.robot(buyer).unwrap().clone();

        let summary = fleet.update(at(5_000));
        assert_eq!(summary.failed, vec![buyer]);
        assert!(summary.bought.is_empty());
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet.ledger(), &ledger_before);
        assert_eq!(fleet.robot(buyer).unwrap(), &robot_before);
    }

    #[test]
    fn robots_share_the_ledger_within_one_update() {
        // Two sellers, three foobars: the first takes all three, the second
        // finds nothing and goes idle.
        let mut fleet = fleet_with(FixedDraws::always(5), Ledger::with_stock(0, 0, 3, 0).unwrap());
        let first = fleet.new_robot().unwrap();
        let second = fleet.new_robot().unwrap();
        fleet
            .change_action(first, RobotAction::SellingFoobar, t0())
            .unwrap();
        fleet
            .change_action(second, RobotAction::SellingFoobar, t0())
            .unwrap();

        let _ = fleet.update(at(5_000));
        let summary = fleet.update(at(15_000));
        assert_eq!(summary.restarted, 1);
        assert_eq!(summary.finished, 1);
        assert_eq!(fleet.counts().foobar, 0);
        assert_eq!(fleet.counts().currency, 3);
        assert_eq!(fleet.robot(second).unwrap().phase, RobotPhase::Idle);
    }

    #[test]
    fn making_foobar_consumes_in_update() {
        let mut fleet = fleet_with(FixedDraws::always(1), Ledger::with_stock(1, 1, 0, 0).unwrap());
        let id = fleet.new_robot().unwrap();
        fleet
            .change_action(id, RobotAction::MakingFoobar, t0())
            .unwrap();
        let _ = fleet.update(at(5_000));
        let _ = fleet.update(at(7_000));
        assert_eq!(
            fleet.counts(),
            Counts {
                foo: 0,
                bar: 0,
                foobar: 1,
                currency: 0,
            }
        );
        assert_eq!(fleet.ledger().count_unused(ItemKind::Foobar), 1);
    }

    #[test]
    fn snapshot_restores_robots_and_ledger() {
        let mut fleet = fleet_with(FixedDraws::default(), Ledger::with_stock(2, 1, 1, 4).unwrap());
        let id = fleet.new_robot().unwrap();
        fleet.change_action(id, RobotAction::MiningBar, t0()).unwrap();
        let snapshot = fleet.snapshot();

        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: FleetSnapshot = serde_json::from_str(&json).unwrap();

        let restored = Fleet::from_snapshot(
            decoded,
            EconomyConfig::default(),
            Box::new(FixedDraws::default()),
            Box::new(ScriptedNames::default()),
        )
        .unwrap();
        assert_eq!(restored.list_robots(), fleet.list_robots());
        assert_eq!(restored.counts(), fleet.counts());
        assert_eq!(restored.robot(id).unwrap(), fleet.robot(id).unwrap());
    }

    #[test]
    fn snapshot_with_duplicate_names_is_rejected() {
        let mut snapshot = FleetSnapshot {
            robots: vec![Robot::new("Twin".to_owned()), Robot::new("Twin".to_owned())],
            ledger: Ledger::new(),
        };
        let result = Fleet::from_snapshot(
            snapshot.clone(),
            EconomyConfig::default(),
            Box::new(FixedDraws::default()),
            Box::new(ScriptedNames::default()),
        );
        assert!(matches!(result, Err(FleetError::CorruptSnapshot { .. })));

        snapshot.robots.pop();
        let result = Fleet::from_snapshot(
            snapshot,
            EconomyConfig::default(),
            Box::new(FixedDraws::default()),
            Box::new(ScriptedNames::default()),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn pool_names_outlast_their_capacity() {
        let capacity = PoolNameSource::<SmallRng>::capacity();
        let mut fleet = Fleet::new(
            EconomyConfig::default(),
            Box::new(FixedDraws::default()),
            Box::new(PoolNameSource::new(SmallRng::seed_from_u64(3))),
        )
        .unwrap()
        .with_ledger(Ledger::with_stock(6, 0, 0, 3).unwrap());
        let ids = fleet.seed_robots(u32::try_from(capacity).unwrap()).unwrap();
        let buyer = ids.first().copied().unwrap();
        fleet
            .change_action(buyer, RobotAction::BuyingRobot, t0())
            .unwrap();

        let summary = fleet.update(at(5_000));
        assert_eq!(summary.bought.len(), 1);
        assert_eq!(fleet.len(), capacity + 1);
        let names: BTreeSet<&str> = fleet.robots().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), capacity + 1);
    }

    #[test]
    fn victory_is_reported_once_when_the_goal_is_reached() {
        let mut fleet = fleet_with(
            FixedDraws::default(),
            Ledger::with_stock(12, 0, 0, 6).unwrap(),
        )
        .with_victory_robots(Some(3));
        let buyer = fleet.new_robot().unwrap();
        fleet.new_robot().unwrap();

        let summary = fleet.update(at(1_000));
        assert!(!summary.victory);

        fleet
            .change_action(buyer, RobotAction::BuyingRobot, at(1_000))
            .unwrap();
        let summary = fleet.update(at(6_000));
        assert_eq!(fleet.len(), 3);
        assert!(summary.victory);
        assert!(fleet.victory_reached());

        // Growing past the goal does not report again.
        fleet
            .change_action(buyer, RobotAction::BuyingRobot, at(6_000))
            .unwrap();
        let summary = fleet.update(at(11_000));
        assert_eq!(fleet.len(), 4);
        assert!(!summary.victory);
    }

    #[test]
    fn no_victory_without_a_goal() {
        let mut fleet = fleet_with(FixedDraws::default(), Ledger::new());
        fleet.seed_robots(4).unwrap();
        assert!(!fleet.update(at(1_000)).victory);
        assert!(!fleet.victory_reached());
    }

    #[test]
    fn from_config_seeds_stock_and_robots() {
        let mut config = FactoryConfig::default();
        config.factory.rng_seed = Some(11);
        config.starting_stock.foo = 6;
        config.starting_stock.currency = 3;
        let fleet = Fleet::from_config(&config).unwrap();
        assert_eq!(fleet.len(), 2);
        assert_eq!(fleet.counts().foo, 6);
        assert_eq!(fleet.counts().currency, 3);
    }

    #[test]
    fn invalid_economy_is_rejected() {
        let economy = EconomyConfig {
            mining_bar_min_ms: 5_000,
            ..EconomyConfig::default()
        };
        let result = Fleet::new(
            economy,
            Box::new(FixedDraws::default()),
            Box::new(ScriptedNames::default()),
        );
        assert!(matches!(result, Err(FleetError::Config { .. })));
    }
}
