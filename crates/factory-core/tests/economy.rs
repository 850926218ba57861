//! End-to-end tests for the factory economy.
//!
//! These drive a [`Fleet`] through whole production chains with scripted
//! randomness and explicit timestamps, then check ledger and robot
//! invariants after every update.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::arithmetic_side_effects,
    clippy::missing_panics_doc
)]

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use factory_core::config::FactoryConfig;
use factory_core::fleet::Fleet;
use factory_core::names::ScriptedNames;
use factory_core::view::{TraceFeed, robot_views};
use factory_ledger::Ledger;
use factory_robots::{EconomyConfig, FixedDraws};
use factory_types::{Counts, Robot, RobotAction, RobotId, RobotStatus};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, 0).single().unwrap()
}

fn at(ms: i64) -> DateTime<Utc> {
    t0() + TimeDelta::milliseconds(ms)
}

fn fleet(draws: FixedDraws, ledger: Ledger) -> Fleet {
    let names = (1..=50).map(|n| format!("Unit {n}"));
    Fleet::new(
        EconomyConfig::default(),
        Box::new(draws),
        Box::new(ScriptedNames::new(names)),
    )
    .unwrap()
    .with_ledger(ledger)
}

fn assert_robot_invariants(robot: &Robot) {
    let none = robot.time_started().is_none()
        && robot.time_when_available().is_none()
        && robot.time_when_done().is_none();
    assert_eq!(robot.action().is_none(), none, "{robot:?}");
    assert!(
        robot.time_when_available().is_none() || robot.time_when_done().is_none(),
        "{robot:?}"
    );
}

fn assert_fleet_invariants(fleet: &Fleet) {
    for robot in fleet.robots() {
        assert_robot_invariants(robot);
    }
    let names: BTreeSet<&str> = fleet.robots().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names.len(), fleet.len());
    assert!(fleet.ledger().audit().is_consistent());
}

fn order(fleet: &mut Fleet, id: RobotId, action: RobotAction, now: DateTime<Utc>) {
    fleet.change_action(id, action, now).unwrap();
}

#[test]
fn mining_then_making_then_selling() {
    // Draws: one sale batch of 5, assembly always succeeds.
    let mut fleet = fleet(FixedDraws::always(5), Ledger::new());
    let miner_foo = fleet.new_robot().unwrap();
    let miner_bar = fleet.new_robot().unwrap();
    order(&mut fleet, miner_foo, RobotAction::MiningFoo, t0());
    order(&mut fleet, miner_bar, RobotAction::MiningBar, t0());

    // Bar runs are clamped to the 500-2000ms range; a draw of 5 gives 500ms.
    for step in 0..=20 {
        let summary = fleet.update(at(5_000 + step * 500));
        assert!(summary.failed.is_empty());
        assert_fleet_invariants(&fleet);
    }
    let counts = fleet.counts();
    assert_eq!(counts.foo, 5);
    assert_eq!(counts.bar, 20);

    // Both robots switch to assembling.
    let now = at(15_000);
    order(&mut fleet, miner_foo, RobotAction::MakingFoobar, now);
    order(&mut fleet, miner_bar, RobotAction::MakingFoobar, now);
    let mut clock = 15_000;
    while fleet.counts().foo > 0 {
        clock += 1_000;
        let _ = fleet.update(at(clock));
        assert_fleet_invariants(&fleet);
        assert!(clock < 60_000, "assembly never finished");
    }
    assert_eq!(fleet.counts().foobar, 5);
    assert_eq!(fleet.counts().bar, 15);

    // Robots ran out of Foo and went idle on their own.
    clock += 2_000;
    let _ = fleet.update(at(clock));
    assert!(
        fleet
            .robots()
            .iter()
            .all(|r| r.status() == RobotStatus::Idle)
    );

    // One robot sells the whole batch.
    order(&mut fleet, miner_foo, RobotAction::SellingFoobar, at(clock));
    let _ = fleet.update(at(clock + 5_000));
    let _ = fleet.update(at(clock + 15_000));
    assert_eq!(
        fleet.counts(),
        Counts {
            foo: 0,
            bar: 15,
            foobar: 0,
            currency: 5,
        }
    );

    let mut feed = TraceFeed::new();
    assert_eq!(feed.poll(fleet.ledger()).len(), 5);
    assert!(feed.poll(fleet.ledger()).is_empty());
}

#[test]
fn failed_assembly_burns_foo_only() {
    let mut fleet = fleet(FixedDraws::always(100), Ledger::with_stock(3, 3, 0, 0).unwrap());
    let maker = fleet.new_robot().unwrap();
    order(&mut fleet, maker, RobotAction::MakingFoobar, t0());
    let _ = fleet.update(at(5_000));
    for run in 1..=3 {
        let _ = fleet.update(at(5_000 + run * 2_000));
    }
    assert_eq!(
        fleet.counts(),
        Counts {
            foo: 0,
            bar: 3,
            foobar: 0,
            currency: 0,
        }
    );
    let _ = fleet.update(at(13_000));
    assert_eq!(fleet.robot(maker).unwrap().status(), RobotStatus::Idle);
    assert_fleet_invariants(&fleet);
}

#[test]
fn buying_robots_grows_the_fleet() {
    let mut fleet = fleet(FixedDraws::default(), Ledger::with_stock(12, 0, 0, 6).unwrap());
    let buyer = fleet.new_robot().unwrap();

    order(&mut fleet, buyer, RobotAction::BuyingRobot, t0());
    let first = fleet.update(at(5_000));
    assert_eq!(first.bought.len(), 1);

    order(&mut fleet, buyer, RobotAction::BuyingRobot, at(5_000));
    let second = fleet.update(at(10_000));
    assert_eq!(second.bought.len(), 1);

    // Nothing left to pay with.
    order(&mut fleet, buyer, RobotAction::BuyingRobot, at(10_000));
    let third = fleet.update(at(15_000));
    assert!(third.bought.is_empty());

    assert_eq!(fleet.len(), 3);
    assert_eq!(fleet.counts().foo, 0);
    assert_eq!(fleet.counts().currency, 0);
    assert_fleet_invariants(&fleet);
}

#[test]
fn change_action_mid_run_discards_progress() {
    let mut fleet = fleet(FixedDraws::default(), Ledger::new());
    let id = fleet.new_robot().unwrap();
    order(&mut fleet, id, RobotAction::MiningFoo, t0());
    let _ = fleet.update(at(5_000));
    assert_eq!(fleet.robot(id).unwrap().status(), RobotStatus::Active);

    // Redirected one millisecond before the run would finish.
    order(&mut fleet, id, RobotAction::MiningBar, at(6_999));
    let _ = fleet.update(at(7_000));
    assert_eq!(fleet.counts().foo, 0);
    assert_eq!(fleet.robot(id).unwrap().status(), RobotStatus::Transitioning);
    assert_eq!(
        fleet.robot(id).unwrap().time_when_available(),
        Some(at(11_999))
    );
}

#[test]
fn views_track_the_fleet() {
    let mut fleet = fleet(FixedDraws::default(), Ledger::new());
    let a = fleet.new_robot().unwrap();
    let _b = fleet.new_robot().unwrap();
    order(&mut fleet, a, RobotAction::SellingFoobar, t0());

    let views = robot_views(&fleet, at(1_000));
    assert_eq!(views.len(), 2);
    let first = views.first().unwrap();
    assert_eq!(first.label, "Changing to: Selling foobar");
    assert_eq!(first.progress, 20);
    let second = views.get(1).unwrap();
    assert_eq!(second.label, "Idle");
    assert_eq!(second.progress, 0);
}

#[test]
fn seeded_config_run_keeps_invariants() {
    let yaml = r"
factory:
  seed_robots: 3
  rng_seed: 2024
starting_stock:
  foo: 10
  bar: 10
  foobar: 4
  currency: 5
";
    let config = FactoryConfig::parse(yaml).unwrap();
    let mut fleet = Fleet::from_config(&config).unwrap();
    let ids = fleet.list_robots();
    let actions = [
        RobotAction::MakingFoobar,
        RobotAction::SellingFoobar,
        RobotAction::MiningBar,
    ];
    for (id, action) in ids.iter().zip(actions) {
        order(&mut fleet, *id, action, t0());
    }

    let mut sold_total = 0;
    let mut feed = TraceFeed::new();
    for step in 1..=200 {
        let summary = fleet.update(at(step * 250));
        assert!(summary.failed.is_empty());
        assert!(summary.audit_clean);
        assert_fleet_invariants(&fleet);
        sold_total += feed.poll(fleet.ledger()).len();
    }
    assert_eq!(fleet.list_robots(), ids);
    let sold = fleet.ledger().sold_foobars().count();
    assert_eq!(sold_total, sold);
    assert_eq!(fleet.counts().currency, 5 + i64::try_from(sold).unwrap());
}
